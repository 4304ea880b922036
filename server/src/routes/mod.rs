use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{accesses, admin, auth, health_check, plans, shop, subscriptions, tickets};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes())
        .nest("/shop", shop_routes())
        .route("/plans", get(plans::list_plans))
        .route("/plans/select", post(plans::select_plan))
        .route("/tickets", get(tickets::list_tickets).post(tickets::create_ticket))
        .route("/tickets/:id/status", patch(tickets::update_ticket_status))
        .route(
            "/subscriptions",
            get(subscriptions::list_subscriptions).post(subscriptions::create_subscription),
        )
        .route(
            "/subscriptions/:id/status",
            patch(subscriptions::update_subscription_status),
        )
        .route("/accesses", get(accesses::list_accesses).post(accesses::create_access))
        .route("/accesses/:id/status", patch(accesses::update_access_status))
        .nest("/admin", admin_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(auth::sign_up))
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-out", post(auth::sign_out))
        .route("/session", get(auth::session))
        .route("/password-reset", post(auth::request_password_reset))
        .route("/password-reset/confirm", post(auth::confirm_password_reset))
}

fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/offer", get(shop::offer))
        .route("/quote", post(shop::quote))
        .route("/checkout", post(shop::checkout))
        .route("/purchases", get(shop::purchases))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::stats))
        .route("/users", get(admin::list_users))
        .route("/users/:id/approve", post(admin::approve_user))
        .route("/users/:id/revoke", post(admin::revoke_user))
}
