use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::auth::AuthMode;
use crate::state::AppState;
use crate::utils::response::success;

pub mod accesses;
pub mod admin;
pub mod auth;
pub mod plans;
pub mod shop;
pub mod subscriptions;
pub mod tickets;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
    auth_mode: AuthMode,
}

pub async fn health_check(State(state): State<AppState>) -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "gatepass-api",
        auth_mode: state.auth.mode(),
    };

    success(payload, "Health check successful")
}
