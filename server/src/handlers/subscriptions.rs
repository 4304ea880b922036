use axum::extract::State;
use axum::response::Response;
use chrono::Utc;
use garde::Validate;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::models::subscription::{
    CreateSubscription, NewSubscription, SubscriptionStatus, SubscriptionView,
};
use crate::models::StatusUpdate;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::extract::{AppJson, AppPath};
use crate::utils::response::{created, success};

pub async fn list_subscriptions(
    State(state): State<AppState>,
    AdminUser(current): AdminUser,
) -> AppResult<Response> {
    let today = Utc::now().date_naive();
    let subscriptions: Vec<SubscriptionView> = state
        .repos
        .subscriptions
        .list_by_user(current.id())
        .await?
        .into_iter()
        .map(|s| SubscriptionView::new(s, today))
        .collect();
    Ok(success(subscriptions, "Subscriptions loaded"))
}

pub async fn create_subscription(
    State(state): State<AppState>,
    AdminUser(current): AdminUser,
    AppJson(payload): AppJson<CreateSubscription>,
) -> AppResult<Response> {
    payload.validate()?;

    let today = Utc::now().date_naive();
    let new = NewSubscription::starting(current.id(), payload, today).ok_or_else(|| {
        AppError::ValidationError("Subscription end date is out of range".to_string())
    })?;
    let subscription = state.repos.subscriptions.create(new).await?;

    Ok(created(
        SubscriptionView::new(subscription, today),
        "Subscription created; your new subscription is active",
    ))
}

pub async fn update_subscription_status(
    State(state): State<AppState>,
    AdminUser(current): AdminUser,
    AppPath(subscription_id): AppPath<Uuid>,
    AppJson(update): AppJson<StatusUpdate<SubscriptionStatus>>,
) -> AppResult<Response> {
    let subscription = state
        .repos
        .subscriptions
        .set_status(subscription_id, current.id(), update.status)
        .await?;
    let today = Utc::now().date_naive();
    Ok(success(
        SubscriptionView::new(subscription, today),
        "Subscription status updated",
    ))
}
