use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::models::access::{AccessStatus, CreateAccess};
use crate::models::StatusUpdate;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{AppJson, AppPath};
use crate::utils::response::{created, success};

pub async fn list_accesses(
    State(state): State<AppState>,
    AdminUser(current): AdminUser,
) -> AppResult<Response> {
    let accesses = state.repos.accesses.list_by_user(current.id()).await?;
    Ok(success(accesses, "Accesses loaded"))
}

pub async fn create_access(
    State(state): State<AppState>,
    AdminUser(current): AdminUser,
    AppJson(payload): AppJson<CreateAccess>,
) -> AppResult<Response> {
    let access = state
        .repos
        .accesses
        .create(current.id(), payload.ticket_id)
        .await?;
    Ok(created(access, "Access registered"))
}

pub async fn update_access_status(
    State(state): State<AppState>,
    AdminUser(current): AdminUser,
    AppPath(access_id): AppPath<Uuid>,
    AppJson(update): AppJson<StatusUpdate<AccessStatus>>,
) -> AppResult<Response> {
    let access = state
        .repos
        .accesses
        .set_status(access_id, current.id(), update.status)
        .await?;
    Ok(success(access, "Access status updated"))
}
