use axum::extract::State;
use axum::response::Response;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::models::stats::PlatformStats;
use crate::models::user::{SessionUser, UserSearch, UserSummary};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{AppPath, AppQuery};
use crate::utils::response::success;

pub async fn stats(State(state): State<AppState>, _admin: AdminUser) -> AppResult<Response> {
    let repos = &state.repos;
    let (total_users, total_tickets, total_subscriptions, total_accesses, total_pending_charges) =
        tokio::try_join!(
            repos.users.count(),
            repos.tickets.count(),
            repos.subscriptions.count(),
            repos.accesses.count(),
            repos.purchases.count_pending_charges(),
        )?;

    let stats = PlatformStats {
        total_users,
        total_tickets,
        total_subscriptions,
        total_accesses,
        total_pending_charges,
    };
    Ok(success(stats, "Statistics loaded"))
}

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppQuery(search): AppQuery<UserSearch>,
) -> AppResult<Response> {
    let today = Utc::now().date_naive();
    let (users, mut totals) = tokio::try_join!(
        state.repos.users.list(search.term()),
        state.repos.purchases.totals_by_user(today),
    )?;

    let summaries: Vec<UserSummary> = users
        .into_iter()
        .map(|user| {
            let account = totals.remove(&user.id).unwrap_or_default();
            UserSummary::new(user, account)
        })
        .collect();
    Ok(success(summaries, "Users loaded"))
}

pub async fn approve_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Response> {
    set_approval(state, user_id, true, "User approved").await
}

pub async fn revoke_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Response> {
    set_approval(state, user_id, false, "User approval removed").await
}

async fn set_approval(
    state: AppState,
    user_id: Uuid,
    approved: bool,
    message: &'static str,
) -> AppResult<Response> {
    let user = state.repos.users.set_approved(user_id, approved).await?;
    tracing::info!(%user_id, approved, "User approval changed");
    Ok(success(SessionUser::new(&user, &state.admin), message))
}
