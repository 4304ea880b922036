use axum::extract::State;
use axum::response::Response;
use chrono::{DateTime, Utc};
use garde::Validate;
use serde::Serialize;

use crate::auth::{
    AuthEvent, CurrentUser, PasswordResetConfirm, PasswordResetRequest, SignInRequest,
    SignUpRequest,
};
use crate::models::user::SessionUser;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::extract::AppJson;
use crate::utils::response::{created, empty_success, success};

#[derive(Serialize)]
pub struct SessionPayload {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: SessionUser,
}

pub async fn sign_up(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignUpRequest>,
) -> AppResult<Response> {
    payload.validate()?;

    let outcome = state.auth.sign_up(payload).await?;
    state.events.publish(AuthEvent::SignedUp {
        user_id: outcome.user_id,
        needs_approval: outcome.needs_approval,
    });

    let message = if outcome.needs_approval {
        "Account created; an administrator must approve it before you can sign in"
    } else {
        "Account created"
    };
    Ok(created(outcome, message))
}

pub async fn sign_in(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignInRequest>,
) -> AppResult<Response> {
    payload.validate()?;

    let session = state.auth.sign_in(&payload.email, &payload.password).await?;
    let user = state
        .repos
        .users
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| AppError::AuthError("Account no longer exists".to_string()))?;
    state.events.publish(AuthEvent::SignedIn {
        user_id: session.user_id,
    });

    let user = SessionUser::new(&user, &state.admin);
    let message = format!("Welcome, {}!", user.display_name());
    Ok(success(
        SessionPayload {
            token: session.token.0,
            expires_at: session.expires_at,
            user,
        },
        message,
    ))
}

pub async fn sign_out(State(state): State<AppState>, current: CurrentUser) -> AppResult<Response> {
    state.auth.sign_out(&current.access_token).await?;
    state.events.publish(AuthEvent::SignedOut {
        user_id: current.id(),
    });

    Ok(empty_success(format!(
        "Goodbye, {}!",
        current.session.display_name()
    )))
}

pub async fn session(current: CurrentUser) -> Response {
    success(current.session, "Session is active")
}

pub async fn request_password_reset(
    State(state): State<AppState>,
    AppJson(payload): AppJson<PasswordResetRequest>,
) -> AppResult<Response> {
    payload.validate()?;

    state.auth.request_password_reset(&payload.email).await?;
    state.events.publish(AuthEvent::PasswordResetRequested);

    Ok(empty_success(
        "If an account exists for this email, reset instructions have been sent",
    ))
}

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    AppJson(payload): AppJson<PasswordResetConfirm>,
) -> AppResult<Response> {
    payload.validate()?;

    state
        .auth
        .confirm_password_reset(&payload.token, &payload.password)
        .await?;
    state.events.publish(AuthEvent::PasswordChanged);

    Ok(empty_success("Password updated; sign in with your new password"))
}
