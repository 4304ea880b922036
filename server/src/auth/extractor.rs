use axum::{async_trait, extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use super::AccessToken;
use crate::models::user::{SessionUser, User};
use crate::state::AppState;
use crate::utils::error::AppError;

/// Any caller holding a live session.
pub struct CurrentUser {
    pub access_token: AccessToken,
    pub user: User,
    pub session: SessionUser,
}

impl CurrentUser {
    pub fn id(&self) -> uuid::Uuid {
        self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin
    }

    pub fn is_approved(&self) -> bool {
        self.session.approved
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::AuthError("Missing bearer token".to_string()))?;
        let access_token = AccessToken(bearer.token().to_string());

        let user_id = state
            .auth
            .user_id_for_token(&access_token)
            .await?
            .ok_or_else(|| AppError::AuthError("Session is invalid or has expired".to_string()))?;

        let user = state
            .repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::AuthError("Account no longer exists".to_string()))?;

        let session = SessionUser::new(&user, &state.admin);
        Ok(Self {
            access_token,
            user,
            session,
        })
    }
}

/// A session whose account was approved by an administrator (admins always are).
pub struct ApprovedUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for ApprovedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        if !current.is_approved() {
            return Err(AppError::Forbidden(
                "Your account is awaiting administrator approval".to_string(),
            ));
        }
        Ok(Self(current))
    }
}

pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        if !current.is_admin() {
            return Err(AppError::Forbidden("Administrator access required".to_string()));
        }
        Ok(Self(current))
    }
}
