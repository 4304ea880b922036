//! Authentication behind one provider interface.
//!
//! `RemoteAuth` keeps credentials and sessions in Postgres. `MockAuth` serves the two
//! demo accounts from memory. Which one runs is decided by `AUTH_MODE`.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::error::AppResult;
use crate::utils::validation::{not_blank, password_rules};

pub mod events;
pub mod extractor;
pub mod mock;
pub mod remote;

pub use events::{AuthEvent, AuthEvents};
pub use extractor::{AdminUser, ApprovedUser, CurrentUser};
pub use mock::MockAuth;
pub use remote::RemoteAuth;

pub const DEFAULT_ADMIN_EMAIL: &str = "alice@gatepass.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Remote,
    Mock,
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(AuthMode::Remote),
            "mock" => Ok(AuthMode::Mock),
            other => Err(format!("unknown auth mode '{other}', expected 'remote' or 'mock'")),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Remote => f.write_str("remote"),
            AuthMode::Mock => f.write_str("mock"),
        }
    }
}

/// Grants the admin role to exactly one email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPolicy {
    email: String,
}

impl AdminPolicy {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_lowercase(),
        }
    }

    pub fn grants(&self, email: &str) -> bool {
        email.trim().eq_ignore_ascii_case(&self.email)
    }
}

impl Default for AdminPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_EMAIL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessToken(pub String);

impl AccessToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpRequest {
    #[garde(email)]
    pub email: String,
    #[garde(custom(password_rules))]
    pub password: String,
    #[garde(custom(not_blank))]
    pub full_name: String,
    #[garde(custom(not_blank))]
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInRequest {
    #[garde(custom(not_blank))]
    pub email: String,
    #[garde(custom(not_blank))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[garde(email)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordResetConfirm {
    #[garde(custom(not_blank))]
    pub token: String,
    #[garde(custom(password_rules))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpOutcome {
    pub user_id: Uuid,
    pub needs_approval: bool,
}

impl SignUpOutcome {
    /// Only the admin account starts out approved.
    pub fn for_account(user_id: Uuid, email: &str, admin: &AdminPolicy) -> Self {
        Self {
            user_id,
            needs_approval: !admin.grants(email),
        }
    }

    pub fn approved(&self) -> bool {
        !self.needs_approval
    }
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: AccessToken,
    pub user_id: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn mode(&self) -> AuthMode;

    async fn sign_up(&self, request: SignUpRequest) -> AppResult<SignUpOutcome>;

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<IssuedSession>;

    async fn user_id_for_token(&self, token: &AccessToken) -> AppResult<Option<Uuid>>;

    async fn sign_out(&self, token: &AccessToken) -> AppResult<()>;

    /// Succeeds for unknown addresses too, so the endpoint does not reveal accounts.
    async fn request_password_reset(&self, email: &str) -> AppResult<()>;

    async fn confirm_password_reset(&self, token: &str, new_password: &str) -> AppResult<()>;
}
