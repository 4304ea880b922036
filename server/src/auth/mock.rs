use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{AccessToken, AuthMode, AuthProvider, IssuedSession, SignUpOutcome, SignUpRequest};
use crate::models::user::User;
use crate::utils::error::{AppError, AppResult};

pub struct MockAccount {
    pub id: Uuid,
    pub email: &'static str,
    pub password: &'static str,
    pub full_name: &'static str,
    pub phone: &'static str,
}

pub static MOCK_ACCOUNTS: [MockAccount; 2] = [
    MockAccount {
        id: Uuid::from_u128(0x5a1c_e000_0000_4000_8000_0000_0000_0001),
        email: "alice@gatepass.com",
        password: "123456",
        full_name: "Alice Wonderland",
        phone: "+55 11 99999-9999",
    },
    MockAccount {
        id: Uuid::from_u128(0x10a0_c000_0000_4000_8000_0000_0000_0002),
        email: "joao@cliente.com",
        password: "123456",
        full_name: "João Silva",
        phone: "+55 11 88888-8888",
    },
];

const INVALID_CREDENTIALS: &str =
    "Invalid credentials. Use alice@gatepass.com or joao@cliente.com / 123456";

/// Demo authentication over the hardcoded accounts. Sessions are kept in memory and,
/// when a session file is configured, mirrored to disk as JSON.
pub struct MockAuth {
    sessions: RwLock<HashMap<String, Uuid>>,
    session_file: Option<PathBuf>,
}

impl MockAuth {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            session_file: None,
        }
    }

    /// Restores sessions saved by a previous run. A missing file starts empty.
    pub async fn with_session_file(path: PathBuf) -> AppResult<Self> {
        let sessions = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AppError::InternalServerError(format!("Corrupt session file {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(AppError::InternalServerError(format!(
                    "Cannot read session file {}: {e}",
                    path.display()
                )))
            }
        };
        debug!(count = sessions.len(), path = %path.display(), "Restored mock sessions");

        Ok(Self {
            sessions: RwLock::new(sessions),
            session_file: Some(path),
        })
    }

    /// The demo accounts as user records, already approved.
    pub fn users() -> Vec<User> {
        let registered_at = DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap_or_default();
        MOCK_ACCOUNTS
            .iter()
            .map(|account| User {
                id: account.id,
                email: account.email.to_string(),
                full_name: account.full_name.to_string(),
                phone: account.phone.to_string(),
                approved: true,
                created_at: registered_at,
                updated_at: registered_at,
            })
            .collect()
    }

    async fn persist(&self, sessions: &HashMap<String, Uuid>) -> AppResult<()> {
        let Some(path) = &self.session_file else {
            return Ok(());
        };
        let bytes = serde_json::to_vec(sessions)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        tokio::fs::write(path, bytes).await.map_err(|e| {
            warn!(error = %e, path = %path.display(), "Failed to save mock sessions");
            AppError::InternalServerError(format!("Cannot write session file: {e}"))
        })
    }
}

impl Default for MockAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MockAuth {
    fn mode(&self) -> AuthMode {
        AuthMode::Mock
    }

    async fn sign_up(&self, _request: SignUpRequest) -> AppResult<SignUpOutcome> {
        Err(AppError::Forbidden(
            "Sign-up is unavailable with mock authentication; use the demo credentials".to_string(),
        ))
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<IssuedSession> {
        let account = MOCK_ACCOUNTS
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email.trim()) && a.password == password)
            .ok_or_else(|| AppError::AuthError(INVALID_CREDENTIALS.to_string()))?;

        let token = AccessToken::generate();
        let mut sessions = self.sessions.write().await;
        sessions.insert(token.0.clone(), account.id);
        if let Err(e) = self.persist(&sessions).await {
            // The caller never sees this token, so it must not stay valid.
            sessions.remove(token.as_str());
            return Err(e);
        }

        Ok(IssuedSession {
            token,
            user_id: account.id,
            expires_at: None,
        })
    }

    async fn user_id_for_token(&self, token: &AccessToken) -> AppResult<Option<Uuid>> {
        Ok(self.sessions.read().await.get(token.as_str()).copied())
    }

    async fn sign_out(&self, token: &AccessToken) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(token.as_str()).is_some() {
            self.persist(&sessions).await?;
        }
        Ok(())
    }

    async fn request_password_reset(&self, _email: &str) -> AppResult<()> {
        Err(AppError::Forbidden(
            "Password reset is unavailable with mock authentication".to_string(),
        ))
    }

    async fn confirm_password_reset(&self, _token: &str, _new_password: &str) -> AppResult<()> {
        Err(AppError::Forbidden(
            "Password reset is unavailable with mock authentication".to_string(),
        ))
    }
}
