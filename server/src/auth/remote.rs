use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    AccessToken, AdminPolicy, AuthMode, AuthProvider, IssuedSession, SignUpOutcome, SignUpRequest,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::normalize_email;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone)]
pub struct RemoteAuthSettings {
    pub session_ttl: Duration,
    pub reset_ttl: Duration,
    pub reset_redirect: String,
}

/// Credentials, sessions and reset tokens stored in Postgres.
pub struct RemoteAuth {
    pool: PgPool,
    admin: AdminPolicy,
    settings: RemoteAuthSettings,
}

impl RemoteAuth {
    pub fn new(pool: PgPool, admin: AdminPolicy, settings: RemoteAuthSettings) -> Self {
        Self {
            pool,
            admin,
            settings,
        }
    }
}

async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .map_err(AppError::from)
}

async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .map_err(AppError::from)
}

fn expiry_after(ttl: Duration) -> AppResult<DateTime<Utc>> {
    Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::InternalServerError(format!("TTL {ttl} is out of range")))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl AuthProvider for RemoteAuth {
    fn mode(&self) -> AuthMode {
        AuthMode::Remote
    }

    async fn sign_up(&self, request: SignUpRequest) -> AppResult<SignUpOutcome> {
        let email = normalize_email(&request.email);
        let outcome = SignUpOutcome::for_account(Uuid::new_v4(), &email, &self.admin);
        let password_hash = hash_password(request.password).await?;

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, full_name, phone, approved) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(outcome.user_id)
        .bind(&email)
        .bind(&password_hash)
        .bind(request.full_name.trim())
        .bind(request.phone.trim())
        .bind(outcome.approved())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("An account with this email already exists".to_string())
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        Ok(outcome)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<IssuedSession> {
        let email = normalize_email(email);
        let record: Option<(Uuid, String)> =
            sqlx::query_as("SELECT id, password_hash FROM users WHERE email = $1")
                .bind(&email)
                .fetch_optional(&self.pool)
                .await?;

        let (user_id, hash) =
            record.ok_or_else(|| AppError::AuthError(INVALID_CREDENTIALS.to_string()))?;
        if !verify_password(password.to_string(), hash).await? {
            return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
        }

        let token = AccessToken::generate();
        let expires_at = expiry_after(self.settings.session_ttl)?;
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token.as_str())
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        Ok(IssuedSession {
            token,
            user_id,
            expires_at: Some(expires_at),
        })
    }

    async fn user_id_for_token(&self, token: &AccessToken) -> AppResult<Option<Uuid>> {
        let user_id = sqlx::query_scalar(
            "SELECT user_id FROM sessions WHERE token = $1 AND expires_at > now()",
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user_id)
    }

    async fn sign_out(&self, token: &AccessToken) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(email);
        let user_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(user_id) = user_id else {
            debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = AccessToken::generate();
        sqlx::query("INSERT INTO password_resets (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token.as_str())
            .bind(user_id)
            .bind(expiry_after(self.settings.reset_ttl)?)
            .execute(&self.pool)
            .await?;

        // Delivery is left to the operator; the link is only logged.
        info!(
            %user_id,
            link = %format!("{}?token={}", self.settings.reset_redirect, token.as_str()),
            "Password reset link issued"
        );
        Ok(())
    }

    async fn confirm_password_reset(&self, token: &str, new_password: &str) -> AppResult<()> {
        let password_hash = hash_password(new_password.to_string()).await?;
        let mut tx = self.pool.begin().await?;

        let user_id: Option<Uuid> = sqlx::query_scalar(
            "UPDATE password_resets SET used = TRUE \
             WHERE token = $1 AND NOT used AND expires_at > now() \
             RETURNING user_id",
        )
        .bind(token.trim())
        .fetch_optional(&mut *tx)
        .await?;

        let user_id = user_id.ok_or_else(|| {
            AppError::AuthError("Reset link is invalid or has expired".to_string())
        })?;

        sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
