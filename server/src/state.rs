use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::auth::remote::RemoteAuthSettings;
use crate::auth::{AdminPolicy, AuthEvents, AuthMode, AuthProvider, MockAuth, RemoteAuth};
use crate::config::Config;
use crate::repository::{MemoryBackend, PgBackend, Repositories};
use crate::utils::error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthProvider>,
    pub repos: Repositories,
    pub admin: AdminPolicy,
    pub events: AuthEvents,
}

impl AppState {
    pub fn new(auth: Arc<dyn AuthProvider>, repos: Repositories, admin: AdminPolicy) -> Self {
        Self {
            auth,
            repos,
            admin,
            events: AuthEvents::new(),
        }
    }

    /// Demo wiring: mock authentication over an in-memory backend seeded with the demo accounts.
    pub fn in_memory(auth: MockAuth, admin: AdminPolicy) -> Self {
        let backend = Arc::new(MemoryBackend::with_users(MockAuth::users()));
        Self::new(Arc::new(auth), Repositories::from_backend(backend), admin)
    }

    pub async fn from_config(config: &Config) -> AppResult<Self> {
        let admin = AdminPolicy::new(config.admin_email.as_str());

        match config.auth_mode {
            AuthMode::Mock => {
                info!("Using mock authentication with the in-memory backend");
                let auth = match &config.mock_session_file {
                    Some(path) => MockAuth::with_session_file(path.clone()).await?,
                    None => MockAuth::new(),
                };
                Ok(Self::in_memory(auth, admin))
            }
            AuthMode::Remote => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .connect(&config.database_url)
                    .await?;
                info!("Successfully connected to database");

                sqlx::migrate!()
                    .run(&pool)
                    .await
                    .map_err(|e| AppError::InternalServerError(format!("Migrations failed: {e}")))?;
                info!("Migrations run successfully");

                let auth = RemoteAuth::new(
                    pool.clone(),
                    admin.clone(),
                    RemoteAuthSettings {
                        session_ttl: config.session_ttl,
                        reset_ttl: config.reset_ttl,
                        reset_redirect: config.password_reset_redirect.clone(),
                    },
                );
                let backend = Arc::new(PgBackend::new(pool));
                Ok(Self::new(
                    Arc::new(auth),
                    Repositories::from_backend(backend),
                    admin,
                ))
            }
        }
    }
}
