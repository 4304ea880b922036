use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use gatepass_server::config::Config;
use gatepass_server::{create_routes, AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,gatepass_server=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");
    tracing::info!(auth_mode = %config.auth_mode, admin = %config.admin_email, "Configuration loaded");

    let state = AppState::from_config(&config)
        .await
        .expect("Failed to initialize backend");
    state.events.spawn_logger();

    let app = create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
