//! Waypoint Server - Event Check-In Management System

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use waypoint_server::{
    api, config::AppConfig, lock::RequestLock, services::Services, store::RowStore, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("waypoint_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Waypoint Server v{}", env!("CARGO_PKG_VERSION"));

    // Open the workbook backing the row store
    let store = RowStore::open(&config.store.path).expect("Failed to open workbook");
    tracing::info!("Workbook loaded from {}", config.store.path);

    // One lock serializes every mutating action in the process
    let lock = RequestLock::new(Duration::from_secs(config.lock.acquire_timeout_secs));

    let services = Services::new(store, config.auth.clone());

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        lock,
    };

    let app = api::router(state);

    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
