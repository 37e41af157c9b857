mod api;
mod app_state;
mod config;
mod core;
mod domain;
mod errors;
mod logging;
mod routes;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::app_state::build_app_state;
use crate::config::AppConfig;
use crate::routes::app_router;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    let _log_guard = logging::init_tracing(&config.log_dir);

    info!("🚀 Starting APM Text2DSL server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Elasticsearch at {} (timeout {:?}), default timezone {}",
        config.es_url, config.es_timeout, config.default_timezone
    );

    let result = serve(config).await;
    if let Err(ref e) = result {
        error!("❌ Server error: {:#}", e);
    }

    info!("Server shutdown complete");
    result
}

async fn serve(config: AppConfig) -> Result<()> {
    let bind_addr = config.bind_addr.clone();
    let state = build_app_state(config)?;
    let app = app_router().with_state(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
