/// Esports Feed API
///
/// What it does:
///   1. Renders the HLTV matches page in headless Chrome and normalizes it
///   2. Fetches live Valorant matches from vlr.gg as plain HTML
///   3. Serves both as JSON, cached per key for CACHE_TTL_SECS
///
/// Run:
///   cargo run --bin feed-api

mod cache;
mod config;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let config = ServerConfig::from_env()?;

    info!("🚀 === Esports Feed API ===");
    info!("HLTV: {}", config.scraper.hltv_base_url);
    info!("VLR: {}", config.scraper.vlr_base_url);
    info!("Cache TTL: {}s", config.cache_ttl.as_secs());
    info!("Logs: {}", config.log_dir.display());

    let state = Arc::new(AppState::new(&config)?);
    let app = routes::router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("✅ Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("🛑 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl-C received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
