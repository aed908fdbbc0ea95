// =============================================================================
// Candle Dash — Main Entry Point
// =============================================================================
//
// Serves a single-page crypto candlestick dashboard. Every dropdown change is
// a fresh round trip to the exchange; nothing is cached between requests.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod chart;
mod config;
mod error;
mod exchange;
mod indicators;
mod market_data;
mod types;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppContext;
use crate::config::{DashConfig, DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Candle Dash starting up");

    let config_path =
        std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = DashConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, path = %config_path, "Failed to load config, using defaults");
        DashConfig::default()
    });
    config.apply_env().context("invalid environment override")?;

    info!(
        bind_addr = %config.bind_addr,
        exchange_url = %config.exchange_url,
        timeout_secs = ?config.request_timeout_secs,
        "Configuration resolved"
    );

    // ── 2. Build shared context ──────────────────────────────────────────
    let ctx = Arc::new(AppContext::new(config)?);

    // ── 3. Start the HTTP server ─────────────────────────────────────────
    let bind_addr = ctx.config.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "Dashboard listening. Press Ctrl+C to stop.");

    let app = api::rest::router(ctx);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Candle Dash shut down complete.");
    Ok(())
}

// ── Graceful shutdown ────────────────────────────────────────────────────────
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
