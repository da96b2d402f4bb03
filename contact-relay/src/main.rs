//! Contact Relay Server - standalone contact form gateway.
//!
//! This binary:
//! - Serves `POST /api/contact` and `GET /api/health`
//! - Rate limits, filters and validates submissions
//! - Relays accepted submissions to the configured workflow webhook
//!
//! Rate limit state lives in this process and resets on restart.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relay::web::{router, AppState};
use relay::{Config, FixedWindowLimiter, Forwarder, Gateway, HttpTransport};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("relay_server_starting");

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!(
        port = config.port,
        webhook_configured = config.webhook_url.is_some(),
        api_key_enabled = config.api_key.is_some(),
        cors_restricted = config.restrict_origins(),
        production = config.production,
        forward_mode = ?config.forward_mode,
        rate_limit_max = config.rate_limit_max_requests,
        rate_limit_window_secs = config.rate_limit_window_secs,
        "config_loaded"
    );

    // Build the pipeline
    let transport = Arc::new(HttpTransport::new()?);
    let limiter = Arc::new(FixedWindowLimiter::new(
        config.rate_limit_max_requests,
        config.rate_limit_window(),
    ));
    let forwarder = Forwarder::new(transport, &config);
    let gateway = Gateway::new(config.clone(), limiter, forwarder.clone());

    let app = router(AppState::new(config.clone(), gateway));

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "relay_server_listening");

    // Run server with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    // Give detached deliveries and retries a chance to finish
    let pending = forwarder.detached().in_flight();
    if pending > 0 {
        info!(pending = pending, "relay_server_draining");
        let drained = forwarder.detached().drain(config.retry_timeout()).await;
        info!(drained = drained, "relay_server_drain_complete");
    }

    info!("relay_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("relay_server_shutting_down");
}
