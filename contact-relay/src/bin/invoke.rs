//! Contact Relay Invoke - one request per process.
//!
//! Reads a single invocation event (JSON) from stdin, runs it through the
//! contact pipeline and writes the response object to stdout. Logs go to
//! stderr so stdout stays parseable.
//!
//! The rate limiter only lives as long as this process, the same way an
//! in-memory limiter resets on every cold start of a function platform.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relay::invoke::{handle_invocation, Invocation};
use relay::{Config, FixedWindowLimiter, Forwarder, Gateway, HttpTransport};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging on stderr
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = Arc::new(Config::from_env());

    let transport = Arc::new(HttpTransport::new()?);
    let limiter = Arc::new(FixedWindowLimiter::new(
        config.rate_limit_max_requests,
        config.rate_limit_window(),
    ));
    let forwarder = Forwarder::new(transport, &config);
    let gateway = Gateway::new(config.clone(), limiter, forwarder.clone()).without_body_limit();

    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .context("Failed to read invocation from stdin")?;

    let invocation: Invocation =
        serde_json::from_str(&raw).context("Failed to parse invocation event")?;

    info!(
        method = %invocation.method,
        path = invocation.path.as_deref().unwrap_or("/api/contact"),
        "invocation_received"
    );

    let response = handle_invocation(&gateway, invocation).await;

    let out = serde_json::to_vec(&response).context("Failed to serialize response")?;
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(&out)
        .await
        .context("Failed to write response")?;
    stdout.flush().await.context("Failed to flush response")?;

    info!(status_code = response.status_code, "invocation_complete");

    // The response is already out; detached work gets until its own deadline.
    if forwarder.detached().in_flight() > 0 {
        let drained = forwarder.detached().drain(config.retry_timeout()).await;
        info!(drained = drained, "invocation_drain_complete");
    }

    Ok(())
}
