//! Delivery policy for the workflow webhook.
//!
//! The synchronous attempt is bounded by `forward_timeout`. A timeout is
//! reported as inconclusive because the webhook may still finish the request;
//! every other failure schedules one detached retry bounded by
//! `retry_timeout`. No idempotency key is sent, so a slow original delivery
//! plus a retry can reach the webhook twice.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use super::detached::DetachedTasks;
use super::transport::{TransportError, WebhookTransport};
use crate::config::{Config, ForwardMode};
use crate::submission::ContactSubmission;

/// Definite delivery failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForwardError {
    #[error("No response from webhook: {0}")]
    Unreachable(String),

    #[error("Webhook returned 404 Not Found")]
    NotFound,

    #[error("Webhook returned non-2xx status {status}")]
    NonSuccessStatus { status: u16, body: String },

    #[error("Webhook request failed: {0}")]
    Unknown(String),
}

impl ForwardError {
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::Unreachable(_) => "unreachable",
            ForwardError::NotFound => "not_found",
            ForwardError::NonSuccessStatus { .. } => "non_success_status",
            ForwardError::Unknown(_) => "unknown",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ForwardError::NotFound => Some(404),
            ForwardError::NonSuccessStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ForwardError::Unreachable(_) => Some("Check webhook URL accessibility".to_string()),
            ForwardError::NotFound => Some("Workflow may not be activated".to_string()),
            ForwardError::NonSuccessStatus { body, .. } if !body.is_empty() => Some(body.clone()),
            _ => None,
        }
    }
}

/// What happened to a submission after it was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Webhook answered 2xx.
    Delivered { status: u16 },
    /// Deadline passed; the webhook may still process the request.
    Inconclusive,
    /// Definite failure; a detached retry was started when `retry_scheduled`.
    Failed {
        error: ForwardError,
        retry_scheduled: bool,
    },
    /// No webhook URL configured; nothing was sent.
    NotConfigured,
    /// Handed to a detached task (fire-and-forget mode).
    Dispatched,
}

/// Debug detail attached to responses outside production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookDiagnostic {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Delivery {
    pub fn diagnostic(&self) -> Option<WebhookDiagnostic> {
        match self {
            Delivery::NotConfigured => Some(WebhookDiagnostic {
                kind: "not_configured",
                message: "Webhook URL not configured".to_string(),
                status: None,
                details: Some("Set N8N_WEBHOOK_URL in the environment".to_string()),
            }),
            Delivery::Failed { error, .. } => Some(WebhookDiagnostic {
                kind: error.kind(),
                message: error.to_string(),
                status: error.status(),
                details: error.details(),
            }),
            Delivery::Delivered { .. } | Delivery::Inconclusive | Delivery::Dispatched => None,
        }
    }
}

enum Attempt {
    Delivered(u16),
    TimedOut,
    Failed(ForwardError),
}

/// Relays sanitized submissions to the configured webhook.
#[derive(Clone)]
pub struct Forwarder {
    transport: Arc<dyn WebhookTransport>,
    url: Option<Arc<str>>,
    mode: ForwardMode,
    timeout: Duration,
    retry_timeout: Duration,
    detached: DetachedTasks,
}

impl Forwarder {
    pub fn new(transport: Arc<dyn WebhookTransport>, config: &Config) -> Self {
        Self {
            transport,
            url: config.webhook_url.as_deref().map(Arc::from),
            mode: config.forward_mode,
            timeout: config.forward_timeout(),
            retry_timeout: config.retry_timeout(),
            detached: DetachedTasks::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Background deliveries and retries started by this forwarder.
    pub fn detached(&self) -> &DetachedTasks {
        &self.detached
    }

    /// Forward one submission according to the configured mode.
    pub async fn forward(&self, submission: &ContactSubmission) -> Delivery {
        let Some(url) = self.url.clone() else {
            warn!("webhook_url_not_configured");
            return Delivery::NotConfigured;
        };

        let payload = match serde_json::to_value(submission) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "webhook_payload_serialize_failed");
                return Delivery::Failed {
                    error: ForwardError::Unknown(e.to_string()),
                    retry_scheduled: false,
                };
            }
        };

        match self.mode {
            ForwardMode::Sync => self.deliver(url, payload).await,
            ForwardMode::Background => {
                let this = self.clone();
                self.detached.spawn(async move {
                    this.deliver(url, payload).await;
                });
                info!("webhook_forward_dispatched");
                Delivery::Dispatched
            }
        }
    }

    async fn deliver(&self, url: Arc<str>, payload: Value) -> Delivery {
        info!(
            timeout_ms = self.timeout.as_millis() as u64,
            "webhook_forward_start"
        );

        match attempt(self.transport.as_ref(), &url, &payload, self.timeout).await {
            Attempt::Delivered(status) => {
                info!(status_code = status, "webhook_forward_succeeded");
                Delivery::Delivered { status }
            }
            Attempt::TimedOut => {
                // The request may still land; retrying could double-deliver.
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "webhook_forward_inconclusive"
                );
                Delivery::Inconclusive
            }
            Attempt::Failed(error) => {
                log_failure(&error, "initial");
                self.schedule_retry(url, payload);
                Delivery::Failed {
                    error,
                    retry_scheduled: true,
                }
            }
        }
    }

    fn schedule_retry(&self, url: Arc<str>, payload: Value) {
        let transport = Arc::clone(&self.transport);
        let timeout = self.retry_timeout;

        info!(
            timeout_ms = timeout.as_millis() as u64,
            "webhook_retry_scheduled"
        );

        self.detached.spawn(async move {
            match attempt(transport.as_ref(), &url, &payload, timeout).await {
                Attempt::Delivered(status) => {
                    info!(status_code = status, "webhook_retry_succeeded");
                }
                Attempt::TimedOut => {
                    warn!(
                        timeout_ms = timeout.as_millis() as u64,
                        "webhook_retry_timed_out"
                    );
                }
                Attempt::Failed(error) => log_failure(&error, "retry"),
            }
        });
    }
}

/// One bounded POST. Dropping the transport future on timeout aborts it.
async fn attempt(
    transport: &dyn WebhookTransport,
    url: &str,
    payload: &Value,
    timeout: Duration,
) -> Attempt {
    let result = match tokio::time::timeout(timeout, transport.post_json(url, payload)).await {
        Ok(result) => result,
        Err(_) => return Attempt::TimedOut,
    };

    match result {
        Ok(response) if (200..300).contains(&response.status) => {
            Attempt::Delivered(response.status)
        }
        Ok(response) if response.status == 404 => Attempt::Failed(ForwardError::NotFound),
        Ok(response) => Attempt::Failed(ForwardError::NonSuccessStatus {
            status: response.status,
            body: response.body,
        }),
        Err(TransportError::Timeout) => Attempt::TimedOut,
        Err(TransportError::Connect(msg)) => Attempt::Failed(ForwardError::Unreachable(msg)),
        Err(TransportError::Other(msg)) => Attempt::Failed(ForwardError::Unknown(msg)),
    }
}

fn log_failure(failure: &ForwardError, attempt: &'static str) {
    match failure {
        ForwardError::Unreachable(msg) => {
            error!(attempt = attempt, error = %msg, "webhook_unreachable");
        }
        ForwardError::NotFound => {
            error!(attempt = attempt, status_code = 404, "webhook_not_found");
            warn!(
                hint = "workflow not activated, or the webhook URL/path changed",
                "webhook_workflow_inactive"
            );
        }
        ForwardError::NonSuccessStatus { status, body } => {
            error!(
                attempt = attempt,
                status_code = *status,
                body_preview = %body,
                "webhook_non_success_status"
            );
        }
        ForwardError::Unknown(msg) => {
            error!(attempt = attempt, error = %msg, "webhook_forward_failed");
        }
    }
}
