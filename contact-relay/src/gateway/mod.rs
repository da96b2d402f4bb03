//! The contact pipeline shared by both entry points.
//!
//! ```text
//! method → content-type → size → rate limit → honeypot → API key
//!        → validate → sanitize → forward → reply
//! ```
//!
//! Everything before `forward` can reject the request. Once a submission is
//! validated it is accepted, whatever happens downstream.

pub mod reply;

use std::net::IpAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method};
use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::GatewayError;
use crate::forward::Forwarder;
use crate::limit::{Decision, RateLimiter};
use crate::submission::{honeypot_field, validate, ContactForm, ContactSubmission};
use crate::util::client_ip::client_ip;

pub use reply::{Reply, SuccessBody};

/// Transport-neutral view of one inbound request.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub headers: HeaderMap,
    /// Raw query string without the leading `?`
    pub query: Option<String>,
    pub body: Bytes,
    /// Address of the connected peer, when the transport knows it
    pub peer: Option<IpAddr>,
}

/// Validates, filters and forwards contact submissions.
#[derive(Clone)]
pub struct Gateway {
    config: Arc<Config>,
    limiter: Arc<dyn RateLimiter>,
    forwarder: Forwarder,
    body_limit: Option<usize>,
}

impl Gateway {
    pub fn new(config: Arc<Config>, limiter: Arc<dyn RateLimiter>, forwarder: Forwarder) -> Self {
        let body_limit = Some(config.max_body_bytes);
        Self {
            config,
            limiter,
            forwarder,
            body_limit,
        }
    }

    /// Skip the body size gate; the hosting platform enforces its own limit.
    pub fn without_body_limit(mut self) -> Self {
        self.body_limit = None;
        self
    }

    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }

    pub async fn handle(&self, request: InboundRequest) -> Result<Reply, GatewayError> {
        if request.method != Method::POST {
            warn!(method = %request.method, "contact_method_not_allowed");
            return Err(GatewayError::MethodNotAllowed);
        }

        if !is_json(&request.headers) {
            warn!("contact_invalid_content_type");
            return Err(GatewayError::InvalidContentType);
        }

        if let Some(limit) = self.body_limit {
            if declared_length(&request.headers) > limit || request.body.len() > limit {
                warn!(
                    body_length = request.body.len(),
                    limit = limit,
                    "contact_payload_too_large"
                );
                return Err(GatewayError::PayloadTooLarge { limit });
            }
        }

        let ip = client_ip(&request.headers, request.peer);

        if let Decision::Limited { retry_after_secs } = self.limiter.check(&ip) {
            warn!(ip = %ip, retry_after = retry_after_secs, "rate_limit_exceeded");
            return Err(GatewayError::RateLimited { retry_after_secs });
        }

        let body = match serde_json::from_slice::<Value>(&request.body) {
            Ok(Value::Object(map)) => map,
            _ => {
                warn!(ip = %ip, "contact_malformed_body");
                return Err(GatewayError::MalformedBody);
            }
        };

        if let Some(field) = honeypot_field(&body) {
            warn!(ip = %ip, field = field, "honeypot_triggered");
            return Ok(Reply::Trapped);
        }

        if let Some(expected) = self.config.api_key.as_deref() {
            let provided = provided_api_key(&request.headers, request.query.as_deref());
            if provided.as_deref() != Some(expected) {
                warn!(ip = %ip, key_present = provided.is_some(), "api_key_invalid");
                return Err(GatewayError::Unauthorized);
            }
        }

        let form: ContactForm = serde_json::from_value(Value::Object(body)).map_err(|e| {
            warn!(ip = %ip, error = %e, "contact_malformed_body");
            GatewayError::MalformedBody
        })?;

        if let Err(e) = validate(&form) {
            warn!(ip = %ip, reason = %e, "contact_validation_failed");
            return Err(e);
        }

        let submission = ContactSubmission::from_form(&form, Utc::now(), &ip);

        info!(
            ip = %submission.ip,
            has_email = !submission.email.is_empty(),
            has_name = !submission.name.is_empty(),
            "contact_received"
        );

        let delivery = self.forwarder.forward(&submission).await;

        Ok(Reply::Accepted {
            submission,
            delivery,
            show_diagnostics: !self.config.production,
        })
    }
}

/// `application/json`, with or without parameters such as `charset`.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

fn declared_length(headers: &HeaderMap) -> usize {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

/// `X-API-Key` header first, then the `api_key` query parameter. An empty
/// header does not hide the query parameter.
fn provided_api_key(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    let header_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .filter(|key| !key.is_empty());
    if let Some(key) = header_key {
        return Some(key.to_string());
    }

    query.and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(name, _)| name == "api_key")
            .map(|(_, value)| value.into_owned())
    })
}
