//! Single-invocation adapter.
//!
//! Hosting platforms that run one function call per request hand over a JSON
//! event and expect a JSON response object back. This module maps that shape
//! onto the shared [`Gateway`]. The platform caps body size itself, so the
//! gateway used here runs without its own body limit.

use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::GatewayError;
use crate::gateway::{Gateway, InboundRequest};

/// One inbound request as delivered by the platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub query: HashMap<String, String>,
    /// Raw body string, or an already-parsed JSON document
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub remote_address: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Response object handed back to the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl InvocationResponse {
    fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self::with_body(status, body),
            Err(e) => {
                warn!(error = %e, "invocation_response_serialize_failed");
                Self::with_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    r#"{"success":false,"error":"Internal server error","message":"Internal server error"}"#
                        .to_string(),
                )
            }
        }
    }

    fn with_body(status: StatusCode, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }
}

/// Run one invocation through the gateway.
pub async fn handle_invocation(gateway: &Gateway, invocation: Invocation) -> InvocationResponse {
    let request = match to_inbound(invocation) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };

    match gateway.handle(request).await {
        Ok(reply) => InvocationResponse::json(StatusCode::OK, &reply.body()),
        Err(e) => error_response(e),
    }
}

fn error_response(e: GatewayError) -> InvocationResponse {
    let mut response = InvocationResponse::json(e.status(), &e.body());
    if let Some(secs) = e.retry_after() {
        response
            .headers
            .insert("retry-after".to_string(), secs.to_string());
    }
    response
}

fn to_inbound(invocation: Invocation) -> Result<InboundRequest, GatewayError> {
    let method = Method::from_bytes(invocation.method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| GatewayError::MethodNotAllowed)?;

    let mut headers = HeaderMap::new();
    for (name, value) in &invocation.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(header = %name, "invocation_header_skipped"),
        }
    }

    let query = if invocation.query.is_empty() {
        None
    } else {
        let mut encoder = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in &invocation.query {
            encoder.append_pair(name, value);
        }
        Some(encoder.finish())
    };

    let body = match invocation.body {
        None | Some(Value::Null) => Bytes::new(),
        Some(Value::String(raw)) => Bytes::from(raw),
        Some(parsed) => Bytes::from(
            serde_json::to_vec(&parsed).map_err(|e| GatewayError::Internal(e.to_string()))?,
        ),
    };

    let peer = invocation
        .remote_address
        .as_deref()
        .and_then(|addr| addr.trim().parse::<IpAddr>().ok());

    Ok(InboundRequest {
        method,
        headers,
        query,
        body,
        peer,
    })
}
