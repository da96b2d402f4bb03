//! HTTP handlers for the standalone server.
//!
//! The contact handler only translates between axum and the gateway; all
//! checks live in [`crate::gateway`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, RawQuery, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::gateway::{Gateway, InboundRequest};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Gateway,
}

impl AppState {
    pub fn new(config: Arc<Config>, gateway: Gateway) -> Self {
        Self { config, gateway }
    }
}

const ROUTES: [&str; 2] = ["POST /api/contact", "GET /api/health"];

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Describes the API for anyone who opens the server in a browser.
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "Contact relay API",
        "endpoints": {
            "POST /api/contact": "Submit contact form",
            "GET /api/health": "Health check",
        },
    }))
}

/// Catch-all for unknown routes.
pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    warn!(method = %method, path = %uri.path(), "route_not_found");

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "method": method.as_str(),
            "path": uri.path(),
            "availableRoutes": ROUTES,
        })),
    )
}

// =============================================================================
// Contact Form
// =============================================================================

/// Contact form endpoint.
///
/// Mounted for every method so that wrong methods get the gateway's JSON 405.
pub async fn contact(
    State(state): State<AppState>,
    method: Method,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = InboundRequest {
        method,
        headers,
        query,
        body,
        peer: connect_info.map(|ConnectInfo(addr)| addr.ip()),
    };

    match state.gateway.handle(request).await {
        Ok(reply) => reply.into_response(),
        Err(e) => e.into_response(),
    }
}
