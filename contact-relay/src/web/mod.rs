//! Standalone HTTP server.
//!
//! Routes:
//! - `POST /api/contact`: contact form submission
//! - `GET /api/health`: liveness probe
//! - `GET /`: API description
//!
//! Anything else gets a JSON 404.

pub mod handlers;
pub mod layers;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{any, get},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

pub use handlers::{contact, health, index, not_found, AppState, HealthResponse};
pub use layers::{cors_layer, SECURITY_HEADERS};

/// Hard cap on buffered bodies; the gateway applies the configured limit.
const READ_CAP: usize = 1024 * 1024;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/contact", any(contact))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(READ_CAP))
        .layer(CatchPanicLayer::custom(layers::panic_response))
        .layer(cors_layer(&state.config));

    for (name, value) in SECURITY_HEADERS {
        app = app.layer(SetResponseHeaderLayer::overriding(
            name,
            HeaderValue::from_static(value),
        ));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
