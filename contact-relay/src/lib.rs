//! Contact Relay - rate-limited contact form gateway.
//!
//! This library provides the shared pipeline for the two relay binaries:
//! - `relay-server`: long-running HTTP server exposing `POST /api/contact`
//! - `relay-invoke`: single-invocation handler for function platforms
//!
//! ## Architecture
//!
//! ```text
//! Browser → (web | invoke) → Gateway → Forwarder → workflow webhook
//!                               │
//!                               └─ RateLimiter (in-process, per client IP)
//! ```

pub mod config;
pub mod error;
pub mod forward;
pub mod gateway;
pub mod invoke;
pub mod limit;
pub mod submission;
pub mod util;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ForwardMode};
pub use error::GatewayError;
pub use forward::{Delivery, ForwardError, Forwarder, HttpTransport, WebhookTransport};
pub use gateway::{Gateway, InboundRequest, Reply};
pub use limit::{Decision, FixedWindowLimiter, RateLimiter};
pub use submission::{ContactForm, ContactSubmission};
pub use web::AppState;
