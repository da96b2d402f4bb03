//! Webhook forwarding.
//!
//! ```text
//! ContactSubmission → Forwarder → WebhookTransport → workflow webhook
//!                         └─ on definite failure → detached retry (logged only)
//! ```

pub mod detached;
pub mod forwarder;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use detached::DetachedTasks;
pub use forwarder::{Delivery, ForwardError, Forwarder, WebhookDiagnostic};
pub use transport::{HttpTransport, TransportError, TransportResponse, WebhookTransport};
