//! Contact form submissions.
//!
//! ## Flow
//!
//! ```text
//! JSON body → ContactForm → validate() → ContactSubmission (sanitized) → Forwarder
//! ```

pub mod types;
pub mod validate;

pub use types::{ContactForm, ContactSubmission};
pub use validate::{honeypot_field, sanitize, validate, HONEYPOT_FIELDS};
