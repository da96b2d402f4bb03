//! Inbound form and outbound submission types.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::validate::sanitize;

/// Raw contact form body as sent by the browser.
///
/// Every field is optional at the type level; `phone` is enforced by
/// [`validate`](super::validate::validate). Unknown fields (honeypots
/// included) are ignored here and inspected on the raw JSON instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub business: Option<String>,
    #[serde(default)]
    pub example_information1: Option<String>,
    #[serde(default)]
    pub example_information2: Option<String>,
    #[serde(default)]
    pub example_information3: Option<String>,
}

/// Sanitized submission forwarded to the webhook and echoed back as `data`.
///
/// Key names match what the downstream workflow maps on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub phone: String,
    pub name: String,
    pub email: String,
    pub business: String,
    pub example_information1: String,
    pub example_information2: String,
    pub example_information3: String,
    /// Receipt time, ISO-8601 UTC with milliseconds
    pub timestamp: String,
    /// Best-effort client address
    pub ip: String,
}

impl ContactSubmission {
    /// Build the sanitized submission from a validated form.
    pub fn from_form(form: &ContactForm, received_at: DateTime<Utc>, ip: &str) -> Self {
        Self {
            phone: sanitize(form.phone.as_deref()),
            name: sanitize(form.name.as_deref()),
            email: sanitize(form.email.as_deref()),
            business: sanitize(form.business.as_deref()),
            example_information1: sanitize(form.example_information1.as_deref()),
            example_information2: sanitize(form.example_information2.as_deref()),
            example_information3: sanitize(form.example_information3.as_deref()),
            timestamp: received_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            ip: sanitize(Some(ip)),
        }
    }
}
