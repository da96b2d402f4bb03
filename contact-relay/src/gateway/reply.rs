//! Success envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::forward::{Delivery, WebhookDiagnostic};
use crate::submission::ContactSubmission;

/// A request the gateway answered with `success: true`.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Submission accepted; `delivery` says what the forwarder did with it.
    Accepted {
        submission: ContactSubmission,
        delivery: Delivery,
        show_diagnostics: bool,
    },
    /// Honeypot tripped. Looks like success to the sender; nothing was forwarded.
    Trapped,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessBody<'a> {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a ContactSubmission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_error: Option<WebhookDiagnostic>,
}

impl Reply {
    pub fn body(&self) -> SuccessBody<'_> {
        match self {
            Reply::Accepted {
                submission,
                delivery,
                show_diagnostics,
            } => SuccessBody {
                success: true,
                message: "Contact form submitted successfully",
                data: Some(submission),
                webhook_error: if *show_diagnostics {
                    delivery.diagnostic()
                } else {
                    None
                },
            },
            Reply::Trapped => SuccessBody {
                success: true,
                message: "Thank you for your submission",
                data: None,
                webhook_error: None,
            },
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::ContactForm;

    fn submission() -> ContactSubmission {
        ContactSubmission::from_form(
            &ContactForm {
                phone: Some("555".to_string()),
                ..Default::default()
            },
            chrono::Utc::now(),
            "203.0.113.7",
        )
    }

    #[test]
    fn test_trapped_body_has_no_data() {
        let json = serde_json::to_value(Reply::Trapped.body()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "message": "Thank you for your submission"})
        );
    }

    #[test]
    fn test_diagnostic_follows_flag() {
        let shown = Reply::Accepted {
            submission: submission(),
            delivery: Delivery::NotConfigured,
            show_diagnostics: true,
        };
        let hidden = Reply::Accepted {
            submission: submission(),
            delivery: Delivery::NotConfigured,
            show_diagnostics: false,
        };

        let shown = serde_json::to_value(shown.body()).unwrap();
        let hidden = serde_json::to_value(hidden.body()).unwrap();

        assert_eq!(shown["webhookError"]["message"], "Webhook URL not configured");
        assert!(hidden.get("webhookError").is_none());
        assert_eq!(hidden["data"]["phone"], "555");
    }
}
