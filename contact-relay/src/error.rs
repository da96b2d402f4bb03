//! Client-facing rejections and their HTTP mapping.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Reasons the gateway refuses a submission.
///
/// Every variant stops the pipeline before anything is forwarded. Downstream
/// delivery problems are not represented here; they never fail a request.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Only POST requests are accepted")]
    MethodNotAllowed,

    #[error("Content-Type must be application/json")]
    InvalidContentType,

    #[error("Request body exceeds maximum size of {kb}KB", kb = .limit / 1024)]
    PayloadTooLarge { limit: usize },

    #[error("Request body must be a JSON object of string fields")]
    MalformedBody,

    #[error("Rate limit exceeded. Please try again in {retry_after_secs} seconds.")]
    RateLimited { retry_after_secs: u64 },

    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error("Phone number is required")]
    PhoneRequired,

    #[error("Invalid phone number format")]
    InvalidPhone,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body of a rejected request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::InvalidContentType
            | GatewayError::MalformedBody
            | GatewayError::PhoneRequired
            | GatewayError::InvalidPhone
            | GatewayError::InvalidEmail => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short title for the `error` field.
    pub fn title(&self) -> &'static str {
        match self {
            GatewayError::MethodNotAllowed => "Method not allowed",
            GatewayError::InvalidContentType => "Invalid Content-Type",
            GatewayError::PayloadTooLarge { .. } => "Payload too large",
            GatewayError::MalformedBody => "Invalid request body",
            GatewayError::RateLimited { .. } => "Too many requests",
            GatewayError::Unauthorized => "Unauthorized",
            GatewayError::PhoneRequired
            | GatewayError::InvalidPhone
            | GatewayError::InvalidEmail => "Validation failed",
            GatewayError::Internal(_) => "Internal server error",
        }
    }

    pub fn retry_after(&self) -> Option<u64> {
        match self {
            GatewayError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }

    pub fn body(&self) -> ErrorBody {
        // Internal detail stays in the logs.
        let message = match self {
            GatewayError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        ErrorBody {
            success: false,
            error: self.title(),
            message,
            retry_after: self.retry_after(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), Json(self.body())).into_response();

        if let Some(secs) = self.retry_after() {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}
