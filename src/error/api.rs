//! API-level error types.
//!
//! Errors produced after a response was received: business rejections
//! carrying the server's `detail`, local validation, and payloads that do
//! not decode.

use std::fmt;

/// Message shown when a failed transfer carries no `detail`.
pub const DEFAULT_TRANSFER_FAILURE: &str = "Transfer failed";

/// Message shown when a failed conversion carries no `detail`.
pub const DEFAULT_CONVERT_FAILURE: &str = "Conversion failed";

/// API-specific error variants.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// The server refused the request. `detail` is the human-readable
    /// reason from the response body, or a generic fallback.
    Rejected { status: u16, detail: String },

    /// Input rejected locally before any request was sent.
    Validation { field: String, message: String },

    /// A transfer is already awaiting its response.
    TransferInFlight,

    /// The response body could not be decoded.
    InvalidResponse { message: String },
}

impl ApiError {
    /// Build a rejection from a non-success response body, falling back to
    /// `fallback` when the body has no usable `detail`.
    pub fn rejected(status: u16, body: &[u8], fallback: &str) -> Self {
        ApiError::Rejected {
            status,
            detail: extract_detail(body).unwrap_or_else(|| fallback.to_string()),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { detail, .. } => detail.clone(),
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::TransferInFlight => {
                "A transfer is already in progress. Please wait.".to_string()
            }
            ApiError::InvalidResponse { .. } => {
                "Received an invalid response from the server. Please try again.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Rejected { .. } => "E_API_REJECTED",
            ApiError::Validation { .. } => "E_API_VALIDATION",
            ApiError::TransferInFlight => "E_API_IN_FLIGHT",
            ApiError::InvalidResponse { .. } => "E_API_INVALID",
        }
    }

    /// HTTP status of a rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Rejected { status, detail } => {
                write!(f, "Request rejected ({}): {}", status, detail)
            }
            ApiError::Validation { field, message } => {
                write!(f, "Invalid {}: {}", field, message)
            }
            ApiError::TransferInFlight => write!(f, "Transfer already in flight"),
            ApiError::InvalidResponse { message } => write!(f, "Invalid response: {}", message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Pull a human-readable `detail` out of an error body.
///
/// The backend uses either `{"detail": "..."}` or, for validation failures,
/// `{"detail": [{"msg": "..."}]}`.
pub fn extract_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .map(str::to_string),
        _ => None,
    }
}
