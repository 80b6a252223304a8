//! Transport failures on the REST and push paths.
//!
//! None of these end the session. Sync logs them and waits for the next
//! tick; the push channel schedules a reconnect.

use thiserror::Error;

use crate::traits::{HttpError, WsError};

#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("{operation} timed out")]
    Timeout { operation: String },

    /// The API answered with a 5xx status.
    #[error("server returned {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("push channel dropped: {message}")]
    PushDisconnected { message: String },

    #[error("request cancelled")]
    Cancelled,

    #[error("network error: {message}")]
    Other { message: String },
}

impl NetworkError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, NetworkError::Cancelled | NetworkError::Other { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Cannot reach Genesis. Check your connection.".to_string()
            }
            NetworkError::Timeout { .. } => "Genesis took too long to answer.".to_string(),
            NetworkError::ServerError { .. } => {
                "Genesis is having trouble right now. Try again shortly.".to_string()
            }
            NetworkError::PushDisconnected { .. } => {
                "Live updates were interrupted. Reconnecting.".to_string()
            }
            NetworkError::Cancelled => "The request was cancelled.".to_string(),
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::ServerError { .. } => "E_NET_SERVER",
            NetworkError::PushDisconnected { .. } => "E_NET_PUSH",
            NetworkError::Cancelled => "E_NET_CANCEL",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

impl From<HttpError> for NetworkError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed { message },
            HttpError::Timeout(_) => NetworkError::Timeout {
                operation: "API request".to_string(),
            },
            HttpError::Cancelled => NetworkError::Cancelled,
            HttpError::Io(message) | HttpError::InvalidUrl(message) | HttpError::Other(message) => {
                NetworkError::Other { message }
            }
        }
    }
}

impl From<WsError> for NetworkError {
    fn from(err: WsError) -> Self {
        match err {
            WsError::ConnectionFailed(message) => NetworkError::ConnectionFailed { message },
            WsError::Transport(message) => NetworkError::PushDisconnected { message },
        }
    }
}
