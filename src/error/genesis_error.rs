//! Unified error type for the Genesis client.

use std::fmt;

use super::api::ApiError;
use super::auth::AuthError;
use super::category::ErrorCategory;
use super::network::NetworkError;
use super::system::SystemError;
use crate::traits::{CredentialsError, HttpError, WsError};

/// Unified error type for the Genesis client.
///
/// Every fallible public operation returns `GenesisError`, so callers can
/// branch on [`category`](Self::category) instead of on individual variants.
#[derive(Debug)]
pub enum GenesisError {
    /// Transport failures (connections, timeouts, 5xx).
    Network(NetworkError),

    /// Credential and authorization errors.
    Auth(AuthError),

    /// Business rejections, local validation and undecodable payloads.
    Api(ApiError),

    /// Filesystem and environment errors.
    System(SystemError),
}

impl GenesisError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            GenesisError::Network(NetworkError::ServerError { .. }) => ErrorCategory::Server,
            GenesisError::Network(_) => ErrorCategory::Network,
            GenesisError::Auth(err) => {
                if err.requires_reauth() {
                    ErrorCategory::Auth
                } else {
                    ErrorCategory::User
                }
            }
            GenesisError::Api(ApiError::InvalidResponse { .. }) => ErrorCategory::Protocol,
            GenesisError::Api(ApiError::Rejected { status, .. }) if *status >= 500 => {
                ErrorCategory::Server
            }
            GenesisError::Api(_) => ErrorCategory::User,
            GenesisError::System(SystemError::EnvironmentError { .. }) => {
                ErrorCategory::Configuration
            }
            GenesisError::System(_) => ErrorCategory::System,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenesisError::Network(err) => err.is_retryable(),
            _ => self.category().is_retryable(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            GenesisError::Network(err) => err.user_message(),
            GenesisError::Auth(err) => err.user_message(),
            GenesisError::Api(err) => err.user_message(),
            GenesisError::System(err) => err.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            GenesisError::Network(err) => err.error_code(),
            GenesisError::Auth(err) => err.error_code(),
            GenesisError::Api(err) => err.error_code(),
            GenesisError::System(err) => err.error_code(),
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }

    /// Check if this error requires signing in again.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, GenesisError::Auth(err) if err.requires_reauth())
    }

    pub(crate) fn invalid_response(err: impl fmt::Display) -> Self {
        GenesisError::Api(ApiError::InvalidResponse {
            message: err.to_string(),
        })
    }
}

impl fmt::Display for GenesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenesisError::Network(err) => write!(f, "{}", err),
            GenesisError::Auth(err) => write!(f, "{}", err),
            GenesisError::Api(err) => write!(f, "{}", err),
            GenesisError::System(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for GenesisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenesisError::Network(err) => Some(err),
            GenesisError::Auth(err) => Some(err),
            GenesisError::Api(err) => Some(err),
            GenesisError::System(err) => Some(err),
        }
    }
}

// ============================================================================
// From implementations for automatic error conversion
// ============================================================================

impl From<NetworkError> for GenesisError {
    fn from(err: NetworkError) -> Self {
        GenesisError::Network(err)
    }
}

impl From<AuthError> for GenesisError {
    fn from(err: AuthError) -> Self {
        GenesisError::Auth(err)
    }
}

impl From<ApiError> for GenesisError {
    fn from(err: ApiError) -> Self {
        GenesisError::Api(err)
    }
}

impl From<SystemError> for GenesisError {
    fn from(err: SystemError) -> Self {
        GenesisError::System(err)
    }
}

// ============================================================================
// From implementations for seam and external error types
// ============================================================================

impl From<HttpError> for GenesisError {
    fn from(err: HttpError) -> Self {
        GenesisError::Network(err.into())
    }
}

impl From<WsError> for GenesisError {
    fn from(err: WsError) -> Self {
        GenesisError::Network(err.into())
    }
}

impl From<CredentialsError> for GenesisError {
    fn from(err: CredentialsError) -> Self {
        match err {
            CredentialsError::LoadFailed(message) => {
                GenesisError::Auth(AuthError::CredentialsLoadFailed { message })
            }
            other => GenesisError::Auth(AuthError::CredentialsSaveFailed {
                message: other.to_string(),
            }),
        }
    }
}

impl From<std::io::Error> for GenesisError {
    fn from(err: std::io::Error) -> Self {
        GenesisError::System(SystemError::from_io(err, None, "access local storage"))
    }
}

impl From<serde_json::Error> for GenesisError {
    fn from(err: serde_json::Error) -> Self {
        GenesisError::invalid_response(err)
    }
}
