//! Credential and authorization failures.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// An authenticated call was attempted with no credential held.
    #[error("not signed in")]
    NotAuthenticated,

    /// The server answered 401 to a request that carried the credential.
    /// The session has already been ended when this is returned.
    #[error("credential rejected by server")]
    CredentialRejected,

    /// Login refused the email/password pair.
    #[error("login refused: {message}")]
    InvalidCredentials { message: String },

    #[error("{} requires an administrator", .resource.as_deref().unwrap_or("this action"))]
    AccessDenied { resource: Option<String> },

    #[error("stored credential unreadable: {message}")]
    CredentialsLoadFailed { message: String },

    #[error("credential not persisted: {message}")]
    CredentialsSaveFailed { message: String },
}

impl AuthError {
    /// Only a fresh login clears these.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, AuthError::NotAuthenticated | AuthError::CredentialRejected)
    }

    pub fn user_message(&self) -> String {
        match self {
            AuthError::NotAuthenticated => "Sign in to continue.".to_string(),
            AuthError::CredentialRejected => {
                "Your session has expired. Please sign in again.".to_string()
            }
            AuthError::InvalidCredentials { message } if message.is_empty() => {
                "Invalid email or password.".to_string()
            }
            AuthError::InvalidCredentials { message } => message.clone(),
            AuthError::AccessDenied { resource: Some(r) } => {
                format!("Only administrators can view {}.", r)
            }
            AuthError::AccessDenied { resource: None } => {
                "Only administrators can do that.".to_string()
            }
            AuthError::CredentialsLoadFailed { .. } => {
                "Your saved session could not be read. Please sign in again.".to_string()
            }
            AuthError::CredentialsSaveFailed { .. } => {
                "Signed in, but the session will not be remembered.".to_string()
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::NotAuthenticated => "E_AUTH_NOT_AUTH",
            AuthError::CredentialRejected => "E_AUTH_REJECTED",
            AuthError::InvalidCredentials { .. } => "E_AUTH_INVALID",
            AuthError::AccessDenied { .. } => "E_AUTH_ACCESS",
            AuthError::CredentialsLoadFailed { .. } => "E_AUTH_CRED_LOAD",
            AuthError::CredentialsSaveFailed { .. } => "E_AUTH_CRED_SAVE",
        }
    }
}
