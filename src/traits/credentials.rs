//! Durable credential storage seam.
//!
//! The client persists exactly one bearer credential. Storage sits behind
//! [`CredentialsProvider`] so the file-backed store can be swapped for an
//! in-memory one in tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::Credential;

/// Credential storage failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    #[error("stored credential unreadable: {0}")]
    LoadFailed(String),
    #[error("could not write credential: {0}")]
    SaveFailed(String),
    #[error("could not remove stored credential: {0}")]
    ClearFailed(String),
    /// The storage location itself is missing or cannot be created.
    #[error("credential storage unavailable: {0}")]
    Unavailable(String),
}

/// Single-slot durable credential storage.
///
/// An absent slot means the client is anonymous.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// `Ok(None)` when nothing is stored; `Err` only when the store could
    /// not be read.
    async fn load(&self) -> Result<Option<Credential>, CredentialsError>;

    /// Persist a credential, replacing any stored one.
    async fn save(&self, credential: &Credential) -> Result<(), CredentialsError>;

    /// Remove the stored credential. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<(), CredentialsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_error_display() {
        assert_eq!(
            CredentialsError::LoadFailed("expected value".to_string()).to_string(),
            "stored credential unreadable: expected value"
        );
        assert_eq!(
            CredentialsError::Unavailable("no home directory".to_string()).to_string(),
            "credential storage unavailable: no home directory"
        );
    }
}
