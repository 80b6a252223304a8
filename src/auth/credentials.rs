//! The bearer credential and its in-memory holder.
//!
//! [`CredentialStore`] keeps the copy the request gateway attaches to
//! outgoing calls; persistence goes through a [`CredentialsProvider`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::traits::{CredentialsError, CredentialsProvider};

/// Opaque bearer token.
///
/// The client never inspects it; validity is only discovered when an
/// authenticated call comes back 401. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(***)")
    }
}

/// Holds the current credential and its persisted backing value.
///
/// The in-memory copy is what the gateway reads on every request. Clearing
/// drops the in-memory copy before touching storage, so no request issued
/// after `clear` starts can pick up the old token.
pub struct CredentialStore {
    current: RwLock<Option<Credential>>,
    provider: Arc<dyn CredentialsProvider>,
}

impl CredentialStore {
    pub fn new(provider: Arc<dyn CredentialsProvider>) -> Self {
        Self {
            current: RwLock::new(None),
            provider,
        }
    }

    /// The credential currently attached to outgoing requests.
    pub fn current(&self) -> Option<Credential> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Read the persisted credential without adopting it.
    pub async fn load_persisted(&self) -> Result<Option<Credential>, CredentialsError> {
        self.provider.load().await
    }

    /// Adopt a credential in memory only.
    pub fn set(&self, credential: Credential) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credential);
    }

    /// Adopt a credential and persist it.
    ///
    /// The in-memory copy is set even if persisting fails.
    pub async fn store(&self, credential: Credential) -> Result<(), CredentialsError> {
        self.set(credential.clone());
        self.provider.save(&credential).await
    }

    /// Drop the in-memory credential.
    pub fn forget(&self) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    /// Drop the in-memory credential and remove the persisted one.
    pub async fn clear(&self) -> Result<(), CredentialsError> {
        self.forget();
        self.provider.clear().await
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}
