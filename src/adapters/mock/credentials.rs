//! Single-slot credential store held in memory.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::auth::Credential;
use crate::traits::{CredentialsError, CredentialsProvider};

#[derive(Debug, Default)]
struct Slot {
    credential: Option<Credential>,
    fail_load: bool,
    fail_save: bool,
    fail_clear: bool,
    clear_calls: usize,
}

/// Credential store for tests. Clones share the same slot, so a test can
/// keep a handle and inspect what the client persisted.
///
/// ```ignore
/// let store = InMemoryCredentials::with_credential(Credential::new("tok"));
/// let client = GenesisClient::new(http, Arc::new(store.clone()), push, config);
/// client.logout().await;
/// assert!(store.stored().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentials {
    slot: Arc<Mutex<Slot>>,
}

impl InMemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        let store = Self::new();
        store.set_stored(Some(credential));
        store
    }

    pub fn set_load_should_fail(&self, fail: bool) {
        self.slot.lock().unwrap().fail_load = fail;
    }

    pub fn set_save_should_fail(&self, fail: bool) {
        self.slot.lock().unwrap().fail_save = fail;
    }

    pub fn set_clear_should_fail(&self, fail: bool) {
        self.slot.lock().unwrap().fail_clear = fail;
    }

    pub fn stored(&self) -> Option<Credential> {
        self.slot.lock().unwrap().credential.clone()
    }

    pub fn set_stored(&self, credential: Option<Credential>) {
        self.slot.lock().unwrap().credential = credential;
    }

    /// Counts failed clears too.
    pub fn clear_calls(&self) -> usize {
        self.slot.lock().unwrap().clear_calls
    }
}

#[async_trait]
impl CredentialsProvider for InMemoryCredentials {
    async fn load(&self) -> Result<Option<Credential>, CredentialsError> {
        let slot = self.slot.lock().unwrap();
        if slot.fail_load {
            return Err(CredentialsError::LoadFailed("injected load failure".to_string()));
        }
        Ok(slot.credential.clone())
    }

    async fn save(&self, credential: &Credential) -> Result<(), CredentialsError> {
        let mut slot = self.slot.lock().unwrap();
        if slot.fail_save {
            return Err(CredentialsError::SaveFailed("injected save failure".to_string()));
        }
        slot.credential = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialsError> {
        let mut slot = self.slot.lock().unwrap();
        slot.clear_calls += 1;
        if slot.fail_clear {
            return Err(CredentialsError::ClearFailed("injected clear failure".to_string()));
        }
        slot.credential = None;
        Ok(())
    }
}
