//! Session ownership and teardown.
//!
//! [`SessionRegistry`] is the single owner of the active [`Session`]. Every
//! session gets a fresh epoch number; long-running components attach to the
//! epoch they were started for and are torn down, in attach order, before
//! the session reference is cleared.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::credentials::{Credential, CredentialStore};
use crate::models::UserProfile;

/// An authenticated session.
#[derive(Clone, PartialEq)]
pub struct Session {
    pub user: UserProfile,
    pub credential: Credential,
}

impl Session {
    pub fn new(user: UserProfile, credential: Credential) -> Self {
        Self { user, credential }
    }

    pub fn user_id(&self) -> &str {
        &self.user.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user.user_id)
            .field("is_admin", &self.user.is_admin)
            .finish_non_exhaustive()
    }
}

/// Authentication state as seen by the rest of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Nothing has happened yet.
    #[default]
    Idle,
    /// Validating a persisted credential.
    Restoring,
    Authenticated,
    Anonymous,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Logout,
    CredentialRejected,
    Replaced,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Logout => write!(f, "logout"),
            EndReason::CredentialRejected => write!(f, "credential rejected"),
            EndReason::Replaced => write!(f, "replaced by new session"),
        }
    }
}

/// A component whose lifetime is bound to one session.
///
/// `teardown` runs while the registry lock is held, so it must be
/// synchronous and must not call back into the registry.
pub trait SessionBound: Send + Sync {
    fn teardown(&self);
}

struct Inner {
    session: Option<Arc<Session>>,
    epoch: u64,
    bound: Vec<Arc<dyn SessionBound>>,
}

/// Owner of the single active session.
pub struct SessionRegistry {
    inner: Mutex<Inner>,
    state: watch::Sender<AuthState>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::Idle);
        Self {
            inner: Mutex::new(Inner {
                session: None,
                epoch: 0,
                bound: Vec::new(),
            }),
            state,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Install a new session and return its epoch. Any existing session is
    /// ended first.
    pub fn begin(&self, session: Session) -> u64 {
        let mut inner = self.lock();
        if inner.session.is_some() {
            Self::end_locked(&mut inner, EndReason::Replaced);
        }
        inner.epoch += 1;
        info!(user_id = %session.user_id(), epoch = inner.epoch, "Session started");
        inner.session = Some(Arc::new(session));
        let epoch = inner.epoch;
        drop(inner);
        self.state.send_replace(AuthState::Authenticated);
        epoch
    }

    /// Bind a component to the session with `epoch`.
    ///
    /// Returns false, after tearing the component down, if that session is
    /// no longer active.
    pub fn attach(&self, epoch: u64, component: Arc<dyn SessionBound>) -> bool {
        let mut inner = self.lock();
        if inner.session.is_none() || inner.epoch != epoch {
            drop(inner);
            debug!(epoch, "Attach to stale session, tearing component down");
            component.teardown();
            return false;
        }
        inner.bound.push(component);
        true
    }

    /// End the active session, if any. Returns true if one was ended.
    pub fn end(&self, reason: EndReason) -> bool {
        let mut inner = self.lock();
        let ended = inner.session.is_some();
        if ended {
            Self::end_locked(&mut inner, reason);
        }
        drop(inner);
        self.state.send_replace(AuthState::Anonymous);
        ended
    }

    /// End the session only if it is still the one with `epoch`.
    pub fn end_if_current(&self, epoch: u64, reason: EndReason) -> bool {
        let mut inner = self.lock();
        if inner.session.is_none() || inner.epoch != epoch {
            return false;
        }
        Self::end_locked(&mut inner, reason);
        drop(inner);
        self.state.send_replace(AuthState::Anonymous);
        true
    }

    fn end_locked(inner: &mut Inner, reason: EndReason) {
        for component in inner.bound.drain(..) {
            component.teardown();
        }
        if let Some(session) = inner.session.take() {
            info!(user_id = %session.user_id(), epoch = inner.epoch, %reason, "Session ended");
        }
        inner.epoch += 1;
    }

    /// Replace the user profile of the active session.
    pub fn update_user(&self, epoch: u64, user: UserProfile) -> bool {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            return false;
        }
        match inner.session.as_ref() {
            Some(current) => {
                let updated = Session::new(user, current.credential.clone());
                inner.session = Some(Arc::new(updated));
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<Arc<Session>> {
        self.lock().session.clone()
    }

    /// Epoch of the active session, if there is one.
    pub fn active_epoch(&self) -> Option<u64> {
        let inner = self.lock();
        inner.session.as_ref().map(|_| inner.epoch)
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.active_epoch() == Some(epoch)
    }

    /// Publish a state without touching the session (bootstrap progress).
    pub fn set_state(&self, state: AuthState) {
        self.state.send_replace(state);
    }

    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Tear down the session and then clear the credential.
///
/// Components and the session go first, then the in-memory credential, so
/// nothing issued afterwards can authenticate as the ended session. The
/// persisted credential is removed last.
pub async fn end_session(registry: &SessionRegistry, credentials: &CredentialStore, reason: EndReason) {
    registry.end(reason);
    if let Err(e) = credentials.clear().await {
        warn!("Failed to clear persisted credential: {}", e);
    }
}
