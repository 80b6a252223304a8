//! Session bootstrap.
//!
//! Restores a persisted credential once at startup and owns the
//! user-initiated login and logout transitions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{end_session, AuthState, Credential, CredentialStore, EndReason, Session, SessionRegistry};
use crate::error::{AuthError, GenesisResult};
use crate::gateway::GenesisApi;

/// Drives `Idle → Restoring → {Authenticated, Anonymous}` and login/logout.
pub struct SessionBootstrapper {
    api: GenesisApi,
    credentials: Arc<CredentialStore>,
    sessions: Arc<SessionRegistry>,
    started: AtomicBool,
}

impl SessionBootstrapper {
    pub fn new(api: GenesisApi, credentials: Arc<CredentialStore>, sessions: Arc<SessionRegistry>) -> Self {
        Self {
            api,
            credentials,
            sessions,
            started: AtomicBool::new(false),
        }
    }

    /// Restore the persisted session.
    ///
    /// Only the first call does any work; later calls return the current
    /// state without touching storage or the network.
    pub async fn restore(&self) -> AuthState {
        if self.started.swap(true, Ordering::SeqCst) {
            return self.sessions.state();
        }
        self.sessions.set_state(AuthState::Restoring);

        let credential = match self.credentials.load_persisted().await {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                info!("No stored credential, starting anonymous");
                return self.settle_anonymous();
            }
            Err(e) => {
                warn!("Could not read stored credential, starting anonymous: {}", e);
                return self.settle_anonymous();
            }
        };

        match self.api.me_with(&credential).await {
            Ok(user) if user.has_identity() => {
                if self.sessions.current().is_some() {
                    // A login finished while we were validating; it wins.
                    return self.sessions.state();
                }
                info!(user_id = %user.user_id, "Restored session");
                self.credentials.set(credential.clone());
                self.sessions.begin(Session::new(user, credential));
                AuthState::Authenticated
            }
            Ok(_) => {
                warn!("Stored credential resolved to an empty identity, discarding it");
                self.discard(&credential).await
            }
            Err(e) => {
                warn!(code = e.error_code(), "Stored credential not accepted: {}", e);
                self.discard(&credential).await
            }
        }
    }

    fn settle_anonymous(&self) -> AuthState {
        if self.sessions.current().is_none() {
            self.sessions.set_state(AuthState::Anonymous);
        }
        self.sessions.state()
    }

    async fn discard(&self, credential: &Credential) -> AuthState {
        // Leave storage alone if a concurrent login already replaced it.
        if self.sessions.current().is_none()
            && self.credentials.current().map_or(true, |c| &c == credential)
        {
            if let Err(e) = self.credentials.clear().await {
                warn!("Failed to clear stored credential: {}", e);
            }
        }
        self.settle_anonymous()
    }

    /// Log in and start a new session, replacing any active one.
    ///
    /// Returns the new session's epoch. Failing to persist the credential is
    /// logged; the session still starts.
    pub async fn login(&self, email: &str, password: &str) -> GenesisResult<u64> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials {
                message: "Email and password are required".to_string(),
            }
            .into());
        }
        let login = self.api.login(email.trim(), password).await?;

        if let Err(e) = self.credentials.store(login.token.clone()).await {
            warn!("Logged in but could not persist the credential: {}", e);
        }
        self.started.store(true, Ordering::SeqCst);
        let epoch = self.sessions.begin(Session::new(login.user, login.token));
        Ok(epoch)
    }

    /// End the session and forget the credential.
    pub async fn logout(&self) {
        end_session(&self.sessions, &self.credentials, EndReason::Logout).await;
    }
}
