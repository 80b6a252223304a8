//! The assembled wallet client.
//!
//! [`GenesisClient`] wires the gateway, session registry, bootstrapper,
//! push channel, sync scheduler and notification bus together. For every
//! session it builds a fresh push channel and sync scheduler and attaches
//! both to the session, so ending the session stops them.

mod actions;

pub use actions::{QuoteSlot, QuoteState, TransferGate, TransferPermit};

use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::adapters::{FileCredentialsProvider, ReqwestHttpClient, TungstenitePushTransport};
use crate::auth::{AuthState, CredentialStore, Session, SessionRegistry};
use crate::error::{AuthError, GenesisResult, ResultExt, SystemError};
use crate::gateway::{GenesisApi, RequestGateway};
use crate::models::{NewUser, UserProfile};
use crate::notifications::NotificationBus;
use crate::startup::{ClientConfig, SessionBootstrapper};
use crate::sync::{AccountSnapshot, AccountState, SyncScheduler};
use crate::traits::{CredentialsProvider, HttpClient, PushTransport};
use crate::websocket::{push_url, PushChannel, PushState};

/// Components that live exactly as long as one session.
struct SessionContext {
    epoch: u64,
    scheduler: Arc<SyncScheduler>,
    push: Arc<PushChannel>,
}

/// Client-side session and data-sync layer for the wallet dashboard.
pub struct GenesisClient {
    config: ClientConfig,
    credentials: Arc<CredentialStore>,
    sessions: Arc<SessionRegistry>,
    api: GenesisApi,
    bootstrapper: SessionBootstrapper,
    transport: Arc<dyn PushTransport>,
    notifications: Arc<NotificationBus>,
    account: Arc<AccountState>,
    context: Mutex<Option<SessionContext>>,
    transfers: TransferGate,
    quotes: QuoteSlot,
}

impl GenesisClient {
    /// Build a client on explicit adapters.
    pub fn new(
        http: Arc<dyn HttpClient>,
        provider: Arc<dyn CredentialsProvider>,
        transport: Arc<dyn PushTransport>,
        config: ClientConfig,
    ) -> Self {
        let credentials = Arc::new(CredentialStore::new(provider));
        let sessions = Arc::new(SessionRegistry::new());
        let gateway = Arc::new(RequestGateway::new(
            http,
            config.api_url.clone(),
            credentials.clone(),
            sessions.clone(),
        ));
        let api = GenesisApi::new(gateway, sessions.clone());
        let bootstrapper = SessionBootstrapper::new(api.clone(), credentials.clone(), sessions.clone());
        let notifications = Arc::new(NotificationBus::with_window(config.notification_window));

        Self {
            config,
            credentials,
            sessions,
            api,
            bootstrapper,
            transport,
            notifications,
            account: Arc::new(AccountState::new()),
            context: Mutex::new(None),
            transfers: TransferGate::new(),
            quotes: QuoteSlot::new(),
        }
    }

    /// Build a client on the production adapters.
    pub fn from_config(config: ClientConfig) -> GenesisResult<Self> {
        let provider = match &config.credentials_path {
            Some(path) => FileCredentialsProvider::with_path(path),
            None => FileCredentialsProvider::new().map_err(|_| SystemError::NoHomeDirectory)?,
        };
        debug!(path = %provider.credentials_path().display(), "Using credentials file");
        Ok(Self::new(
            Arc::new(ReqwestHttpClient::new()),
            Arc::new(provider),
            Arc::new(TungstenitePushTransport::new()),
            config,
        ))
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Restore the persisted session and, if there is one, start push and
    /// sync for it. Only the first call restores.
    pub async fn start(&self) -> AuthState {
        let state = self.bootstrapper.restore().await;
        if state == AuthState::Authenticated {
            if let Some(epoch) = self.sessions.active_epoch() {
                self.activate(epoch).await;
            }
        }
        state
    }

    /// Log in, replacing any active session.
    pub async fn login(&self, email: &str, password: &str) -> GenesisResult<UserProfile> {
        let epoch = self.bootstrapper.login(email, password).await?;
        self.activate(epoch).await;
        self.session()
            .filter(|_| self.sessions.is_current(epoch))
            .map(|session| session.user.clone())
            .ok_or_else(|| AuthError::NotAuthenticated.into())
    }

    pub async fn logout(&self) {
        self.bootstrapper.logout().await;
        self.clear_context();
        self.quotes.invalidate();
    }

    /// Create an account. Does not sign in.
    pub async fn signup(&self, user: &NewUser) -> GenesisResult<UserProfile> {
        self.api.create_user(user).await
    }

    pub async fn update_profile(&self, name: &str) -> GenesisResult<UserProfile> {
        self.api.update_profile(name).await
    }

    async fn activate(&self, epoch: u64) {
        if self.lock_context().as_ref().map_or(false, |ctx| ctx.epoch == epoch) {
            debug!(epoch, "Session already active");
            return;
        }
        let session = match self.sessions.current() {
            Some(session) if self.sessions.is_current(epoch) => session,
            _ => return,
        };

        let scheduler = Arc::new(SyncScheduler::new(
            self.api.clone(),
            self.account.clone(),
            self.sessions.clone(),
            epoch,
            self.config.sync_interval,
        ));
        let push = Arc::new(
            PushChannel::new(
                self.transport.clone(),
                push_url(&self.config.ws_url(), session.user_id(), &session.credential),
                self.notifications.clone(),
            )
            .with_connect_delay(self.config.connect_delay)
            .with_policy(self.config.reconnect.clone())
            .with_refresh(scheduler.trigger()),
        );

        // Torn down in this order when the session ends.
        if !self.sessions.attach(epoch, push.clone())
            || !self.sessions.attach(epoch, scheduler.clone())
            || !self.sessions.attach(epoch, self.account.clone())
        {
            debug!(epoch, "Session ended before activation");
            return;
        }

        *self.lock_context() = Some(SessionContext {
            epoch,
            scheduler: scheduler.clone(),
            push: push.clone(),
        });
        info!(user_id = %session.user_id(), epoch, "Activating session");

        push.start();
        let _ = scheduler.load_wallets().await.log_warn("load wallets");
        let _ = scheduler.load_fx_rates().await.log_warn("load fx rates");
    }

    fn lock_context(&self) -> std::sync::MutexGuard<'_, Option<SessionContext>> {
        self.context
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn clear_context(&self) {
        self.lock_context().take();
    }

    /// Scheduler of the active session, if activation got that far.
    fn scheduler(&self) -> Option<Arc<SyncScheduler>> {
        let context = self.lock_context();
        context
            .as_ref()
            .filter(|ctx| self.sessions.is_current(ctx.epoch))
            .map(|ctx| ctx.scheduler.clone())
    }

    fn push(&self) -> Option<Arc<PushChannel>> {
        let context = self.lock_context();
        context
            .as_ref()
            .filter(|ctx| self.sessions.is_current(ctx.epoch))
            .map(|ctx| ctx.push.clone())
    }

    // ========================================================================
    // Data
    // ========================================================================

    /// Fetch balance and transactions now.
    pub async fn refresh(&self) -> GenesisResult<()> {
        match self.scheduler() {
            Some(scheduler) => scheduler.refresh_now().await,
            None => Err(AuthError::NotAuthenticated.into()),
        }
    }

    /// Reload the wallet list.
    pub async fn reload_wallets(&self) -> GenesisResult<Option<String>> {
        match self.scheduler() {
            Some(scheduler) => scheduler.load_wallets().await,
            None => Err(AuthError::NotAuthenticated.into()),
        }
    }

    /// Switch the active wallet, or clear the wallet context with `None`.
    pub fn select_wallet(&self, wallet_id: Option<&str>) -> bool {
        if !self.account.select_wallet(wallet_id) {
            return false;
        }
        self.quotes.invalidate();
        if let Some(scheduler) = self.scheduler() {
            scheduler.set_wallet(wallet_id.map(str::to_string));
        }
        true
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api(&self) -> &GenesisApi {
        &self.api
    }

    pub fn session(&self) -> Option<Arc<Session>> {
        self.sessions.current()
    }

    pub fn auth_state(&self) -> AuthState {
        self.sessions.state()
    }

    pub fn subscribe_auth(&self) -> watch::Receiver<AuthState> {
        self.sessions.subscribe()
    }

    pub fn account(&self) -> AccountSnapshot {
        self.account.snapshot()
    }

    pub fn subscribe_account(&self) -> watch::Receiver<AccountSnapshot> {
        self.account.subscribe()
    }

    pub fn notifications(&self) -> &Arc<NotificationBus> {
        &self.notifications
    }

    /// Push state of the active session; `Closed` when there is none.
    pub fn push_state(&self) -> PushState {
        self.push().map_or(PushState::Closed, |push| push.state())
    }

    pub fn subscribe_push(&self) -> Option<watch::Receiver<PushState>> {
        self.push().map(|push| push.subscribe())
    }

    pub fn is_syncing(&self) -> bool {
        self.scheduler().map_or(false, |s| s.is_running())
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }
}

impl Drop for GenesisClient {
    fn drop(&mut self) {
        if let Some(context) = self.lock_context().take() {
            context.push.close();
            context.scheduler.stop();
        }
    }
}
