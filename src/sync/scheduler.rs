//! Periodic wallet synchronization.
//!
//! One scheduler exists per session. While a wallet context is set it runs a
//! single loop that refetches the active wallet's transactions and balance on
//! a fixed interval, or sooner when nudged through a [`RefreshTrigger`].

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::state::AccountState;
use crate::auth::{SessionBound, SessionRegistry};
use crate::error::GenesisResult;
use crate::gateway::GenesisApi;

/// Default time between two sync ticks.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(10);

/// Handle that asks a running sync loop for an immediate pass.
///
/// Firing while no loop is running is a no-op apart from one stored permit,
/// which the next loop consumes on its first wait.
#[derive(Debug, Clone, Default)]
pub struct RefreshTrigger {
    notify: Arc<Notify>,
}

impl RefreshTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        self.notify.notify_one();
    }

    /// Wait until the trigger fires.
    pub async fn wait(&self) {
        self.notify.notified().await;
    }
}

struct SyncContext {
    api: GenesisApi,
    state: Arc<AccountState>,
    sessions: Arc<SessionRegistry>,
    epoch: u64,
}

impl SyncContext {
    fn is_live(&self) -> bool {
        self.sessions.is_current(self.epoch)
    }

    /// Fetch transactions and balance for `wallet_id` and replace both.
    async fn sync_wallet(&self, wallet_id: &str) -> GenesisResult<()> {
        let (transactions, balance) = tokio::join!(
            self.api.transactions(wallet_id),
            self.api.balance(wallet_id)
        );
        if !self.is_live() {
            debug!(epoch = self.epoch, "Discarding sync results for ended session");
            return transactions.and(balance).map(|_| ());
        }
        // Apply whichever half succeeded before reporting a failure.
        let transactions = transactions.map(|list| {
            self.state.replace_transactions(wallet_id, list);
        });
        let balance = balance.map(|balance| {
            self.state.replace_balance(wallet_id, balance);
        });
        transactions.and(balance)
    }
}

/// Drives the transaction-sync loop and balance refreshes for one session.
pub struct SyncScheduler {
    ctx: Arc<SyncContext>,
    period: Duration,
    trigger: RefreshTrigger,
    wallet: Mutex<Option<String>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncScheduler {
    pub fn new(
        api: GenesisApi,
        state: Arc<AccountState>,
        sessions: Arc<SessionRegistry>,
        epoch: u64,
        period: Duration,
    ) -> Self {
        Self {
            ctx: Arc::new(SyncContext {
                api,
                state,
                sessions,
                epoch,
            }),
            period,
            trigger: RefreshTrigger::new(),
            wallet: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.ctx.epoch
    }

    pub fn trigger(&self) -> RefreshTrigger {
        self.trigger.clone()
    }

    pub fn wallet(&self) -> Option<String> {
        self.wallet
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    /// Fetch the wallet list and start syncing the active wallet.
    ///
    /// Returns the id of the active wallet, or `None` if the account has no
    /// wallets or the session ended while the request was in flight.
    pub async fn load_wallets(&self) -> GenesisResult<Option<String>> {
        let wallets = self.ctx.api.wallets().await?;
        if !self.ctx.is_live() {
            return Ok(None);
        }
        info!(count = wallets.len(), "Loaded wallets");
        let active = self.ctx.state.replace_wallets(wallets);
        self.set_wallet(active.clone());
        Ok(active)
    }

    /// Fetch the FX rate table into the account state.
    pub async fn load_fx_rates(&self) -> GenesisResult<()> {
        let rates = self.ctx.api.fx_rates().await?;
        if self.ctx.is_live() {
            self.ctx.state.set_fx_rates(rates);
        }
        Ok(())
    }

    /// Switch the wallet context. `None` stops the loop.
    pub fn set_wallet(&self, wallet_id: Option<String>) {
        let changed = {
            let mut wallet = self
                .wallet
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let changed = *wallet != wallet_id;
            *wallet = wallet_id.clone();
            changed
        };
        match wallet_id {
            Some(id) if changed || !self.is_running() => self.start(id),
            Some(_) => {}
            None => self.stop(),
        }
    }

    fn start(&self, wallet_id: String) {
        if !self.ctx.is_live() {
            debug!("Not starting sync for an ended session");
            return;
        }
        let mut task = self
            .task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = task.take() {
            previous.abort();
        }

        info!(wallet_id = %wallet_id, period_secs = self.period.as_secs(), "Starting sync loop");
        let ctx = self.ctx.clone();
        let trigger = self.trigger.clone();
        let period = self.period;
        *task = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = trigger.wait() => debug!("Sync nudged"),
                }
                if !ctx.is_live() {
                    break;
                }
                if let Err(e) = ctx.sync_wallet(&wallet_id).await {
                    warn!(wallet_id = %wallet_id, code = e.error_code(), "Sync failed: {}", e);
                }
            }
            debug!("Sync loop exited");
        }));
    }

    /// Cancel the loop. Safe to call repeatedly.
    pub fn stop(&self) {
        if let Some(handle) = self
            .task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
        {
            info!("Stopping sync loop");
            handle.abort();
        }
    }

    /// Fetch balance and transactions now, outside the loop's schedule.
    pub async fn refresh_now(&self) -> GenesisResult<()> {
        match self.wallet() {
            Some(wallet_id) => self.ctx.sync_wallet(&wallet_id).await,
            None => Ok(()),
        }
    }
}

impl SessionBound for SyncScheduler {
    fn teardown(&self) {
        self.stop();
        self.wallet
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
