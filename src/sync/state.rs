//! Shared account state.
//!
//! Every update replaces a whole collection inside one [`AccountSnapshot`]
//! and publishes the new snapshot on a `watch` channel. Writers never merge
//! into the existing collections.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::watch;

use crate::auth::SessionBound;
use crate::models::{FxRates, TransactionRecord, WalletSnapshot};

/// Everything the dashboard shows about the signed-in account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountSnapshot {
    pub wallets: Vec<WalletSnapshot>,
    /// Id of the wallet the dashboard is working on.
    pub active_wallet: Option<String>,
    /// Transactions of the active wallet.
    pub transactions: Vec<TransactionRecord>,
    pub fx_rates: Option<FxRates>,
    pub last_synced: Option<DateTime<Utc>>,
}

impl AccountSnapshot {
    pub fn active(&self) -> Option<&WalletSnapshot> {
        let id = self.active_wallet.as_deref()?;
        self.wallets.iter().find(|w| w.wallet_id == id)
    }

    pub fn balance(&self) -> Option<Decimal> {
        self.active().map(|w| w.balance)
    }

    /// Sum of transactions sent from the active wallet.
    pub fn total_sent(&self) -> Decimal {
        match self.active_wallet.as_deref() {
            Some(id) => self
                .transactions
                .iter()
                .filter(|t| t.is_outgoing_from(id))
                .map(|t| t.amount)
                .sum(),
            None => Decimal::ZERO,
        }
    }

    /// Sum of transactions received by the active wallet.
    pub fn total_received(&self) -> Decimal {
        match self.active_wallet.as_deref() {
            Some(id) => self
                .transactions
                .iter()
                .filter(|t| t.is_incoming_to(id))
                .map(|t| t.amount)
                .sum(),
            None => Decimal::ZERO,
        }
    }
}

/// Watch-backed holder of the current [`AccountSnapshot`].
#[derive(Debug)]
pub struct AccountState {
    tx: watch::Sender<AccountSnapshot>,
}

impl AccountState {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AccountSnapshot::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AccountSnapshot> {
        self.tx.subscribe()
    }

    pub fn active_wallet(&self) -> Option<WalletSnapshot> {
        self.tx.borrow().active().cloned()
    }

    /// Replace the wallet list. The active wallet is kept if it is still
    /// listed, otherwise the first wallet becomes active.
    pub fn replace_wallets(&self, wallets: Vec<WalletSnapshot>) -> Option<String> {
        let mut active = None;
        self.tx.send_modify(|snapshot| {
            let keep = snapshot
                .active_wallet
                .as_ref()
                .filter(|id| wallets.iter().any(|w| &w.wallet_id == *id))
                .cloned();
            let next = keep.or_else(|| wallets.first().map(|w| w.wallet_id.clone()));
            if next != snapshot.active_wallet {
                snapshot.transactions = Vec::new();
            }
            snapshot.active_wallet = next.clone();
            snapshot.wallets = wallets;
            active = next;
        });
        active
    }

    /// Replace one wallet's snapshot. Unknown wallets are ignored.
    pub fn replace_wallet(&self, wallet: WalletSnapshot) -> bool {
        self.tx.send_if_modified(|snapshot| {
            match snapshot
                .wallets
                .iter_mut()
                .find(|w| w.wallet_id == wallet.wallet_id)
            {
                Some(slot) if *slot != wallet => {
                    *slot = wallet;
                    true
                }
                _ => false,
            }
        })
    }

    /// Replace the balance of `wallet_id` with a freshly fetched value.
    /// Lookup and write happen under the channel's lock.
    pub fn replace_balance(&self, wallet_id: &str, balance: Decimal) -> bool {
        self.tx.send_if_modified(|snapshot| {
            match snapshot.wallets.iter_mut().find(|w| w.wallet_id == wallet_id) {
                Some(slot) if slot.balance != balance => {
                    *slot = slot.with_balance(balance);
                    true
                }
                _ => false,
            }
        })
    }

    /// Replace the transaction set of the active wallet. Results for any
    /// other wallet are dropped.
    pub fn replace_transactions(&self, wallet_id: &str, transactions: Vec<TransactionRecord>) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.active_wallet.as_deref() != Some(wallet_id) {
                return false;
            }
            snapshot.transactions = transactions;
            snapshot.last_synced = Some(Utc::now());
            true
        })
    }

    /// Make `wallet_id` the active wallet, or clear the wallet context.
    ///
    /// Returns false if the wallet is not in the list.
    pub fn select_wallet(&self, wallet_id: Option<&str>) -> bool {
        let mut known = true;
        self.tx.send_if_modified(|snapshot| {
            if let Some(id) = wallet_id {
                if !snapshot.wallets.iter().any(|w| w.wallet_id == id) {
                    known = false;
                    return false;
                }
            }
            if snapshot.active_wallet.as_deref() == wallet_id {
                return false;
            }
            snapshot.active_wallet = wallet_id.map(str::to_string);
            snapshot.transactions = Vec::new();
            true
        });
        known
    }

    pub fn set_fx_rates(&self, rates: FxRates) {
        self.tx.send_modify(|snapshot| snapshot.fx_rates = Some(rates));
    }

    /// Drop everything; used when the session ends.
    pub fn clear(&self) {
        self.tx.send_replace(AccountSnapshot::default());
    }
}

impl SessionBound for AccountState {
    fn teardown(&self) {
        self.clear();
    }
}

impl Default for AccountState {
    fn default() -> Self {
        Self::new()
    }
}
