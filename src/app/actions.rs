//! Money-moving actions of the client.
//!
//! - Transfers, one at a time, with a notification either way
//! - Conversion quotes, where a newer request supersedes an older one

use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{ApiError, AuthError, GenesisError, GenesisResult};
use crate::models::{
    ConversionQuote, ConversionRecord, ConvertRequest, Currency, TransferReceipt,
    TransferRecipient, TransferRequest,
};
use crate::notifications::NotificationEvent;

use super::GenesisClient;

/// Allows a single transfer in flight.
#[derive(Debug, Default)]
pub struct TransferGate {
    busy: AtomicBool,
}

/// Held while a transfer is in flight; releases the gate on drop.
#[derive(Debug)]
pub struct TransferPermit<'a> {
    gate: &'a TransferGate,
}

impl TransferGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<TransferPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TransferPermit { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for TransferPermit<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

/// State of the conversion quote shown to the user.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QuoteState {
    #[default]
    Idle,
    Pending { seq: u64 },
    Ready { seq: u64, quote: ConversionQuote },
    Failed { seq: u64, message: String },
}

/// Tracks the latest quote request. Results for any older request are
/// dropped.
#[derive(Debug)]
pub struct QuoteSlot {
    seq: AtomicU64,
    state: watch::Sender<QuoteState>,
}

impl QuoteSlot {
    pub fn new() -> Self {
        let (state, _) = watch::channel(QuoteState::Idle);
        Self {
            seq: AtomicU64::new(0),
            state,
        }
    }

    /// Start a new request, superseding any outstanding one.
    pub fn begin(&self) -> u64 {
        let seq = self.seq.fetch_add(1, Ordering::AcqRel) + 1;
        self.state.send_replace(QuoteState::Pending { seq });
        seq
    }

    /// Drop the current quote and anything still in flight.
    pub fn invalidate(&self) {
        self.seq.fetch_add(1, Ordering::AcqRel);
        self.state.send_replace(QuoteState::Idle);
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        self.seq.load(Ordering::Acquire) == seq
    }

    /// Record a result for `seq`. Returns false, leaving the state alone,
    /// if `seq` was superseded.
    pub fn resolve(&self, seq: u64, result: Result<ConversionQuote, String>) -> bool {
        self.state.send_if_modified(|state| {
            if !self.is_latest(seq) {
                return false;
            }
            *state = match result {
                Ok(quote) => QuoteState::Ready { seq, quote },
                Err(message) => QuoteState::Failed { seq, message },
            };
            true
        })
    }

    pub fn current(&self) -> QuoteState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QuoteState> {
        self.state.subscribe()
    }
}

impl Default for QuoteSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl GenesisClient {
    // ========================================================================
    // Transfer
    // ========================================================================

    /// Send `amount` from the active wallet to `recipient`.
    ///
    /// Success publishes `Sent! Ref: ···<ref>` and refreshes balance and
    /// transactions before returning. Failure publishes the error text and
    /// changes nothing. A second call before the first has returned,
    /// including its refresh, fails with [`ApiError::TransferInFlight`]
    /// without reaching the network.
    pub async fn transfer(
        &self,
        recipient: TransferRecipient,
        amount: Decimal,
    ) -> GenesisResult<TransferReceipt> {
        let permit = match self.transfers.try_acquire() {
            Some(permit) => permit,
            None => {
                debug!("Transfer rejected, another one is in flight");
                return Err(ApiError::TransferInFlight.into());
            }
        };

        let result = self.submit_transfer(recipient, amount).await;

        // The gate stays closed until the follow-up refresh has landed.
        match &result {
            Ok(receipt) => {
                info!(reference = %receipt.short_reference(), "Transfer accepted");
                self.notifications.publish(NotificationEvent::success(format!(
                    "Sent! Ref: ···{}",
                    receipt.short_reference()
                )));
                if let Err(e) = self.refresh().await {
                    warn!("Refresh after transfer failed: {}", e);
                }
            }
            Err(e) => {
                warn!(code = e.error_code(), "Transfer failed: {}", e);
                self.notifications
                    .publish(NotificationEvent::error(e.user_message()));
            }
        }
        drop(permit);
        result
    }

    async fn submit_transfer(
        &self,
        recipient: TransferRecipient,
        amount: Decimal,
    ) -> GenesisResult<TransferReceipt> {
        if amount <= Decimal::ZERO {
            return Err(ApiError::Validation {
                field: "amount".to_string(),
                message: "Amount must be greater than zero".to_string(),
            }
            .into());
        }
        let recipient = match recipient {
            TransferRecipient::Phone(p) => TransferRecipient::Phone(p.trim().to_string()),
            TransferRecipient::Wallet(w) => TransferRecipient::Wallet(w.trim().to_string()),
        };
        if recipient.identifier().is_empty() {
            return Err(ApiError::Validation {
                field: "recipient".to_string(),
                message: "Enter a phone number or wallet id".to_string(),
            }
            .into());
        }
        let from_wallet_id = self.require_wallet()?;

        self.api
            .transfer(&TransferRequest {
                from_wallet_id,
                amount,
                recipient,
            })
            .await
    }

    pub fn transfer_in_flight(&self) -> bool {
        self.transfers.is_busy()
    }

    // ========================================================================
    // Convert
    // ========================================================================

    /// Request a conversion quote for the active wallet.
    ///
    /// Returns `Ok(None)` if a newer request or an invalidation superseded
    /// this one before the answer arrived. Quotes never change balances.
    pub async fn quote(
        &self,
        to_currency: Currency,
        amount: Decimal,
    ) -> GenesisResult<Option<ConversionQuote>> {
        if amount <= Decimal::ZERO {
            self.quotes.invalidate();
            return Err(ApiError::Validation {
                field: "amount".to_string(),
                message: "Amount must be greater than zero".to_string(),
            }
            .into());
        }
        let wallet_id = match self.require_wallet() {
            Ok(id) => id,
            Err(e) => {
                self.quotes.invalidate();
                return Err(e);
            }
        };

        let seq = self.quotes.begin();
        let result = self
            .api
            .convert(&ConvertRequest {
                wallet_id,
                to_currency,
                amount,
            })
            .await;

        match result {
            Ok(quote) => {
                if self.quotes.resolve(seq, Ok(quote.clone())) {
                    Ok(Some(quote))
                } else {
                    debug!(seq, "Discarding superseded quote");
                    Ok(None)
                }
            }
            Err(e) => {
                if self.quotes.resolve(seq, Err(e.user_message())) {
                    Err(e)
                } else {
                    debug!(seq, "Discarding error for superseded quote");
                    Ok(None)
                }
            }
        }
    }

    /// Forget the current quote, e.g. after the amount or target changed.
    pub fn invalidate_quote(&self) {
        self.quotes.invalidate();
    }

    pub fn quote_state(&self) -> QuoteState {
        self.quotes.current()
    }

    pub fn subscribe_quote(&self) -> watch::Receiver<QuoteState> {
        self.quotes.subscribe()
    }

    /// Conversion history of the active wallet.
    pub async fn conversions(&self) -> GenesisResult<Vec<ConversionRecord>> {
        let wallet_id = self.require_wallet()?;
        self.api.conversions(&wallet_id).await
    }

    fn require_wallet(&self) -> GenesisResult<String> {
        if self.sessions.current().is_none() {
            return Err(AuthError::NotAuthenticated.into());
        }
        self.account
            .snapshot()
            .active_wallet
            .ok_or_else(|| -> GenesisError {
                ApiError::Validation {
                    field: "wallet".to_string(),
                    message: "No wallet selected".to_string(),
                }
                .into()
            })
    }
}
