use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{deserialize_id, deserialize_optional_id};

/// Server-reported transaction status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Success,
    Failed,
    /// Anything the client does not recognize, kept verbatim.
    #[serde(untagged)]
    Other(String),
}

impl TransactionStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Success)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => f.write_str("PENDING"),
            TransactionStatus::Completed => f.write_str("COMPLETED"),
            TransactionStatus::Success => f.write_str("SUCCESS"),
            TransactionStatus::Failed => f.write_str("FAILED"),
            TransactionStatus::Other(s) => f.write_str(s),
        }
    }
}

/// One entry of a wallet's transaction history. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub from_wallet_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub to_wallet_id: Option<String>,
    pub amount: Decimal,
    pub status: TransactionStatus,
    /// Unix seconds, fractional.
    #[serde(default)]
    pub timestamp: f64,
}

impl TransactionRecord {
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.timestamp.trunc() as i64;
        let nanos = (self.timestamp.fract() * 1e9) as u32;
        Utc.timestamp_opt(secs, nanos).single()
    }

    pub fn is_outgoing_from(&self, wallet_id: &str) -> bool {
        self.from_wallet_id.as_deref() == Some(wallet_id)
    }

    pub fn is_incoming_to(&self, wallet_id: &str) -> bool {
        self.to_wallet_id.as_deref() == Some(wallet_id)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionList {
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}
