use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::deserialize_optional_id;

/// Who receives a transfer. A request names exactly one.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum TransferRecipient {
    #[serde(rename = "to_phone_number")]
    Phone(String),
    #[serde(rename = "to_wallet_id")]
    Wallet(String),
}

impl TransferRecipient {
    pub fn identifier(&self) -> &str {
        match self {
            TransferRecipient::Phone(s) | TransferRecipient::Wallet(s) => s,
        }
    }
}

/// Body for `POST /api/transfer`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransferRequest {
    pub from_wallet_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(flatten)]
    pub recipient: TransferRecipient,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TransferReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl TransferReceipt {
    /// Last eight characters of the transaction id, as shown to the user.
    pub fn short_reference(&self) -> String {
        let id = self.transaction_id.as_deref().unwrap_or_default();
        let chars: Vec<char> = id.chars().collect();
        let start = chars.len().saturating_sub(8);
        chars[start..].iter().collect()
    }
}
