use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{deserialize_id, Currency};

/// Inbound push events, discriminated by the `event` field.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PushEvent {
    /// Money arrived in one of the user's wallets.
    #[serde(rename = "transfer_received")]
    TransferReceived(TransferReceived),
    /// Any event kind this client does not handle.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TransferReceived {
    pub amount: Decimal,
    /// Currency code or numeric id, as the server sends it.
    #[serde(default, deserialize_with = "deserialize_id")]
    pub currency: String,
}

impl TransferReceived {
    /// Currency code for display; unknown values are shown verbatim.
    pub fn currency_code(&self) -> String {
        match self.currency.parse::<Currency>() {
            Ok(Currency::Unspecified) | Err(_) => self.currency.clone(),
            Ok(currency) => currency.code().to_string(),
        }
    }

    pub fn notification_text(&self) -> String {
        format!("Received {} {}", self.amount, self.currency_code())
            .trim_end()
            .to_string()
    }
}

impl PushEvent {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
