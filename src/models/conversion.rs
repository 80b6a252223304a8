use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{deserialize_id, deserialize_optional_id, Currency};

/// Body for `POST /api/convert`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConvertRequest {
    pub wallet_id: String,
    pub to_currency: Currency,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// A conversion quote. Never merged into account state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversionQuote {
    pub amount_original: Decimal,
    pub amount_converted: Decimal,
    pub rate: Decimal,
    pub from_currency: Currency,
    pub to_currency: Currency,
}

/// A completed conversion from the wallet's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversionRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub transaction_id: Option<String>,
    pub from_currency: Currency,
    pub to_currency: Currency,
    pub rate: Decimal,
    #[serde(default)]
    pub timestamp: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConversionList {
    #[serde(default)]
    pub records: Vec<ConversionRecord>,
}

/// Exchange rate table keyed `from -> to -> rate` by currency code.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FxRates {
    #[serde(default)]
    pub rates: HashMap<String, HashMap<String, Decimal>>,
}

impl FxRates {
    pub fn rate(&self, from: Currency, to: Currency) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        self.rates.get(from.code())?.get(to.code()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
