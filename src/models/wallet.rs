use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::deserialize_id;

/// Wallet currency.
///
/// The backend stores currencies as a numeric enum and sends either the
/// number or the code string depending on the endpoint. Requests always
/// carry the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Currency {
    #[default]
    Unspecified,
    Usd,
    Inr,
    Eur,
}

impl Currency {
    pub fn id(&self) -> u8 {
        match self {
            Currency::Unspecified => 0,
            Currency::Usd => 1,
            Currency::Inr => 2,
            Currency::Eur => 3,
        }
    }

    pub fn from_id(id: u64) -> Option<Self> {
        match id {
            0 => Some(Currency::Unspecified),
            1 => Some(Currency::Usd),
            2 => Some(Currency::Inr),
            3 => Some(Currency::Eur),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Unspecified => "UNSPECIFIED",
            Currency::Usd => "USD",
            Currency::Inr => "INR",
            Currency::Eur => "EUR",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Unspecified => "",
            Currency::Usd => "$",
            Currency::Inr => "₹",
            Currency::Eur => "€",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "INR" => Ok(Currency::Inr),
            "EUR" => Ok(Currency::Eur),
            "UNSPECIFIED" | "" => Ok(Currency::Unspecified),
            other => match other.parse::<u64>().ok().and_then(Currency::from_id) {
                Some(c) => Ok(c),
                None => Err(format!("unknown currency '{}'", s)),
            },
        }
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.id())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = deserialize_id(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A wallet's identity, currency and balance.
///
/// Always replaced as a whole; a balance-only fetch builds a new snapshot
/// from the previous one via [`with_balance`](Self::with_balance).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalletSnapshot {
    #[serde(deserialize_with = "deserialize_id")]
    pub wallet_id: String,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub balance: Decimal,
}

impl WalletSnapshot {
    pub fn with_balance(&self, balance: Decimal) -> Self {
        Self {
            wallet_id: self.wallet_id.clone(),
            currency: self.currency,
            balance,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WalletList {
    #[serde(default)]
    pub wallets: Vec<WalletSnapshot>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BalanceResponse {
    pub balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_accepts_number_or_code() {
        let from_num: Currency = serde_json::from_str("2").unwrap();
        let from_code: Currency = serde_json::from_str(r#""inr""#).unwrap();
        assert_eq!(from_num, Currency::Inr);
        assert_eq!(from_code, Currency::Inr);
    }

    #[test]
    fn test_currency_serializes_as_id() {
        assert_eq!(serde_json::to_string(&Currency::Eur).unwrap(), "3");
    }

    #[test]
    fn test_unknown_currency_rejected() {
        assert!(serde_json::from_str::<Currency>(r#""GBP""#).is_err());
        assert!(serde_json::from_str::<Currency>("9").is_err());
    }

    #[test]
    fn test_wallet_snapshot_from_float_balance() {
        let wallet: WalletSnapshot =
            serde_json::from_str(r#"{"wallet_id": "w-1", "currency": "USD", "balance": 100.0}"#)
                .unwrap();
        assert_eq!(wallet.balance, dec!(100));
        assert_eq!(wallet.currency, Currency::Usd);
    }

    #[test]
    fn test_with_balance_keeps_identity() {
        let wallet = WalletSnapshot {
            wallet_id: "w-1".to_string(),
            currency: Currency::Usd,
            balance: dec!(100),
        };
        let updated = wallet.with_balance(dec!(75));
        assert_eq!(updated.wallet_id, "w-1");
        assert_eq!(updated.currency, Currency::Usd);
        assert_eq!(updated.balance, dec!(75));
    }
}
