pub mod admin;
pub mod conversion;
pub mod transaction;
pub mod transfer;
pub mod user;
pub mod wallet;

pub use admin::{AdminStats, AdminTransactions, AdminUser, AdminUsers, ADMIN_LIST_LIMIT};
pub use conversion::{ConversionQuote, ConversionRecord, ConvertRequest, FxRates};
pub use transaction::{TransactionRecord, TransactionStatus};
pub use transfer::{TransferReceipt, TransferRecipient, TransferRequest};
pub use user::{LoginRequest, LoginResponse, NewUser, ProfileUpdate, UserProfile};
pub use wallet::{Currency, WalletSnapshot};

use serde::{Deserialize, Deserializer};

/// Helper to deserialize an id as either string or integer
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer")
        }

        fn visit_str<E>(self, value: &str) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// Like [`deserialize_id`] but tolerates a missing or null value.
pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "deserialize_id")] String);

    Option::<Wrapped>::deserialize(deserializer).map(|opt| opt.map(|Wrapped(s)| s))
}

/// Helper to deserialize nullable strings as empty string
pub(crate) fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}
