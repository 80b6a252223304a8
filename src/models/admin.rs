use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{deserialize_id, deserialize_nullable_string, deserialize_optional_id, TransactionRecord};

/// Default page size for admin listings.
pub const ADMIN_LIST_LIMIT: u32 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_wallets: u64,
    #[serde(default)]
    pub total_transactions: u64,
    #[serde(default)]
    pub completed_transactions: u64,
    #[serde(default)]
    pub pending_transactions: u64,
    #[serde(default)]
    pub total_volume_usd: Decimal,
}

impl AdminStats {
    /// Completed share of all transactions as a whole percentage.
    pub fn success_rate(&self) -> Option<u64> {
        if self.total_transactions == 0 {
            return None;
        }
        Some((self.completed_transactions * 100 + self.total_transactions / 2) / self.total_transactions)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminUser {
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub kyc_status: Option<String>,
    #[serde(default)]
    pub wallet_count: u32,
    #[serde(default)]
    pub total_balance_usd: Decimal,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUsers {
    #[serde(default)]
    pub users: Vec<AdminUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminTransactions {
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let stats = AdminStats {
            total_transactions: 3,
            completed_transactions: 2,
            ..Default::default()
        };
        assert_eq!(stats.success_rate(), Some(67));
        assert_eq!(AdminStats::default().success_rate(), None);
    }

    #[test]
    fn test_admin_users_missing_list() {
        let users: AdminUsers = serde_json::from_str("{}").unwrap();
        assert!(users.users.is_empty());
    }
}
