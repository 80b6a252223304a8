use serde::{Deserialize, Serialize};

use super::{deserialize_id, deserialize_nullable_string, deserialize_optional_id};
use crate::auth::Credential;

/// The signed-in user's profile as returned by `/api/me` and `/api/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub email: String,
    /// Missing or null means not an admin.
    #[serde(default, deserialize_with = "deserialize_admin_flag")]
    pub is_admin: bool,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Region name or numeric id, whichever the backend sends.
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub kyc_status: Option<String>,
}

impl UserProfile {
    /// A profile only counts as a valid identity if it carries a user id.
    pub fn has_identity(&self) -> bool {
        !self.user_id.trim().is_empty()
    }
}

fn deserialize_admin_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(false))
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub token: Credential,
}

/// Body for `POST /api/users`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
    pub phone_number: String,
    /// Backend region id: 1 India, 2 EU, 3 US.
    pub region: u8,
}

/// Body for `PATCH /api/me`.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
}
