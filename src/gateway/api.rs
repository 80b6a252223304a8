//! Typed Genesis API calls on top of [`RequestGateway`].

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use super::RequestGateway;
use crate::auth::{Credential, SessionRegistry};
use crate::error::{
    extract_detail, ApiError, AuthError, GenesisError, GenesisResult, NetworkError,
    DEFAULT_CONVERT_FAILURE, DEFAULT_TRANSFER_FAILURE,
};
use crate::models::conversion::ConversionList;
use crate::models::transaction::TransactionList;
use crate::models::wallet::{BalanceResponse, WalletList};
use crate::models::{
    AdminStats, AdminTransactions, AdminUsers, ConversionQuote, ConversionRecord, ConvertRequest,
    FxRates, LoginRequest, LoginResponse, NewUser, ProfileUpdate, TransactionRecord,
    TransferReceipt, TransferRequest, UserProfile, WalletSnapshot,
};
use crate::traits::{Request, Response};

/// Typed client for the Genesis REST API.
#[derive(Clone)]
pub struct GenesisApi {
    gateway: Arc<RequestGateway>,
    sessions: Arc<SessionRegistry>,
}

impl GenesisApi {
    pub fn new(gateway: Arc<RequestGateway>, sessions: Arc<SessionRegistry>) -> Self {
        Self { gateway, sessions }
    }

    pub fn gateway(&self) -> &Arc<RequestGateway> {
        &self.gateway
    }

    // ========================================================================
    // Account
    // ========================================================================

    /// `POST /api/login`.
    pub async fn login(&self, email: &str, password: &str) -> GenesisResult<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .gateway
            .send_anonymous(Request::post_json("/api/login", &body)?)
            .await?;
        if !response.is_success() {
            if (400..500).contains(&response.status) {
                return Err(AuthError::InvalidCredentials {
                    message: extract_detail(&response.body).unwrap_or_default(),
                }
                .into());
            }
            return Err(error_for_status(&response, "Login failed"));
        }
        let login: LoginResponse = decode(&response)?;
        if !login.user.has_identity() || login.token.is_empty() {
            return Err(GenesisError::invalid_response("login response without identity"));
        }
        Ok(login)
    }

    /// `GET /api/me` with the session credential.
    pub async fn me(&self) -> GenesisResult<UserProfile> {
        self.get_json("/api/me", "Profile fetch failed").await
    }

    /// `GET /api/me` with an explicit credential, used to validate a
    /// persisted credential before any session exists.
    pub async fn me_with(&self, credential: &Credential) -> GenesisResult<UserProfile> {
        let request = Request::get("/api/me").with_header("Authorization", credential.bearer());
        let response = self.gateway.send(request).await?;
        if !response.is_success() {
            return Err(error_for_status(&response, "Profile fetch failed"));
        }
        decode(&response)
    }

    /// `PATCH /api/me`. The active session's profile is replaced with the
    /// server's answer.
    pub async fn update_profile(&self, name: &str) -> GenesisResult<UserProfile> {
        let epoch = self
            .sessions
            .active_epoch()
            .ok_or(AuthError::NotAuthenticated)?;
        let body = ProfileUpdate {
            name: name.to_string(),
        };
        let response = self
            .gateway
            .send(Request::patch_json("/api/me", &body)?)
            .await?;
        if !response.is_success() {
            return Err(error_for_status(&response, "Profile update failed"));
        }
        let profile: UserProfile = decode(&response)?;
        self.sessions.update_user(epoch, profile.clone());
        Ok(profile)
    }

    /// `POST /api/users`. Sent without the session credential.
    pub async fn create_user(&self, user: &NewUser) -> GenesisResult<UserProfile> {
        let response = self
            .gateway
            .send_anonymous(Request::post_json("/api/users", user)?)
            .await?;
        if !response.is_success() {
            return Err(error_for_status(&response, "Signup failed"));
        }
        decode(&response)
    }

    // ========================================================================
    // Wallets
    // ========================================================================

    pub async fn wallets(&self) -> GenesisResult<Vec<WalletSnapshot>> {
        let list: WalletList = self.get_json("/api/wallets", "Wallet fetch failed").await?;
        Ok(list.wallets)
    }

    pub async fn balance(&self, wallet_id: &str) -> GenesisResult<Decimal> {
        let path = format!("/api/wallets/{}/balance", urlencoding::encode(wallet_id));
        let balance: BalanceResponse = self.get_json(&path, "Balance fetch failed").await?;
        Ok(balance.balance)
    }

    pub async fn transactions(&self, wallet_id: &str) -> GenesisResult<Vec<TransactionRecord>> {
        let path = format!("/api/wallets/{}/transactions", urlencoding::encode(wallet_id));
        let list: TransactionList = self.get_json(&path, "Transaction fetch failed").await?;
        Ok(list.transactions)
    }

    pub async fn conversions(&self, wallet_id: &str) -> GenesisResult<Vec<ConversionRecord>> {
        let path = format!("/api/wallets/{}/conversions", urlencoding::encode(wallet_id));
        let list: ConversionList = self.get_json(&path, "Conversion history fetch failed").await?;
        Ok(list.records)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// `POST /api/transfer`.
    ///
    /// A non-2xx status or a body with `success: false` is a rejection
    /// carrying the server's `detail`, or "Transfer failed".
    pub async fn transfer(&self, transfer: &TransferRequest) -> GenesisResult<TransferReceipt> {
        let response = self
            .gateway
            .send(Request::post_json("/api/transfer", transfer)?)
            .await?;
        if !response.is_success() {
            return Err(error_for_status(&response, DEFAULT_TRANSFER_FAILURE));
        }
        let receipt: TransferReceipt = decode(&response)?;
        if !receipt.success {
            return Err(ApiError::Rejected {
                status: response.status,
                detail: receipt
                    .detail
                    .clone()
                    .or_else(|| receipt.message.clone())
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| DEFAULT_TRANSFER_FAILURE.to_string()),
            }
            .into());
        }
        Ok(receipt)
    }

    /// `POST /api/convert`. Quote only; nothing is mutated.
    pub async fn convert(&self, convert: &ConvertRequest) -> GenesisResult<ConversionQuote> {
        self.post_json("/api/convert", convert, DEFAULT_CONVERT_FAILURE)
            .await
    }

    pub async fn fx_rates(&self) -> GenesisResult<FxRates> {
        self.get_json("/api/fx/rates", "FX rate fetch failed").await
    }

    // ========================================================================
    // Admin
    // ========================================================================

    pub async fn admin_stats(&self) -> GenesisResult<AdminStats> {
        self.require_admin("admin statistics")?;
        self.get_json("/api/admin/stats", "Admin stats fetch failed")
            .await
    }

    pub async fn admin_users(&self, limit: u32) -> GenesisResult<AdminUsers> {
        self.require_admin("admin user list")?;
        self.get_json(
            &format!("/api/admin/users?limit={}", limit),
            "Admin user fetch failed",
        )
        .await
    }

    pub async fn admin_transactions(&self, limit: u32) -> GenesisResult<AdminTransactions> {
        self.require_admin("admin transaction list")?;
        self.get_json(
            &format!("/api/admin/transactions?limit={}", limit),
            "Admin transaction fetch failed",
        )
        .await
    }

    fn require_admin(&self, resource: &str) -> GenesisResult<()> {
        match self.sessions.current() {
            Some(session) if session.is_admin() => Ok(()),
            Some(_) => Err(AuthError::AccessDenied {
                resource: Some(resource.to_string()),
            }
            .into()),
            None => Err(AuthError::NotAuthenticated.into()),
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn get_json<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> GenesisResult<T> {
        let response = self.gateway.send(Request::get(path)).await?;
        if !response.is_success() {
            return Err(error_for_status(&response, fallback));
        }
        decode(&response)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> GenesisResult<T> {
        let response = self
            .gateway
            .send(Request::post_json(path, body)?)
            .await?;
        if !response.is_success() {
            return Err(error_for_status(&response, fallback));
        }
        decode(&response)
    }
}

fn decode<T: DeserializeOwned>(response: &Response) -> GenesisResult<T> {
    response.json().map_err(GenesisError::invalid_response)
}

/// Map a non-success response to an error. 5xx is a server-side transport
/// problem; everything else is a rejection carrying `detail`.
fn error_for_status(response: &Response, fallback: &str) -> GenesisError {
    if response.status >= 500 {
        return NetworkError::ServerError {
            status: response.status,
            message: extract_detail(&response.body).unwrap_or_else(|| fallback.to_string()),
        }
        .into();
    }
    if response.status == 403 {
        return AuthError::AccessDenied { resource: None }.into();
    }
    ApiError::rejected(response.status, &response.body, fallback).into()
}
