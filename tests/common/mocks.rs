//! Mock adapters and a canned backend for integration tests.
//!
//! This module re-exports the mock implementations from
//! `genesis::adapters::mock` and adds [`MockBackend`], which serves the
//! account endpoints for one user.

pub use genesis::adapters::mock::{
    InMemoryCredentials, MockHttpClient, MockPushTransport, MockResponse, RecordedRequest,
};
pub use genesis::traits::{HttpError, Method, Response, WsError};

use serde_json::{json, Value};

/// Base URL every test client talks to.
pub const API: &str = "http://api.test";

/// Absolute URL for an API path.
pub fn api_url(path: &str) -> String {
    format!("{}{}", API, path)
}

/// Canned backend for a single user.
///
/// Responses are keyed by URL, so tests can change what the "server"
/// holds at any point with the `set_*` methods.
#[derive(Clone, Default)]
pub struct MockBackend {
    http: MockHttpClient,
}

impl MockBackend {
    /// Creates an empty backend. Unconfigured URLs fail with a transport error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `GET /api/me` for the given user.
    pub fn with_user(self, user_id: &str, name: &str) -> Self {
        self.http.set_method_response(
            Method::Get,
            &api_url("/api/me"),
            MockResponse::json(200, user_json(user_id, name)),
        );
        self
    }

    /// Accepts any login and hands out `token` for the given user.
    pub fn with_login(self, user_id: &str, token: &str) -> Self {
        self.http.set_response(
            &api_url("/api/login"),
            MockResponse::json(
                200,
                json!({"user": user_json(user_id, "Asha"), "token": token}),
            ),
        );
        self
    }

    /// Serves one wallet with an empty history.
    pub fn with_wallet(self, wallet_id: &str, currency: &str, balance: f64) -> Self {
        self.set_wallets(json!([{"wallet_id": wallet_id, "currency": currency, "balance": balance}]));
        self.set_balance(wallet_id, balance);
        self.set_transactions(wallet_id, json!([]));
        self
    }

    /// Serves a USD/INR/EUR rate table.
    pub fn with_fx_rates(self) -> Self {
        self.http.set_response(
            &api_url("/api/fx/rates"),
            MockResponse::json(
                200,
                json!({"rates": {"USD": {"INR": 83.0, "EUR": 0.92}, "INR": {"USD": 0.012}}}),
            ),
        );
        self
    }

    /// Replaces the wallet list.
    pub fn set_wallets(&self, wallets: Value) {
        self.http.set_response(
            &api_url("/api/wallets"),
            MockResponse::json(200, json!({ "wallets": wallets })),
        );
    }

    /// Replaces the balance of one wallet.
    pub fn set_balance(&self, wallet_id: &str, balance: f64) {
        self.http.set_response(
            &api_url(&format!("/api/wallets/{}/balance", wallet_id)),
            MockResponse::json(200, json!({ "balance": balance })),
        );
    }

    /// Replaces the transaction history of one wallet.
    pub fn set_transactions(&self, wallet_id: &str, transactions: Value) {
        self.http.set_response(
            &api_url(&format!("/api/wallets/{}/transactions", wallet_id)),
            MockResponse::json(200, json!({ "transactions": transactions })),
        );
    }

    /// Makes every data endpoint of `wallet_id` answer 401.
    pub fn reject_credential(&self, wallet_id: &str) {
        for suffix in ["balance", "transactions"] {
            self.http.set_response(
                &api_url(&format!("/api/wallets/{}/{}", wallet_id, suffix)),
                MockResponse::json(401, json!({"detail": "Invalid token"})),
            );
        }
    }

    pub fn http(&self) -> &MockHttpClient {
        &self.http
    }
}

/// A user profile as the server sends it.
pub fn user_json(user_id: &str, name: &str) -> Value {
    json!({
        "user_id": user_id,
        "name": name,
        "email": format!("{}@example.com", user_id),
        "is_admin": false
    })
}

/// A completed transaction as the server sends it.
pub fn transaction_json(id: &str, from: &str, to: &str, amount: f64) -> Value {
    json!({
        "transaction_id": id,
        "from_wallet_id": from,
        "to_wallet_id": to,
        "amount": amount,
        "status": "COMPLETED",
        "timestamp": 1_760_000_000.0
    })
}
