//! Common test utilities for integration tests.
//!
//! This module provides reusable fixtures and a builder for
//! [`GenesisClient`] instances wired to mock adapters.
//!
//! # Example
//!
//! ```ignore
//! let backend = MockBackend::new().with_user("u1", "Asha").with_wallet("w1", "USD", 100.0);
//! let t = TestClientBuilder::new(&backend).with_stored_credential("tok").build();
//! t.client.start().await;
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::sync::Arc;

use genesis::auth::Credential;
use genesis::startup::ClientConfig;
use genesis::GenesisClient;

/// Config pointing at the mock backend, with production timings.
pub fn test_config() -> ClientConfig {
    ClientConfig::default().with_api_url(API)
}

/// A client plus handles on every mock it was built from.
pub struct TestClient {
    pub client: GenesisClient,
    pub http: MockHttpClient,
    pub credentials: InMemoryCredentials,
    pub transport: MockPushTransport,
}

/// Builder for [`TestClient`].
pub struct TestClientBuilder {
    http: MockHttpClient,
    stored: Option<Credential>,
    config: ClientConfig,
}

impl TestClientBuilder {
    /// Creates a builder that talks to `backend`.
    pub fn new(backend: &MockBackend) -> Self {
        Self {
            http: backend.http().clone(),
            stored: None,
            config: test_config(),
        }
    }

    /// Pre-populates the credential store as if a previous run logged in.
    pub fn with_stored_credential(mut self, token: &str) -> Self {
        self.stored = Some(Credential::new(token));
        self
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TestClient {
        let credentials = match self.stored {
            Some(credential) => InMemoryCredentials::with_credential(credential),
            None => InMemoryCredentials::new(),
        };
        let transport = MockPushTransport::new();
        let client = GenesisClient::new(
            Arc::new(self.http.clone()),
            Arc::new(credentials.clone()),
            Arc::new(transport.clone()),
            self.config,
        );
        TestClient {
            client,
            http: self.http,
            credentials,
            transport,
        }
    }
}

/// Backend with user `u1` owning wallet `w1` (USD 100) and an FX table.
pub fn standard_backend() -> MockBackend {
    MockBackend::new()
        .with_user("u1", "Asha")
        .with_login("u1", "tok")
        .with_wallet("w1", "USD", 100.0)
        .with_fx_rates()
}

/// A client restored from the stored credential `tok` against `backend`.
pub async fn signed_in(backend: &MockBackend) -> TestClient {
    let t = TestClientBuilder::new(backend)
        .with_stored_credential("tok")
        .build();
    t.client.start().await;
    t
}
