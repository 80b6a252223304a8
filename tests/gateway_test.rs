//! Integration tests for the request gateway and typed API.
//!
//! These tests verify:
//! - Credential injection and caller-supplied headers
//! - Forced logout on a rejected credential, including teardown ordering
//! - That a stale 401 cannot end a newer session
//! - Status-to-error mapping of the typed API

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::*;
use genesis::auth::{AuthState, Credential, CredentialStore, Session, SessionBound, SessionRegistry};
use genesis::error::{ApiError, AuthError, GenesisError, NetworkError};
use genesis::gateway::{GenesisApi, RequestGateway};
use genesis::models::UserProfile;
use genesis::traits::Request;
use serde_json::json;

struct Fixture {
    backend: MockBackend,
    provider: InMemoryCredentials,
    credentials: Arc<CredentialStore>,
    sessions: Arc<SessionRegistry>,
    gateway: Arc<RequestGateway>,
    api: GenesisApi,
}

fn fixture() -> Fixture {
    let backend = MockBackend::new();
    let provider = InMemoryCredentials::new();
    let credentials = Arc::new(CredentialStore::new(Arc::new(provider.clone())));
    let sessions = Arc::new(SessionRegistry::new());
    let gateway = Arc::new(RequestGateway::new(
        Arc::new(backend.http().clone()),
        API,
        credentials.clone(),
        sessions.clone(),
    ));
    let api = GenesisApi::new(gateway.clone(), sessions.clone());
    Fixture {
        backend,
        provider,
        credentials,
        sessions,
        gateway,
        api,
    }
}

fn profile(user_id: &str) -> UserProfile {
    serde_json::from_value(user_json(user_id, "Asha")).unwrap()
}

/// Persist `token` and start a session with it, the way login does.
async fn sign_in(f: &Fixture, user_id: &str, token: &str) -> u64 {
    f.credentials.store(Credential::new(token)).await.unwrap();
    f.sessions
        .begin(Session::new(profile(user_id), Credential::new(token)))
}

/// Records whether its session tore it down, and whether the credential
/// was still present at that moment.
struct Probe {
    credentials: Arc<CredentialStore>,
    torn_down: AtomicBool,
    credential_at_teardown: AtomicBool,
}

impl SessionBound for Probe {
    fn teardown(&self) {
        self.credential_at_teardown
            .store(self.credentials.current().is_some(), Ordering::SeqCst);
        self.torn_down.store(true, Ordering::SeqCst);
    }
}

// ============================================================================
// Credential injection
// ============================================================================

/// Every request carries the current credential once signed in.
#[tokio::test]
async fn test_bearer_attached_to_every_request() {
    let f = fixture();
    f.backend.clone().with_wallet("w1", "USD", 10.0).with_fx_rates();
    sign_in(&f, "u1", "tok").await;

    f.api.wallets().await.unwrap();
    f.api.balance("w1").await.unwrap();
    f.api.fx_rates().await.unwrap();

    let requests = f.backend.http().get_requests();
    assert_eq!(requests.len(), 3);
    assert!(requests
        .iter()
        .all(|r| r.header("Authorization") == Some("Bearer tok")));
}

/// Without a credential requests go out bare.
#[tokio::test]
async fn test_no_header_without_credential() {
    let f = fixture();
    f.backend.clone().with_fx_rates();

    f.api.fx_rates().await.unwrap();

    let request = &f.backend.http().get_requests()[0];
    assert_eq!(request.url, api_url("/api/fx/rates"));
    assert!(request.header("Authorization").is_none());
}

/// A caller-supplied Authorization header wins, and a 401 on it is just a
/// response.
#[tokio::test]
async fn test_caller_header_kept_and_not_policed() {
    let f = fixture();
    sign_in(&f, "u1", "tok").await;
    f.backend.http().set_response(
        &api_url("/api/me"),
        MockResponse::json(401, json!({"detail": "Invalid token"})),
    );

    let response = f
        .gateway
        .send(Request::get("/api/me").with_header("Authorization", "Bearer other"))
        .await
        .unwrap();

    assert_eq!(response.status, 401);
    assert_eq!(
        f.backend.http().get_requests()[0].header("Authorization"),
        Some("Bearer other")
    );
    assert_eq!(f.sessions.state(), AuthState::Authenticated);
    assert_eq!(f.provider.stored(), Some(Credential::new("tok")));
}

// ============================================================================
// Forced logout
// ============================================================================

/// A 401 on the session credential tears the session down, then clears the
/// credential, all before the caller sees the error.
#[tokio::test]
async fn test_rejected_credential_ends_session_before_returning() {
    let f = fixture();
    let epoch = sign_in(&f, "u1", "tok").await;
    let probe = Arc::new(Probe {
        credentials: f.credentials.clone(),
        torn_down: AtomicBool::new(false),
        credential_at_teardown: AtomicBool::new(false),
    });
    assert!(f.sessions.attach(epoch, probe.clone()));
    f.backend.http().set_response(
        &api_url("/api/wallets"),
        MockResponse::json(401, json!({"detail": "Invalid token"})),
    );

    let err = f.api.wallets().await.unwrap_err();

    assert!(matches!(err, GenesisError::Auth(AuthError::CredentialRejected)));
    assert!(err.requires_reauth());
    assert!(probe.torn_down.load(Ordering::SeqCst));
    assert!(probe.credential_at_teardown.load(Ordering::SeqCst));
    assert!(f.sessions.current().is_none());
    assert_eq!(f.sessions.state(), AuthState::Anonymous);
    assert!(f.credentials.current().is_none());
    assert!(f.provider.stored().is_none());
}

/// A 401 that arrives after a newer login leaves the new session alone.
#[tokio::test(start_paused = true)]
async fn test_stale_rejection_does_not_end_newer_session() {
    let f = fixture();
    sign_in(&f, "u1", "old").await;
    let url = api_url("/api/wallets");
    f.backend
        .http()
        .push_response(&url, MockResponse::json(401, json!({"detail": "expired"})));
    f.backend.http().set_delay(&url, Duration::from_secs(1));

    let (stale, new_epoch) = tokio::join!(f.api.wallets(), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        sign_in(&f, "u1", "new").await
    });

    assert!(matches!(
        stale,
        Err(GenesisError::Auth(AuthError::CredentialRejected))
    ));
    assert!(f.sessions.is_current(new_epoch));
    assert_eq!(f.credentials.current(), Some(Credential::new("new")));
    assert_eq!(f.provider.stored(), Some(Credential::new("new")));
    assert_eq!(f.provider.clear_calls(), 0);
}

/// Concurrent rejections end the session once.
#[tokio::test]
async fn test_concurrent_rejections_end_session_once() {
    let f = fixture();
    sign_in(&f, "u1", "tok").await;
    f.backend.reject_credential("w1");

    let (a, b) = tokio::join!(f.api.balance("w1"), f.api.transactions("w1"));

    assert!(a.is_err() && b.is_err());
    assert_eq!(f.sessions.state(), AuthState::Anonymous);
    assert!(f.provider.stored().is_none());
    assert!(f.provider.clear_calls() >= 1);
}

// ============================================================================
// Status mapping
// ============================================================================

/// 5xx is a server error, 403 is access denied, other 4xx carry the detail.
#[tokio::test]
async fn test_status_mapping() {
    let f = fixture();
    sign_in(&f, "u1", "tok").await;
    let http = f.backend.http();
    http.set_response(
        &api_url("/api/wallets/w5/balance"),
        MockResponse::json(503, json!({"detail": "maintenance"})),
    );
    http.set_response(
        &api_url("/api/wallets/w3/balance"),
        MockResponse::json(403, json!({"detail": "Not your wallet"})),
    );
    http.set_response(
        &api_url("/api/wallets/w4/balance"),
        MockResponse::json(404, json!({"detail": "Wallet not found"})),
    );

    assert!(matches!(
        f.api.balance("w5").await,
        Err(GenesisError::Network(NetworkError::ServerError { status: 503, .. }))
    ));
    assert!(matches!(
        f.api.balance("w3").await,
        Err(GenesisError::Auth(AuthError::AccessDenied { .. }))
    ));
    match f.api.balance("w4").await {
        Err(GenesisError::Api(ApiError::Rejected { status, detail })) => {
            assert_eq!(status, 404);
            assert_eq!(detail, "Wallet not found");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    // None of these touch the session.
    assert_eq!(f.sessions.state(), AuthState::Authenticated);
}

/// Transport failures and garbage bodies map to network and protocol errors.
#[tokio::test]
async fn test_transport_and_decode_failures() {
    let f = fixture();
    f.backend.http().set_response(
        &api_url("/api/fx/rates"),
        MockResponse::Error(HttpError::ConnectionFailed("refused".to_string())),
    );
    f.backend.http().set_response(
        &api_url("/api/wallets"),
        MockResponse::Success(Response::new(200, "<html>")),
    );

    assert!(matches!(
        f.api.fx_rates().await,
        Err(GenesisError::Network(_))
    ));
    assert!(matches!(
        f.api.wallets().await,
        Err(GenesisError::Api(ApiError::InvalidResponse { .. }))
    ));
}

/// Admin endpoints require an admin session.
#[tokio::test]
async fn test_admin_endpoints_require_admin() {
    let f = fixture();
    assert!(matches!(
        f.api.admin_stats().await,
        Err(GenesisError::Auth(AuthError::NotAuthenticated))
    ));

    sign_in(&f, "u1", "tok").await;
    assert!(matches!(
        f.api.admin_stats().await,
        Err(GenesisError::Auth(AuthError::AccessDenied { .. }))
    ));
    assert!(f.backend.http().get_requests().is_empty());
}
