//! End-to-end scenarios against the mock backend.
//!
//! These tests drive a fully assembled [`GenesisClient`] through the flows a
//! dashboard user goes through:
//! - Login, transfer and the balance/history refresh that follows
//! - Conversion quotes, including a newer request superseding an older one
//! - Incoming-transfer push events
//! - Forced logout when the server rejects the credential

mod common;

use std::time::Duration;

use common::*;
use genesis::app::QuoteState;
use genesis::auth::AuthState;
use genesis::error::{ApiError, AuthError, GenesisError};
use genesis::models::{Currency, NewUser, TransferRecipient};
use genesis::notifications::Severity;
use genesis::websocket::PushState;
use rust_decimal_macros::dec;
use serde_json::json;

// ============================================================================
// Transfer
// ============================================================================

/// Login, send 25 of 100 to a phone number, and see 75 with the new entry.
#[tokio::test(start_paused = true)]
async fn test_login_then_transfer_refreshes_balance_and_history() {
    let backend = standard_backend();
    let t = TestClientBuilder::new(&backend).build();

    let user = t.client.login("u1@example.com", "hunter2").await.unwrap();
    assert_eq!(user.user_id, "u1");
    assert_eq!(t.client.auth_state(), AuthState::Authenticated);
    assert_eq!(t.client.account().balance(), Some(dec!(100)));
    assert_eq!(t.credentials.stored().unwrap().as_str(), "tok");

    // The server applies the transfer.
    backend.http().set_response(
        &api_url("/api/transfer"),
        MockResponse::json(200, json!({"success": true, "transaction_id": "txn-0000abcd1234"})),
    );
    backend.set_balance("w1", 75.0);
    backend.set_transactions(
        "w1",
        json!([transaction_json("txn-0000abcd1234", "w1", "w9", 25.0)]),
    );

    let receipt = t
        .client
        .transfer(TransferRecipient::Phone(" +15550100 ".to_string()), dec!(25))
        .await
        .unwrap();
    assert_eq!(receipt.short_reference(), "abcd1234");

    let account = t.client.account();
    assert_eq!(account.balance(), Some(dec!(75)));
    assert_eq!(account.transactions.len(), 1);
    assert_eq!(account.transactions[0].transaction_id, "txn-0000abcd1234");
    assert_eq!(account.total_sent(), dec!(25));

    let notification = t.client.notifications().current().unwrap();
    assert_eq!(notification.severity, Severity::Success);
    assert_eq!(notification.message, "Sent! Ref: ···abcd1234");

    let requests = t.http.requests_to(&api_url("/api/transfer"));
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].header("Authorization"), Some("Bearer tok"));
    assert_eq!(
        requests[0].json_body().unwrap(),
        json!({"from_wallet_id": "w1", "amount": 25.0, "to_phone_number": "+15550100"})
    );
}

/// A rejected transfer shows the server's reason and changes nothing.
#[tokio::test(start_paused = true)]
async fn test_rejected_transfer_leaves_account_untouched() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;
    backend.http().set_response(
        &api_url("/api/transfer"),
        MockResponse::json(400, json!({"detail": "Insufficient funds"})),
    );
    let before = t.client.account();

    let err = t
        .client
        .transfer(TransferRecipient::Wallet("w9".to_string()), dec!(500))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GenesisError::Api(ApiError::Rejected { status: 400, ref detail }) if detail == "Insufficient funds"
    ));
    let notification = t.client.notifications().current().unwrap();
    assert_eq!(notification.severity, Severity::Error);
    assert_eq!(notification.message, "Insufficient funds");
    assert_eq!(t.client.account().balance(), before.balance());
    assert_eq!(t.client.account().transactions, before.transactions);
}

/// `success: false` with no detail falls back to the generic message.
#[tokio::test(start_paused = true)]
async fn test_unsuccessful_receipt_uses_fallback_message() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;
    backend.http().set_response(
        &api_url("/api/transfer"),
        MockResponse::json(200, json!({"success": false})),
    );

    let err = t
        .client
        .transfer(TransferRecipient::Wallet("w9".to_string()), dec!(5))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Transfer failed");
    assert_eq!(
        t.client.notifications().current().unwrap().message,
        "Transfer failed"
    );
}

/// A second transfer while one is pending fails without reaching the server.
#[tokio::test(start_paused = true)]
async fn test_second_transfer_rejected_while_first_in_flight() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;
    backend.http().set_response(
        &api_url("/api/transfer"),
        MockResponse::json(200, json!({"success": true, "transaction_id": "t-1"})),
    );
    backend
        .http()
        .set_delay(&api_url("/api/transfer"), Duration::from_secs(1));

    let (first, second) = tokio::join!(
        t.client
            .transfer(TransferRecipient::Wallet("w9".to_string()), dec!(10)),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(t.client.transfer_in_flight());
            t.client
                .transfer(TransferRecipient::Wallet("w9".to_string()), dec!(10))
                .await
        }
    );

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(GenesisError::Api(ApiError::TransferInFlight))
    ));
    assert_eq!(t.http.requests_to(&api_url("/api/transfer")).len(), 1);
    assert!(!t.client.transfer_in_flight());
}

/// The gate stays closed while the refresh that follows a transfer runs.
#[tokio::test(start_paused = true)]
async fn test_second_transfer_rejected_during_post_transfer_refresh() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;
    backend.http().set_response(
        &api_url("/api/transfer"),
        MockResponse::json(200, json!({"success": true, "transaction_id": "t-1"})),
    );
    backend.set_balance("w1", 90.0);
    backend
        .http()
        .set_delay(&api_url("/api/wallets/w1/balance"), Duration::from_secs(1));

    let (first, second) = tokio::join!(
        t.client
            .transfer(TransferRecipient::Wallet("w9".to_string()), dec!(10)),
        async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            assert_eq!(t.http.requests_to(&api_url("/api/transfer")).len(), 1);
            assert!(t.client.transfer_in_flight());
            t.client
                .transfer(TransferRecipient::Wallet("w9".to_string()), dec!(10))
                .await
        }
    );

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(GenesisError::Api(ApiError::TransferInFlight))
    ));
    assert_eq!(t.http.requests_to(&api_url("/api/transfer")).len(), 1);
    assert_eq!(t.client.account().balance(), Some(dec!(90)));
    assert!(!t.client.transfer_in_flight());
}

/// Invalid input is rejected locally.
#[tokio::test(start_paused = true)]
async fn test_transfer_validation_happens_before_network() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;

    let zero = t
        .client
        .transfer(TransferRecipient::Wallet("w9".to_string()), dec!(0))
        .await;
    let blank = t
        .client
        .transfer(TransferRecipient::Phone("   ".to_string()), dec!(5))
        .await;

    assert!(matches!(zero, Err(GenesisError::Api(ApiError::Validation { .. }))));
    assert!(matches!(blank, Err(GenesisError::Api(ApiError::Validation { .. }))));
    assert!(t.http.requests_to(&api_url("/api/transfer")).is_empty());
}

// ============================================================================
// Convert
// ============================================================================

fn quote_json(original: f64, converted: f64) -> serde_json::Value {
    json!({
        "amount_original": original,
        "amount_converted": converted,
        "rate": 83.0,
        "from_currency": "USD",
        "to_currency": "INR"
    })
}

/// 50 USD at 83 quotes 4150 INR and leaves the balance alone.
#[tokio::test(start_paused = true)]
async fn test_quote_conversion() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;
    backend.http().set_response(
        &api_url("/api/convert"),
        MockResponse::json(200, quote_json(50.0, 4150.0)),
    );

    let quote = t
        .client
        .quote(Currency::Inr, dec!(50))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(quote.amount_converted, dec!(4150));
    assert_eq!(quote.rate, dec!(83));
    assert_eq!(quote.to_currency, Currency::Inr);
    assert!(matches!(t.client.quote_state(), QuoteState::Ready { .. }));
    assert_eq!(t.client.account().balance(), Some(dec!(100)));

    let request = &t.http.requests_to(&api_url("/api/convert"))[0];
    assert_eq!(
        request.json_body().unwrap(),
        json!({"wallet_id": "w1", "to_currency": 2, "amount": 50.0})
    );
}

/// When a second quote is requested before the first answers, only the
/// second one is shown.
#[tokio::test(start_paused = true)]
async fn test_newer_quote_supersedes_older() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;
    let url = api_url("/api/convert");
    backend
        .http()
        .push_response(&url, MockResponse::json(200, quote_json(50.0, 4150.0)));
    backend
        .http()
        .push_response(&url, MockResponse::json(200, quote_json(100.0, 8300.0)));
    backend.http().set_delay(&url, Duration::from_secs(1));

    let (first, second) = tokio::join!(t.client.quote(Currency::Inr, dec!(50)), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        t.client.quote(Currency::Inr, dec!(100)).await
    });

    assert_eq!(first.unwrap(), None);
    assert_eq!(second.unwrap().unwrap().amount_converted, dec!(8300));
    match t.client.quote_state() {
        QuoteState::Ready { quote, .. } => assert_eq!(quote.amount_converted, dec!(8300)),
        other => panic!("unexpected quote state: {:?}", other),
    }
}

/// A failed quote surfaces the server detail.
#[tokio::test(start_paused = true)]
async fn test_failed_quote_reports_detail() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;
    backend.http().set_response(
        &api_url("/api/convert"),
        MockResponse::json(400, json!({"detail": "Cannot convert to the same currency"})),
    );

    let err = t.client.quote(Currency::Usd, dec!(10)).await.unwrap_err();

    assert_eq!(err.user_message(), "Cannot convert to the same currency");
    assert!(matches!(t.client.quote_state(), QuoteState::Failed { .. }));
}

/// Switching wallets drops the shown quote.
#[tokio::test(start_paused = true)]
async fn test_wallet_switch_invalidates_quote() {
    let backend = standard_backend();
    backend.set_wallets(json!([
        {"wallet_id": "w1", "currency": "USD", "balance": 100.0},
        {"wallet_id": "w2", "currency": "INR", "balance": 830.0}
    ]));
    backend.set_balance("w2", 830.0);
    backend.set_transactions("w2", json!([]));
    let t = signed_in(&backend).await;
    backend.http().set_response(
        &api_url("/api/convert"),
        MockResponse::json(200, quote_json(50.0, 4150.0)),
    );
    t.client.quote(Currency::Inr, dec!(50)).await.unwrap();

    assert!(t.client.select_wallet(Some("w2")));

    assert_eq!(t.client.quote_state(), QuoteState::Idle);
    assert_eq!(t.client.account().active_wallet.as_deref(), Some("w2"));
}

/// History of the active wallet, and a local error with none selected.
#[tokio::test(start_paused = true)]
async fn test_conversion_history_follows_active_wallet() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;
    backend.http().set_response(
        &api_url("/api/wallets/w1/conversions"),
        MockResponse::json(
            200,
            json!({"records": [{"id": 3, "from_currency": 1, "to_currency": 3, "rate": 1.25}]}),
        ),
    );

    let records = t.client.conversions().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].to_currency, Currency::Eur);
    assert_eq!(records[0].rate, dec!(1.25));

    assert!(t.client.select_wallet(None));
    t.http.clear_requests();
    let err = t.client.conversions().await.unwrap_err();
    assert!(matches!(
        err,
        GenesisError::Api(ApiError::Validation { ref field, .. }) if field == "wallet"
    ));
    assert!(t.http.get_requests().is_empty());
}

// ============================================================================
// Push
// ============================================================================

/// An incoming transfer shows one notification and refreshes the balance.
#[tokio::test(start_paused = true)]
async fn test_incoming_transfer_notifies_and_refreshes() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(t.client.push_state(), PushState::Open);

    backend.set_balance("w1", 130.0);
    assert!(t
        .transport
        .send_frame(r#"{"event":"transfer_received","amount":30,"currency":"USD"}"#));
    tokio::time::sleep(Duration::from_millis(10)).await;

    let notification = t.client.notifications().current().unwrap();
    assert_eq!(notification.message, "Received 30 USD");
    assert_eq!(notification.severity, Severity::Success);
    assert_eq!(t.client.account().balance(), Some(dec!(130)));
}

/// A second event within the display window replaces the first, and the
/// second clears a full window after it was shown.
#[tokio::test(start_paused = true)]
async fn test_incoming_transfer_notifications_replace_each_other() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;
    tokio::time::sleep(Duration::from_millis(600)).await;
    let mut seen = t.client.notifications().subscribe();

    t.transport
        .send_frame(r#"{"event":"transfer_received","amount":30,"currency":"USD"}"#);
    tokio::time::sleep(Duration::from_secs(2)).await;
    t.transport
        .send_frame(r#"{"event":"transfer_received","amount":5,"currency":2}"#);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(seen.has_changed().unwrap());
    assert_eq!(
        seen.borrow_and_update().as_ref().unwrap().message,
        "Received 5 INR"
    );

    // The first event's timer must not clear the second one.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert!(t.client.notifications().current().is_some());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(t.client.notifications().current().is_none());
}

// ============================================================================
// Forced logout
// ============================================================================

/// A 401 on an authenticated call ends everything tied to the session
/// before the call returns.
#[tokio::test(start_paused = true)]
async fn test_rejected_credential_forces_logout() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(t.client.push_state(), PushState::Open);
    assert!(t.client.is_syncing());

    backend.reject_credential("w1");
    let err = t.client.refresh().await.unwrap_err();

    assert!(matches!(err, GenesisError::Auth(AuthError::CredentialRejected)));
    assert_eq!(t.client.auth_state(), AuthState::Anonymous);
    assert!(t.client.session().is_none());
    assert!(t.client.credentials().current().is_none());
    assert!(t.credentials.stored().is_none());
    assert!(!t.client.is_syncing());
    assert_eq!(t.client.push_state(), PushState::Closed);
    assert!(t.client.account().wallets.is_empty());

    // Nothing session-bound keeps running afterwards.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(t.transport.is_connection_closed());
    assert_eq!(t.transport.connect_count(), 1);
}

/// The periodic loop also triggers the forced logout.
#[tokio::test(start_paused = true)]
async fn test_sync_loop_401_forces_logout() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;
    let mut auth = t.client.subscribe_auth();

    backend.reject_credential("w1");
    tokio::time::sleep(Duration::from_secs(11)).await;

    assert_eq!(*auth.borrow_and_update(), AuthState::Anonymous);
    assert!(t.credentials.stored().is_none());
    assert_eq!(t.client.push_state(), PushState::Closed);
}

// ============================================================================
// Re-login
// ============================================================================

/// A wrong password while signed in is a login failure, not a rejected
/// session: the current session and its stored credential stay in place.
#[tokio::test(start_paused = true)]
async fn test_failed_relogin_keeps_current_session() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(t.client.push_state(), PushState::Open);

    backend.http().set_response(
        &api_url("/api/login"),
        MockResponse::json(401, json!({"detail": "Invalid email or password"})),
    );
    let err = t
        .client
        .login("u1@example.com", "wrong")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GenesisError::Auth(AuthError::InvalidCredentials { .. })
    ));
    assert_eq!(err.user_message(), "Invalid email or password");
    assert_eq!(t.client.auth_state(), AuthState::Authenticated);
    assert_eq!(t.client.session().unwrap().user.user_id, "u1");
    assert_eq!(t.credentials.stored().unwrap().as_str(), "tok");
    assert_eq!(t.credentials.clear_calls(), 0);

    let login = t.http.requests_to(&api_url("/api/login"));
    assert_eq!(login.len(), 1);
    assert!(login[0].header("authorization").is_none());

    // The session keeps working afterwards.
    assert!(t.client.is_syncing());
    assert_eq!(t.client.push_state(), PushState::Open);
    t.client.refresh().await.unwrap();
}

/// Signup goes out without the session credential and leaves the session
/// alone.
#[tokio::test(start_paused = true)]
async fn test_signup_while_signed_in() {
    let backend = standard_backend();
    let t = signed_in(&backend).await;
    backend.http().set_response(
        &api_url("/api/users"),
        MockResponse::json(201, user_json("u2", "Mei")),
    );

    let profile = t
        .client
        .signup(&NewUser {
            email: "u2@example.com".to_string(),
            name: "Mei".to_string(),
            password: "s3cret".to_string(),
            phone_number: "+4915100000".to_string(),
            region: 2,
        })
        .await
        .unwrap();
    assert_eq!(profile.user_id, "u2");

    let sent = t.http.requests_to(&api_url("/api/users"));
    assert_eq!(sent.len(), 1);
    assert!(sent[0].header("authorization").is_none());
    assert_eq!(sent[0].json_body().unwrap()["region"], 2);
    assert_eq!(t.client.session().unwrap().user.user_id, "u1");
    assert_eq!(t.credentials.stored().unwrap().as_str(), "tok");
}
