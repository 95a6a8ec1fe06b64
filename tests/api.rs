//! End-to-end tests driving the JSON API through the full router,
//! including registration, session cookies, and the account/transaction
//! endpoints.

use axum::http::StatusCode;
use axum_test::{TestServer, TestServerConfig};
use rusqlite::Connection;
use serde_json::{Value, json};

use finledger::{AppState, build_router};

const STRONG_PASSWORD: &str = "correct horse battery staple";

fn get_app_state() -> AppState {
    let conn = Connection::open_in_memory().unwrap();
    AppState::new(conn, "42").unwrap()
}

/// A test server that stores the auth cookie between requests, acting as one
/// browser session.
fn get_session(state: &AppState) -> TestServer {
    let config = TestServerConfig {
        save_cookies: true,
        ..TestServerConfig::default()
    };

    TestServer::new_with_config(build_router(state.clone()), config)
}

/// Register a user through `session`, leaving its auth cookie in the session.
async fn register(session: &TestServer, email: &str) {
    let response = session
        .post("/api/users")
        .form(&json!({
            "email": email,
            "password": STRONG_PASSWORD,
            "confirm_password": STRONG_PASSWORD,
        }))
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn register_create_and_list_accounts() {
    let state = get_app_state();
    let session = get_session(&state);
    register(&session, "foo@bar.baz").await;

    let response = session
        .post("/accounts")
        .json(&json!({
            "name": "Cash",
            "type": "Cash",
            "balance": "100.50",
            "note": "",
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Cash");
    assert_eq!(body["data"]["balance"], "100.50");

    let response = session.get("/api/accounts").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["accounts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn log_in_grants_access_to_protected_api() {
    let state = get_app_state();
    register(&get_session(&state), "foo@bar.baz").await;

    // A fresh session without the registration cookie.
    let session = get_session(&state);

    let response = session.get("/api/accounts").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = session
        .post("/api/log_in")
        .form(&json!({
            "email": "foo@bar.baz",
            "password": STRONG_PASSWORD,
        }))
        .await;
    response.assert_status(StatusCode::SEE_OTHER);

    let response = session.get("/api/accounts").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn log_in_fails_with_wrong_password() {
    let state = get_app_state();
    register(&get_session(&state), "foo@bar.baz").await;

    let session = get_session(&state);
    let response = session
        .post("/api/log_in")
        .form(&json!({
            "email": "foo@bar.baz",
            "password": "not the password",
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mutating_endpoints_require_a_session() {
    let state = get_app_state();
    let session = get_session(&state);

    let response = session
        .post("/accounts")
        .json(&json!({"name": "Cash", "type": "Cash"}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = session
        .put("/accounts/1")
        .json(&json!({"name": "Cash", "type": "Cash", "balance": "1.00"}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = session.delete("/transactions/1").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_account_round_trip() {
    let state = get_app_state();
    let session = get_session(&state);
    register(&session, "foo@bar.baz").await;

    let response = session
        .post("/accounts")
        .json(&json!({"name": "Cash", "type": "Cash", "balance": "100.50"}))
        .await;
    let account_id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    let response = session
        .put(&format!("/accounts/{account_id}"))
        .json(&json!({"name": "Cash", "type": "Cash", "balance": "250.00"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["balance"], "250.00");

    // Updating an account that does not exist yields a 404.
    let response = session
        .put("/accounts/999")
        .json(&json!({"name": "Cash", "type": "Cash", "balance": "250.00"}))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn update_with_unparseable_balance_returns_400() {
    let state = get_app_state();
    let session = get_session(&state);
    register(&session, "foo@bar.baz").await;

    let response = session
        .post("/accounts")
        .json(&json!({"name": "Cash", "type": "Cash", "balance": "100.50"}))
        .await;
    let account_id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    let response = session
        .put(&format!("/accounts/{account_id}"))
        .json(&json!({"name": "Cash", "type": "Cash", "balance": "abc"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);

    // The stored balance is unchanged.
    let response = session.get("/api/accounts").await;
    let body: Value = response.json();
    assert_eq!(body["accounts"][0]["balance"], "100.50");
}

#[tokio::test]
async fn transaction_crud_flow() {
    let state = get_app_state();
    let session = get_session(&state);
    register(&session, "foo@bar.baz").await;

    let response = session
        .post("/accounts")
        .json(&json!({"name": "Cash", "type": "Cash", "balance": "100.50"}))
        .await;
    let account_id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    let response = session
        .post("/transactions")
        .json(&json!({
            "accountId": account_id,
            "type": "debit",
            "amount": "25.00",
            "category": "Food",
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let transaction_id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    let response = session.get("/api/transactions").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
    assert_eq!(body["transactions"][0]["amount"], "25.00");

    let response = session
        .put(&format!("/transactions/{transaction_id}"))
        .json(&json!({"type": "debit", "amount": "30.00", "category": "Groceries"}))
        .await;
    response.assert_status_ok();

    let response = session
        .delete(&format!("/transactions/{transaction_id}"))
        .await;
    response.assert_status_ok();

    let response = session.get("/api/transactions").await;
    let body: Value = response.json();
    assert!(body["transactions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn transaction_referencing_another_users_account_is_rejected() {
    let state = get_app_state();

    let other_session = get_session(&state);
    register(&other_session, "other@example.com").await;
    let response = other_session
        .post("/accounts")
        .json(&json!({"name": "Savings", "type": "Bank", "balance": "5000.00"}))
        .await;
    let account_id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    let session = get_session(&state);
    register(&session, "foo@bar.baz").await;
    let response = session
        .post("/transactions")
        .json(&json!({
            "accountId": account_id,
            "type": "debit",
            "amount": "25.00",
            "category": "Food",
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let response = session.get("/api/transactions").await;
    let body: Value = response.json();
    assert!(body["transactions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn users_only_see_their_own_records() {
    let state = get_app_state();

    let first_session = get_session(&state);
    register(&first_session, "first@example.com").await;
    first_session
        .post("/accounts")
        .json(&json!({"name": "Cash", "type": "Cash", "balance": "100.50"}))
        .await;

    let second_session = get_session(&state);
    register(&second_session, "second@example.com").await;
    let response = second_session.get("/api/accounts").await;

    let body: Value = response.json();
    assert!(body["accounts"].as_array().unwrap().is_empty());
}
