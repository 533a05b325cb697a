//! End-to-end API tests exercising the full router: registration, login,
//! gateway validation, account creation and transfers, and rate limiting.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use chrono::{TimeDelta, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use bank_portal::rate_limit::RateLimiter;
use bank_portal::router;
use bank_portal::state::AppState;
use bank_portal::store::memory::{MemoryLedger, MemoryUserStore};
use bank_portal::token::codec::TokenCodec;
use bank_portal::token::validator::TokenValidator;

const TEST_SECRET: &[u8] = b"integration-test-secret";

fn app() -> Router {
    let state = AppState {
        users: Arc::new(MemoryUserStore::new()),
        ledger: Arc::new(MemoryLedger::new()),
        validator: TokenValidator::new(&[TEST_SECRET.to_vec()]),
        limiter: Arc::new(RateLimiter::new(Duration::from_secs(60), Utc::now())),
        token_ttl: TimeDelta::hours(24),
    };
    router::build(state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        "Authorization",
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Register a user and return a fresh login token.
async fn login_token(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({"username": username, "password": password}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({"username": username, "password": password}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["token_type"], "Bearer");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn register_login_create_and_transfer_flow() {
    let app = app();
    let token = login_token(&app, "alice", "pass-word-123").await;

    // The portal's own integration scenario: 1000.00 and 100.00
    let response = app
        .clone()
        .oneshot(with_bearer(
            post_json(
                "/api/accounts",
                json!({"owner": "Alice", "initial_balance_cents": 100000}),
            ),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let alice = body_json(response).await;

    let response = app
        .clone()
        .oneshot(with_bearer(
            post_json(
                "/api/accounts",
                json!({"owner": "Bob", "initial_balance_cents": 10000}),
            ),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bob = body_json(response).await;

    let response = app
        .clone()
        .oneshot(with_bearer(get("/api/accounts"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    // Transfer 200.00 from Alice to Bob
    let response = app
        .clone()
        .oneshot(with_bearer(
            post_json(
                "/api/accounts/transfer",
                json!({
                    "from_account_id": alice["id"],
                    "to_account_id": bob["id"],
                    "amount_cents": 20000
                }),
            ),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let receipt = body_json(response).await;
    assert_eq!(receipt["status"], "applied");
    assert_eq!(receipt["from_balance_cents"], 80000);
    assert_eq!(receipt["to_balance_cents"], 30000);

    // Balances visible through the list endpoint
    let response = app
        .clone()
        .oneshot(with_bearer(get("/api/accounts"), &token))
        .await
        .unwrap();
    let accounts = body_json(response).await;
    let balance_of = |owner: &str| {
        accounts
            .as_array()
            .unwrap()
            .iter()
            .find(|a| a["owner"] == owner)
            .unwrap()["balance_cents"]
            .as_i64()
            .unwrap()
    };
    assert_eq!(balance_of("Alice"), 80_000);
    assert_eq!(balance_of("Bob"), 30_000);
}

#[tokio::test]
async fn insufficient_funds_rejects_and_changes_nothing() {
    let app = app();
    let token = login_token(&app, "carol", "pass-word-123").await;

    let response = app
        .clone()
        .oneshot(with_bearer(
            post_json(
                "/api/accounts",
                json!({"owner": "Carol", "initial_balance_cents": 500}),
            ),
            &token,
        ))
        .await
        .unwrap();
    let carol = body_json(response).await;

    let response = app
        .clone()
        .oneshot(with_bearer(
            post_json(
                "/api/accounts",
                json!({"owner": "Dan", "initial_balance_cents": 0}),
            ),
            &token,
        ))
        .await
        .unwrap();
    let dan = body_json(response).await;

    let response = app
        .clone()
        .oneshot(with_bearer(
            post_json(
                "/api/accounts/transfer",
                json!({
                    "from_account_id": carol["id"],
                    "to_account_id": dan["id"],
                    "amount_cents": 501
                }),
            ),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "insufficient_balance");

    let response = app
        .clone()
        .oneshot(with_bearer(get("/api/accounts"), &token))
        .await
        .unwrap();
    let accounts = body_json(response).await;
    for account in accounts.as_array().unwrap() {
        let expected = if account["owner"] == "Carol" { 500 } else { 0 };
        assert_eq!(account["balance_cents"].as_i64().unwrap(), expected);
    }
}

#[tokio::test]
async fn unknown_receiver_is_reported_distinctly() {
    let app = app();
    let token = login_token(&app, "erin", "pass-word-123").await;

    let response = app
        .clone()
        .oneshot(with_bearer(
            post_json(
                "/api/accounts",
                json!({"owner": "Erin", "initial_balance_cents": 1000}),
            ),
            &token,
        ))
        .await
        .unwrap();
    let erin = body_json(response).await;

    let response = app
        .clone()
        .oneshot(with_bearer(
            post_json(
                "/api/accounts/transfer",
                json!({
                    "from_account_id": erin["id"],
                    "to_account_id": "00000000-0000-0000-0000-000000000000",
                    "amount_cents": 100
                }),
            ),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "receiver_not_found");
}

#[tokio::test]
async fn account_routes_require_a_valid_token() {
    let app = app();

    let response = app.clone().oneshot(get("/api/accounts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(with_bearer(get("/api/accounts"), "garbage.token.here"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Both failures produce the same flattened envelope
    let missing = app.clone().oneshot(get("/api/accounts")).await.unwrap();
    let garbage = app
        .clone()
        .oneshot(with_bearer(get("/api/accounts"), "garbage.token.here"))
        .await
        .unwrap();
    assert_eq!(body_bytes(missing).await, body_bytes(garbage).await);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = app();
    let _ = login_token(&app, "frank", "right-password").await;

    let wrong_password = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({"username": "frank", "password": "wrong"}),
        ))
        .await
        .unwrap();
    let unknown_user = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({"username": "nobody", "password": "wrong"}),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_bytes(wrong_password).await,
        body_bytes(unknown_user).await
    );
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app();

    let first = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({"username": "grace", "password": "pass-word-123"}),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let body = body_json(first).await;
    assert_eq!(body["username"], "grace");
    // No password material in the response
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let second = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({"username": "grace", "password": "other-password"}),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(second).await["error"]["code"], "username_taken");
}

#[tokio::test]
async fn gateway_validate_reports_status_headers() {
    let app = app();

    // Missing token
    let response = app.clone().oneshot(get("/api/auth/validate")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["X-Auth-Status"], "missing_token");
    assert_eq!(body_json(response).await["valid"], false);

    // Valid token: decision plus forwarding headers
    let token = login_token(&app, "heidi", "pass-word-123").await;
    let response = app
        .clone()
        .oneshot(with_bearer(get("/api/auth/validate"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["X-Auth-Status"], "valid");
    assert_eq!(response.headers()["X-User"], "heidi");
    let body = body_json(response).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["username"], "heidi");

    // Expired token, signed with the right key
    let expired = TokenCodec::new(TEST_SECRET)
        .issue(
            "heidi",
            &[],
            Utc::now() - TimeDelta::hours(2),
            TimeDelta::hours(1),
        )
        .unwrap();
    let response = app
        .clone()
        .oneshot(with_bearer(get("/api/auth/validate"), &expired))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["X-Auth-Status"], "expired");

    // Token signed with a foreign key
    let forged = TokenCodec::new(b"some-other-secret")
        .issue("heidi", &[], Utc::now(), TimeDelta::hours(1))
        .unwrap();
    let response = app
        .clone()
        .oneshot(with_bearer(get("/api/auth/validate"), &forged))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["X-Auth-Status"], "invalid");
}

#[tokio::test]
async fn user_info_returns_claims() {
    let app = app();
    let token = login_token(&app, "ivan", "pass-word-123").await;

    let response = app
        .clone()
        .oneshot(with_bearer(get("/api/auth/user-info"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "ivan");
    assert_eq!(body["roles"], json!(["USER"]));
}

#[tokio::test]
async fn login_rate_limit_denies_the_sixth_attempt() {
    let app = app();

    let attempt = || {
        let mut request = post_json(
            "/api/auth/login",
            json!({"username": "nobody", "password": "wrong"}),
        );
        request
            .headers_mut()
            .insert("X-Forwarded-For", "203.0.113.7".parse().unwrap());
        request
    };

    for i in 1..=5 {
        let response = app.clone().oneshot(attempt()).await.unwrap();
        // Within quota: the credential check fails, not the limiter
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "attempt {i} should reach the credential check"
        );
        let remaining: u32 = response.headers()["X-RateLimit-Remaining"]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(remaining, 5 - i);
    }

    let response = app.clone().oneshot(attempt()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["X-RateLimit-Limit"], "5");
    assert_eq!(response.headers()["X-RateLimit-Remaining"], "0");
    assert!(response.headers().contains_key("Retry-After"));
    let body = body_json(response).await;
    assert_eq!(body["limit"], 5);
    assert!(body["retry_after"].as_u64().unwrap() >= 1);

    // A different client is unaffected
    let mut other = post_json(
        "/api/auth/login",
        json!({"username": "nobody", "password": "wrong"}),
    );
    other
        .headers_mut()
        .insert("X-Forwarded-For", "203.0.113.8".parse().unwrap());
    let response = app.clone().oneshot(other).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
