//! Registration and one-time code login over HTTP.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{unique, unique_phone, TestHarness};
use hamlat_core::domains::auth::models::{TEST_CODE, TEST_PHONE_NUMBER};
use hamlat_core::domains::auth::User;
use hamlat_core::kernel::test_dependencies::MockTwilio;
use hamlat_core::kernel::TestDependencies;
use serde_json::json;
use test_context::test_context;

fn registration(phone: &str) -> serde_json::Value {
    json!({
        "name": format!("Candidate {}", unique()),
        "phone_number": phone,
        "governorate": "Slemani",
        "language": "ku",
        "dialect": "sorani"
    })
}

#[test_context(TestHarness)]
#[tokio::test]
async fn register_creates_trial_account_and_sends_code(ctx: &TestHarness) {
    let twilio = Arc::new(MockTwilio::new("000000"));
    let deps = TestDependencies {
        twilio: twilio.clone(),
        ..TestDependencies::new()
    };
    let client = ctx.client(deps);
    let phone = unique_phone();

    let response = client.post("/api/auth/register", registration(&phone)).await;

    assert_eq!(response.status, StatusCode::CREATED);
    let user = response.data();
    assert_eq!(user["phone_number"], phone);
    assert_eq!(user["governorate"], "sulaymaniyah");
    assert_eq!(user["tier"], "free");
    assert_eq!(user["subscription_status"], "trial");
    assert_eq!(user["role"], "candidate");
    assert!(user["trial_ends_at"].is_string());
    assert_eq!(twilio.sent_to(), vec![phone]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn duplicate_phone_is_a_conflict(ctx: &TestHarness) {
    let client = ctx.client(TestDependencies::new());
    let phone = unique_phone();

    let first = client.post("/api/auth/register", registration(&phone)).await;
    let second = client.post("/api/auth/register", registration(&phone)).await;

    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.json()["success"], false);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn register_validates_input(ctx: &TestHarness) {
    let client = ctx.client(TestDependencies::new());

    let mut body = registration(&unique_phone());
    body["governorate"] = json!("Atlantis");
    let response = client.post("/api/auth/register", body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = client.post("/api/auth/register", registration("12345")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn verify_code_issues_a_token(ctx: &TestHarness) {
    let client = ctx.client(TestDependencies::new());
    let phone = unique_phone();
    client.post("/api/auth/register", registration(&phone)).await;

    let wrong = client
        .post(
            "/api/auth/verify-code",
            json!({ "phone_number": phone, "code": "999999" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let right = client
        .post(
            "/api/auth/verify-code",
            json!({ "phone_number": phone, "code": "000000" }),
        )
        .await;
    assert_eq!(right.status, StatusCode::OK);
    let session = right.data();
    let token = session["token"].as_str().unwrap().to_string();
    assert_eq!(session["user"]["phone_number"], phone);

    let me = ctx
        .client(TestDependencies::new())
        .with_token(token)
        .get("/api/auth/me")
        .await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["phone_number"], phone);

    let user = User::find_by_phone(&phone, &ctx.db_pool).await.unwrap().unwrap();
    assert!(user.last_login_at.is_some());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn codes_for_unknown_numbers_are_not_sent(ctx: &TestHarness) {
    let twilio = Arc::new(MockTwilio::new("000000"));
    let client = ctx.client(TestDependencies {
        twilio: twilio.clone(),
        ..TestDependencies::new()
    });

    let response = client
        .post("/api/auth/send-code", json!({ "phone_number": unique_phone() }))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(twilio.sent_to().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_identifier_skips_twilio(ctx: &TestHarness) {
    let twilio = Arc::new(MockTwilio::new("000000"));
    let client = ctx.client(
        TestDependencies {
            twilio: twilio.clone(),
            ..TestDependencies::new()
        }
        .with_test_identifier(),
    );

    let registered = client
        .post("/api/auth/register", registration(TEST_PHONE_NUMBER))
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);

    let sent = client
        .post("/api/auth/send-code", json!({ "phone_number": TEST_PHONE_NUMBER }))
        .await;
    assert_eq!(sent.status, StatusCode::OK);
    assert!(twilio.sent_to().is_empty());

    // Twilio's code is not accepted for the test identifier
    let rejected = client
        .post(
            "/api/auth/verify-code",
            json!({ "phone_number": TEST_PHONE_NUMBER, "code": "000000" }),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::UNAUTHORIZED);

    let accepted = client
        .post(
            "/api/auth/verify-code",
            json!({ "phone_number": TEST_PHONE_NUMBER, "code": TEST_CODE }),
        )
        .await;
    assert_eq!(accepted.status, StatusCode::OK);
    assert!(accepted.data()["token"].is_string());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn protected_routes_require_a_token(ctx: &TestHarness) {
    let client = ctx.client(TestDependencies::new());

    assert_eq!(client.get("/api/auth/me").await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        client.get("/api/social/mentions").await.status,
        StatusCode::UNAUTHORIZED
    );

    let forged = ctx
        .client(TestDependencies::new())
        .with_token("not-a-jwt");
    assert_eq!(forged.get("/api/auth/me").await.status, StatusCode::UNAUTHORIZED);
}
