//! End-to-end session lifecycle over HTTP.

use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

async fn login(server: &common::TestServer, sub: &str) -> Value {
    let res = common::client()
        .post(server.url("/auth/login"))
        .json(&json!({ "assertion": common::assertion(sub), "device_id": "phone-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[tokio::test]
async fn test_login_refresh_logout() {
    let server = common::spawn_server(common::test_config()).await;
    let client = common::client();

    let pair = login(&server, "google-1").await;
    assert_eq!(pair["token_type"], "Bearer");
    assert_eq!(pair["expires_in"], 3600);
    let access = pair["access_token"].as_str().unwrap().to_string();
    let refresh = pair["refresh_token"].as_str().unwrap().to_string();

    // Access token opens private routes (no resource backend configured).
    let res = client
        .get(server.url("/auth/profile"))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_IMPLEMENTED);

    // Rotate.
    let res = client
        .post(server.url("/auth/refresh"))
        .json(&json!({ "refresh_token": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let rotated: Value = res.json().await.unwrap();
    let new_refresh = rotated["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(new_refresh, refresh);

    // The old refresh token is spent.
    let res = client
        .post(server.url("/auth/refresh"))
        .json(&json!({ "refresh_token": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_session");

    // Logout twice, both 204.
    for _ in 0..2 {
        let res = client
            .post(server.url("/logout"))
            .bearer_auth(&access)
            .json(&json!({ "refresh_token": new_refresh }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    let res = client
        .post(server.url("/auth/refresh"))
        .json(&json!({ "refresh_token": new_refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    server.stop().await;
}

#[tokio::test]
async fn test_same_identity_keeps_subject() {
    let server = common::spawn_server(common::test_config()).await;

    let first = login(&server, "google-2").await;
    let second = login(&server, "google-2").await;
    let other = login(&server, "google-3").await;

    let subject = |pair: &Value| {
        server
            .tokens
            .verify_access(pair["access_token"].as_str().unwrap())
            .unwrap()
    };
    assert_eq!(subject(&first), subject(&second));
    assert_ne!(subject(&first), subject(&other));

    server.stop().await;
}

#[tokio::test]
async fn test_forged_assertion_rejected() {
    let server = common::spawn_server(common::test_config()).await;

    let forged = common::sign_assertion("google-1", "not-the-identity-secret-0123456789");
    let res = common::client()
        .post(server.url("/auth/login"))
        .json(&json!({ "assertion": forged }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["www-authenticate"], "Bearer");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "identity_verification_failed");

    server.stop().await;
}

#[tokio::test]
async fn test_logout_requires_access_token() {
    let server = common::spawn_server(common::test_config()).await;
    let pair = login(&server, "google-4").await;

    let res = common::client()
        .post(server.url("/logout"))
        .json(&json!({ "refresh_token": pair["refresh_token"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // The session survived the rejected logout.
    let res = common::client()
        .post(server.url("/auth/refresh"))
        .json(&json!({ "refresh_token": pair["refresh_token"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_session_body_is_bad_request() {
    let server = common::spawn_server(common::test_config()).await;

    let res = common::client()
        .post(server.url("/auth/refresh"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    server.stop().await;
}
