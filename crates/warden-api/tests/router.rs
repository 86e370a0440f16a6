// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Router-level tests: requests go through the full middleware stack.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration};
use http_body_util::BodyExt;
use tower::ServiceExt;

use warden_api::{
    AuthGateway, CredentialsConfig, GatewayConfig, GatewayServer, ManualClock, SigningKey,
    TokenConfig,
};

const SECRET: &str = "router-test-secret-that-is-long-enough-for-hs256";
const START: i64 = 1_700_000_000;

fn router_with_clock(config: GatewayConfig) -> (Router, ManualClock) {
    let clock = ManualClock::new(DateTime::from_timestamp(START, 0).unwrap());
    let gateway = AuthGateway::builder()
        .config(config)
        .clock(Arc::new(clock.clone()))
        .build()
        .unwrap();
    (GatewayServer::new(gateway).router(), clock)
}

fn config() -> GatewayConfig {
    GatewayConfig::default()
        .with_token(TokenConfig::new(SECRET))
        .with_credentials(CredentialsConfig::single_user("username", "password123"))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={}&password={}", username, password)))
        .unwrap()
}

fn verify_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(router: &Router) -> String {
    let response = router
        .clone()
        .oneshot(login_request("username", "password123"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    json["token"].as_str().unwrap().to_string()
}

// =============================================================================
// /login
// =============================================================================

#[tokio::test]
async fn test_login_success() {
    let (router, _) = router_with_clock(config());

    let response = router
        .oneshot(login_request("username", "password123"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["expires_in"], 86_400);
    assert_eq!(json["token"].as_str().unwrap().split('.').count(), 3);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let (router, _) = router_with_clock(config());

    for (user, pass) in [("username", "wrong"), ("nobody", "password123"), ("", "")] {
        let response = router.clone().oneshot(login_request(user, pass)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["error"]["message"], "Invalid credentials");
    }
}

#[tokio::test]
async fn test_login_non_form_body_is_json_bad_request() {
    let (router, _) = router_with_clock(config());

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username":"username","password":"password123"}"#))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
    assert!(json["error"]["message"].as_str().unwrap().starts_with("Invalid form"));
}

// =============================================================================
// /verify
// =============================================================================

#[tokio::test]
async fn test_verify_until_expiry() {
    let (router, clock) = router_with_clock(config());
    let token = login(&router).await;

    let response = router
        .clone()
        .oneshot(verify_request("/verify", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Token is valid");

    clock.advance(Duration::hours(24) + Duration::seconds(1));

    let response = router
        .oneshot(verify_request("/verify", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["error"]["message"], "Invalid token");
}

#[tokio::test]
async fn test_verify_missing_token() {
    let (router, _) = router_with_clock(config());

    let response = router.oneshot(verify_request("/verify", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["error"]["message"], "Missing token");
}

#[tokio::test]
async fn test_verify_bare_bearer_scheme() {
    let (router, _) = router_with_clock(config());

    for value in ["Bearer", "Bearer ", "bearer   "] {
        let request = Request::builder()
            .uri("/verify")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["error"]["message"], "Missing token");
    }
}

#[tokio::test]
async fn test_verify_malformed_query_is_json_bad_request() {
    let (router, _) = router_with_clock(config());
    let token = login(&router).await;

    let response = router
        .oneshot(verify_request("/verify?scope=a&scope=b", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_verify_garbage_token() {
    let (router, _) = router_with_clock(config());

    let response = router
        .oneshot(verify_request("/verify", Some("invalid.token.here")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_local_token_with_scope() {
    let (router, _) = router_with_clock(config());
    let token = login(&router).await;

    let response = router
        .oneshot(verify_request("/verify?scope=admin", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_verify_after_key_rotation() {
    let rotate_at = DateTime::from_timestamp(START + 3_600, 0).unwrap();
    let token_config = TokenConfig::new(SECRET).with_key(
        SigningKey::new("next", "next-secret-that-is-also-long-enough-for-hs256").valid_from(rotate_at),
    );
    let (router, clock) = router_with_clock(config().with_token(token_config));

    let old_token = login(&router).await;
    clock.advance(Duration::hours(2));
    let new_token = login(&router).await;
    assert_ne!(old_token, new_token);

    for token in [&old_token, &new_token] {
        let response = router
            .clone()
            .oneshot(verify_request("/verify", Some(token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

// =============================================================================
// /logout, /callback, /health
// =============================================================================

#[tokio::test]
async fn test_logout_always_succeeds() {
    let (router, _) = router_with_clock(config());

    let response = router
        .oneshot(Request::builder().method("POST").uri("/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["message"], "Logged out successfully");
}

#[tokio::test]
async fn test_callback_echoes_escaped_code() {
    let (router, _) = router_with_clock(config());

    let response = router
        .oneshot(
            Request::builder()
                .uri("/callback?code=%3Cb%3Eabc%3C%2Fb%3E&state=xyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let body = body_string(response).await;
    assert!(body.contains("Authorization Code: &lt;b&gt;abc&lt;/b&gt;"));
    assert!(!body.contains("<b>"));
}

#[tokio::test]
async fn test_health() {
    let (router, _) = router_with_clock(config());

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "ok");
}
