// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Gateway Integration Tests
//!
//! - `test_flow_*`: issuance and verification across the router
//! - `test_check_*`: the authorization guard through the gateway
//! - `test_verify_*`: `/verify` with introspected tokens
//! - `test_scope_layer_*`: application routes gated by scope

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    routing::get,
    Router,
};
use chrono::Duration;
use tower::ServiceExt;
use warden_api::{
    AuthorityConfig, DecisionReason, IntrospectionError, IntrospectionResult, Verification,
};
use warden_tests::prelude::*;

// =============================================================================
// End-to-end flow
// =============================================================================

#[tokio::test]
async fn test_flow_login_verify_expire() {
    init_test_logging();
    let fixture = GatewayFixture::local();
    let router = fixture.router();

    let response = router
        .clone()
        .oneshot(login_request(TEST_USER, TEST_PASSWORD))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["token"].as_str().unwrap().to_string();

    let response = router
        .clone()
        .oneshot(get_request("/verify", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Token is valid");

    // Still valid one second before expiry.
    fixture.clock.advance(Duration::hours(24) - Duration::seconds(1));
    let response = router
        .clone()
        .oneshot(get_request("/verify", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    fixture.clock.advance(Duration::seconds(2));
    let response = router
        .oneshot(get_request("/verify", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["message"], "Invalid token");
}

#[tokio::test]
async fn test_flow_tampered_token_rejected() {
    let fixture = GatewayFixture::local();
    let token = fixture.token().await;

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let tampered_sig = if parts[2].starts_with('A') { "B" } else { "A" };
    parts[2].replace_range(0..1, tampered_sig);
    let tampered = parts.join(".");

    let response = fixture
        .router()
        .oneshot(get_request("/verify", Some(&tampered)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_flow_local_tokens_never_introspected() {
    let stub = StubIntrospector::active("read");
    let fixture = GatewayFixture::with_introspector(stub.clone());
    let token = fixture.token().await;

    let verification = fixture.gateway.verify(Some(&format!("Bearer {}", token)), None).await.unwrap();
    assert!(matches!(verification, Verification::Local(_)));
    assert_eq!(verification.subject(), Some(TEST_USER));
    assert_eq!(stub.calls(), 0);
}

// =============================================================================
// AuthorizationGuard through the gateway
// =============================================================================

#[tokio::test]
async fn test_check_insufficient_scope() {
    let stub = StubIntrospector::active("read");
    let fixture = GatewayFixture::with_introspector(stub.clone());

    let decision = fixture.gateway.check(&bearer_headers("abc"), "admin").await;
    assert!(!decision.allowed);
    assert_eq!(decision.reason, DecisionReason::InsufficientScope);
    assert_eq!(stub.last_request(), Some(("abc".to_string(), "admin".to_string())));
}

#[tokio::test]
async fn test_check_allows_matching_scope() {
    let stub = StubIntrospector::new(Ok(IntrospectionResult::active("read write").with_subject("svc")));
    let fixture = GatewayFixture::with_introspector(stub);

    let decision = fixture.gateway.check(&bearer_headers("abc"), "write").await;
    assert!(decision.allowed);
    assert_eq!(decision.reason, DecisionReason::Ok);
    assert_eq!(decision.introspection.unwrap().subject.as_deref(), Some("svc"));
}

#[tokio::test]
async fn test_check_scope_is_not_substring_match() {
    let fixture = GatewayFixture::with_introspector(StubIntrospector::active("readwrite"));

    let decision = fixture.gateway.check(&bearer_headers("abc"), "read").await;
    assert_eq!(decision.reason, DecisionReason::InsufficientScope);
}

#[tokio::test]
async fn test_check_missing_token_skips_authority() {
    let stub = StubIntrospector::active("read");
    let fixture = GatewayFixture::with_introspector(stub.clone());

    let decision = fixture.gateway.check(&Default::default(), "read").await;
    assert_eq!(decision.reason, DecisionReason::MissingToken);
    assert_eq!(fixture.introspection_calls(), 0);
}

#[tokio::test]
async fn test_check_empty_bearer_is_missing_token() {
    let stub = StubIntrospector::active("admin");
    let fixture = GatewayFixture::with_introspector(stub.clone());

    let decision = fixture.gateway.check(&bearer_headers(""), "admin").await;
    assert!(!decision.allowed);
    assert_eq!(decision.reason, DecisionReason::MissingToken);

    let response = fixture
        .router()
        .oneshot(get_request("/verify", Some("")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["message"], "Missing token");

    let response = protected_app(&fixture, "admin")
        .oneshot(get_request("/whoami", Some("")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(stub.calls(), 0);
    assert_eq!(stub.last_request(), None);
}

#[tokio::test]
async fn test_check_inactive_and_upstream_failures() {
    let stub = StubIntrospector::inactive();
    let fixture = GatewayFixture::with_introspector(stub.clone());

    let decision = fixture.gateway.check(&bearer_headers("abc"), "read").await;
    assert_eq!(decision.reason, DecisionReason::InvalidToken);

    stub.respond_with(Err(IntrospectionError::malformed("not json")));
    let decision = fixture.gateway.check(&bearer_headers("abc"), "read").await;
    assert_eq!(decision.reason, DecisionReason::UpstreamError);

    assert_eq!(stub.calls(), 2);
}

// =============================================================================
// /verify with introspected tokens
// =============================================================================

#[tokio::test]
async fn test_verify_opaque_token_statuses() {
    let stub = StubIntrospector::active("read");
    let fixture = GatewayFixture::with_introspector(stub.clone());
    let router = fixture.router();

    let response = router
        .clone()
        .oneshot(get_request("/verify?scope=read", Some("opaque-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(get_request("/verify?scope=admin", Some("opaque-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"]["message"], "Insufficient scope");

    stub.respond_with(Ok(IntrospectionResult::inactive()));
    let response = router
        .clone()
        .oneshot(get_request("/verify", Some("opaque-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    stub.respond_with(Err(IntrospectionError::unreachable("connection refused to 10.0.0.9")));
    let response = router
        .oneshot(get_request("/verify", Some("opaque-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_string(response).await;
    assert!(!body.contains("10.0.0.9"));

    assert_eq!(stub.calls(), 4);
}

#[tokio::test]
async fn test_verify_uses_configured_default_scope() {
    let stub = StubIntrospector::active("read");
    let config = GatewayFixture::config().with_authority({
        let mut authority = AuthorityConfig::new("http://127.0.0.1:4445");
        authority.verify_scope = "profile".to_string();
        authority
    });
    let fixture = GatewayFixture::build(config, Some(stub.clone()));

    let response = fixture
        .router()
        .oneshot(get_request("/verify", Some("opaque-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(stub.last_request().unwrap().1, "profile");
}

#[tokio::test]
async fn test_verify_without_authority_treats_opaque_as_invalid() {
    let fixture = GatewayFixture::local();

    let response = fixture
        .router()
        .oneshot(get_request("/verify", Some("opaque-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// ScopeLayer on application routes
// =============================================================================

async fn whoami(Extension(result): Extension<IntrospectionResult>) -> String {
    result.subject.unwrap_or_default()
}

fn protected_app(fixture: &GatewayFixture, scope: &str) -> Router {
    let layer = fixture
        .gateway
        .require_scope(scope)
        .expect("authority configured");
    Router::new()
        .route("/whoami", get(whoami))
        .route_layer(layer)
        .merge(fixture.router())
}

#[tokio::test]
async fn test_scope_layer_gates_application_route() {
    let stub = StubIntrospector::new(Ok(IntrospectionResult::active("orders:write").with_subject("alice")));
    let fixture = GatewayFixture::with_introspector(stub.clone());
    let app = protected_app(&fixture, "orders:write");

    let response = app
        .clone()
        .oneshot(get_request("/whoami", Some("opaque-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "alice");

    let response = app.clone().oneshot(get_request("/whoami", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(stub.calls(), 1);

    stub.respond_with(Ok(IntrospectionResult::active("orders:read")));
    let response = app
        .clone()
        .oneshot(get_request("/whoami", Some("opaque-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Gateway routes merged alongside stay ungated.
    let response = app
        .oneshot(
            axum::http::Request::builder()
                .uri("/health")
                .header(header::ACCEPT, "application/json")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_scope_layer_unavailable_without_authority() {
    let fixture = GatewayFixture::local();
    assert!(fixture.gateway.require_scope("read").is_none());
}
