// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Gateways wired to a [`ManualClock`] and helpers for driving the router.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Request},
    response::Response,
    Router,
};
use chrono::DateTime;
use http_body_util::BodyExt;
use warden_api::{
    AuthGateway, CredentialsConfig, GatewayConfig, GatewayServer, Introspector, ManualClock,
    TokenConfig,
};

use super::mocks::StubIntrospector;

/// Signing secret used by every fixture gateway.
pub const TEST_SECRET: &str = "integration-test-secret-that-is-long-enough";
/// The fixture clock's starting instant (Unix seconds).
pub const START: i64 = 1_700_000_000;
/// The one principal the fixture accepts.
pub const TEST_USER: &str = "username";
/// Its password.
pub const TEST_PASSWORD: &str = "password123";

// =============================================================================
// GatewayFixture
// =============================================================================

/// A gateway, its clock and (optionally) its stub authority.
pub struct GatewayFixture {
    /// The gateway under test.
    pub gateway: AuthGateway,
    /// Controls issuance time and expiry.
    pub clock: ManualClock,
    /// The stub authority, when one is wired in.
    pub introspector: Option<Arc<StubIntrospector>>,
}

impl GatewayFixture {
    /// The default configuration: one user, one signing key, no authority.
    pub fn config() -> GatewayConfig {
        GatewayConfig::default()
            .with_token(TokenConfig::new(TEST_SECRET))
            .with_credentials(CredentialsConfig::single_user(TEST_USER, TEST_PASSWORD))
    }

    /// A gateway that only verifies locally issued tokens.
    pub fn local() -> Self {
        Self::build(Self::config(), None)
    }

    /// A gateway that introspects opaque tokens through `stub`.
    pub fn with_introspector(stub: Arc<StubIntrospector>) -> Self {
        Self::build(Self::config(), Some(stub))
    }

    /// A gateway over an explicit configuration.
    pub fn build(config: GatewayConfig, stub: Option<Arc<StubIntrospector>>) -> Self {
        let clock = ManualClock::new(DateTime::from_timestamp(START, 0).expect("valid start"));
        let mut builder = AuthGateway::builder()
            .config(config)
            .clock(Arc::new(clock.clone()));
        if let Some(stub) = &stub {
            builder = builder.introspector(stub.clone() as Arc<dyn Introspector>);
        }

        Self {
            gateway: builder.build().expect("fixture gateway builds"),
            clock,
            introspector: stub,
        }
    }

    /// The gateway's router.
    pub fn router(&self) -> Router {
        GatewayServer::new(self.gateway.clone()).router()
    }

    /// Issues a token for the fixture user.
    pub async fn token(&self) -> String {
        self.gateway
            .issue(TEST_USER, TEST_PASSWORD)
            .await
            .expect("fixture credentials are valid")
            .token
    }

    /// Introspection calls made so far, zero without a stub.
    pub fn introspection_calls(&self) -> u64 {
        self.introspector.as_ref().map(|s| s.calls()).unwrap_or(0)
    }
}

// =============================================================================
// Request helpers
// =============================================================================

/// Headers carrying `Authorization: Bearer <token>`.
pub fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&format!("Bearer {}", token)).expect("valid header");
    headers.insert(header::AUTHORIZATION, value);
    headers
}

/// A form-encoded `POST /login`.
pub fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={}&password={}", username, password)))
        .expect("valid request")
}

/// A `GET` to `uri` with an optional bearer token.
pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("valid request")
}

/// Collects a response body as a string.
pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// Collects a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).expect("json body")
}
