// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Scope-based authorization.
//!
//! [`AuthorizationGuard::check`] turns inbound headers and a required scope
//! into an [`AuthorizationDecision`]. Steps run in a fixed order and the first
//! failure wins:
//!
//! 1. no `Authorization` credential → [`DecisionReason::MissingToken`]
//! 2. introspection fails → [`DecisionReason::UpstreamError`]
//! 3. token inactive → [`DecisionReason::InvalidToken`]
//! 4. scope not granted → [`DecisionReason::InsufficientScope`]
//! 5. otherwise → [`DecisionReason::Ok`]
//!
//! The introspector is only called once step 1 passes.

use std::fmt;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use serde::Serialize;

use crate::introspection::{strip_bearer, IntrospectionResult, Introspector};

/// Returns `true` if `required` is one of the whitespace-delimited scopes in
/// `token_scope`. Matching is exact: `"wri"` does not match `"write"`.
pub fn has_scope(token_scope: &str, required: &str) -> bool {
    token_scope.split_whitespace().any(|s| s == required)
}

// =============================================================================
// AuthorizationDecision
// =============================================================================

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// Allowed.
    Ok,
    /// No credential was presented.
    MissingToken,
    /// The authority reports the token inactive.
    InvalidToken,
    /// The token lacks the required scope.
    InsufficientScope,
    /// The authority could not be asked.
    UpstreamError,
}

impl DecisionReason {
    /// Returns the client-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            DecisionReason::Ok => "OK",
            DecisionReason::MissingToken => "Missing token",
            DecisionReason::InvalidToken => "Invalid token",
            DecisionReason::InsufficientScope => "Insufficient scope",
            DecisionReason::UpstreamError => "Upstream error",
        }
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Reason for the decision.
    pub reason: DecisionReason,
    /// The introspection result, present when the authority answered.
    pub introspection: Option<IntrospectionResult>,
}

impl AuthorizationDecision {
    /// An allow decision.
    pub fn allow(introspection: IntrospectionResult) -> Self {
        Self {
            allowed: true,
            reason: DecisionReason::Ok,
            introspection: Some(introspection),
        }
    }

    /// A deny decision.
    pub fn deny(reason: DecisionReason) -> Self {
        Self {
            allowed: false,
            reason,
            introspection: None,
        }
    }

    fn deny_with(reason: DecisionReason, introspection: IntrospectionResult) -> Self {
        Self {
            allowed: false,
            reason,
            introspection: Some(introspection),
        }
    }
}

// =============================================================================
// AuthorizationGuard
// =============================================================================

/// Gates requests on token activity and scope reported by an introspector.
#[derive(Clone)]
pub struct AuthorizationGuard {
    introspector: Arc<dyn Introspector>,
}

impl AuthorizationGuard {
    /// Creates a guard over the given introspector.
    pub fn new(introspector: Arc<dyn Introspector>) -> Self {
        Self { introspector }
    }

    /// Checks the `Authorization` header against `required_scope`.
    ///
    /// An empty `required_scope` only requires an active token.
    pub async fn check(&self, headers: &HeaderMap, required_scope: &str) -> AuthorizationDecision {
        let credential = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        self.check_credential(credential, required_scope).await
    }

    /// Checks a raw `Authorization` value against `required_scope`.
    pub async fn check_credential(
        &self,
        credential: Option<&str>,
        required_scope: &str,
    ) -> AuthorizationDecision {
        let token = match presented_token(credential) {
            Some(token) => token,
            None => {
                tracing::debug!("No authorization token provided");
                return AuthorizationDecision::deny(DecisionReason::MissingToken);
            }
        };

        let result = match self.introspector.introspect(token, required_scope).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Token introspection failed");
                return AuthorizationDecision::deny(DecisionReason::UpstreamError);
            }
        };

        if !result.active {
            tracing::debug!("Introspected token is inactive");
            return AuthorizationDecision::deny_with(DecisionReason::InvalidToken, result);
        }

        if !required_scope.is_empty() && !result.has_scope(required_scope) {
            tracing::debug!(
                required_scope = %required_scope,
                granted = %result.scope_string(),
                "Insufficient scope"
            );
            return AuthorizationDecision::deny_with(DecisionReason::InsufficientScope, result);
        }

        AuthorizationDecision::allow(result)
    }
}

/// Returns the bearer token in `headers`, or `None` if there is none to check.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    presented_token(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok()),
    )
}

pub(crate) fn presented_token(credential: Option<&str>) -> Option<&str> {
    credential.map(strip_bearer).filter(|token| !token.is_empty())
}

impl fmt::Debug for AuthorizationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationGuard").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
