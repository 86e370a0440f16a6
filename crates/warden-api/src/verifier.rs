// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token verification across both trust sources.
//!
//! A compact JWS (three non-empty dot-separated segments) was signed here and
//! is checked by the local [`ClaimsCodec`]. Any other token is opaque and goes
//! to the authority through the [`AuthorizationGuard`], when one is configured.

use std::fmt;

use thiserror::Error;

use crate::auth::{ClaimSet, ClaimsCodec, TokenError};
use crate::guard::{presented_token, AuthorizationGuard, DecisionReason};
use crate::introspection::IntrospectionResult;

/// Returns `true` if `token` has the shape of a compact JWS.
pub fn is_compact_jws(token: &str) -> bool {
    let mut segments = 0;
    for part in token.split('.') {
        if part.is_empty() {
            return false;
        }
        segments += 1;
    }
    segments == 3
}

// =============================================================================
// Verification
// =============================================================================

/// A successfully verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Signed here; carries no scope.
    Local(ClaimSet),
    /// Vouched for by the authority.
    Introspected(IntrospectionResult),
}

impl Verification {
    /// Returns the token subject, if known.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Verification::Local(claims) => Some(claims.subject()),
            Verification::Introspected(result) => result.subject.as_deref(),
        }
    }
}

/// Why verification failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The local codec rejected the token.
    #[error("Invalid token: {0}")]
    Local(#[source] TokenError),

    /// The authorization guard denied the token.
    #[error("{0}")]
    Denied(DecisionReason),
}

impl VerifyError {
    /// Returns the decision reason this failure surfaces as.
    pub fn reason(&self) -> DecisionReason {
        match self {
            VerifyError::Local(_) => DecisionReason::InvalidToken,
            VerifyError::Denied(reason) => *reason,
        }
    }
}

// =============================================================================
// TokenVerifier
// =============================================================================

/// Routes each token to the verifier its shape calls for.
#[derive(Clone)]
pub struct TokenVerifier {
    local: ClaimsCodec,
    remote: Option<AuthorizationGuard>,
    default_scope: String,
}

impl TokenVerifier {
    /// Creates a verifier that only accepts locally signed tokens.
    pub fn local(codec: ClaimsCodec) -> Self {
        Self {
            local: codec,
            remote: None,
            default_scope: String::new(),
        }
    }

    /// Adds introspection for opaque tokens.
    pub fn with_introspection(mut self, guard: AuthorizationGuard) -> Self {
        self.remote = Some(guard);
        self
    }

    /// Sets the scope required of introspected tokens when the caller asks for none.
    pub fn with_default_scope(mut self, scope: impl Into<String>) -> Self {
        self.default_scope = scope.into();
        self
    }

    /// Returns `true` if opaque tokens are introspected.
    pub fn has_introspection(&self) -> bool {
        self.remote.is_some()
    }

    /// Verifies a raw `Authorization` value.
    ///
    /// `scope` is the caller's scope requirement. Local tokens carry no scope,
    /// so any explicit requirement denies them with `InsufficientScope`.
    pub async fn verify(
        &self,
        credential: Option<&str>,
        scope: Option<&str>,
    ) -> Result<Verification, VerifyError> {
        let Some(token) = presented_token(credential) else {
            return Err(VerifyError::Denied(DecisionReason::MissingToken));
        };
        let scope = scope.filter(|s| !s.is_empty());

        match &self.remote {
            Some(guard) if !is_compact_jws(token) => {
                let required = scope.unwrap_or(&self.default_scope);
                let decision = guard.check_credential(Some(token), required).await;
                match decision.introspection {
                    Some(result) if decision.allowed => Ok(Verification::Introspected(result)),
                    _ => Err(VerifyError::Denied(decision.reason)),
                }
            }
            _ => {
                let claims = self.local.verify(token).map_err(|e| {
                    tracing::debug!(error = %e, "Local token rejected");
                    VerifyError::Local(e)
                })?;
                if scope.is_some() {
                    return Err(VerifyError::Denied(DecisionReason::InsufficientScope));
                }
                Ok(Verification::Local(claims))
            }
        }
    }
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("local", &self.local)
            .field("introspection", &self.remote.is_some())
            .field("default_scope", &self.default_scope)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
