// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token introspection against a remote OAuth2 authority.
//!
//! The [`Introspector`] trait is the seam the authorization guard calls
//! through; [`IntrospectionClient`] is the HTTP implementation.

mod client;

pub use client::{IntrospectionClient, DEFAULT_TIMEOUT, INTROSPECT_PATH, MAX_RESPONSE_SIZE};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IntrospectionError
// =============================================================================

/// Introspection failures. Detail is for logs, never for clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntrospectionError {
    /// Transport failure, including timeout.
    #[error("Introspection endpoint unreachable: {message}")]
    UpstreamUnreachable {
        /// Error detail.
        message: String,
    },

    /// The authority answered with something that is not an introspection response.
    #[error("Malformed introspection response: {message}")]
    UpstreamMalformedResponse {
        /// Error detail.
        message: String,
    },
}

impl IntrospectionError {
    /// Creates an unreachable error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::UpstreamUnreachable {
            message: message.into(),
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::UpstreamMalformedResponse {
            message: message.into(),
        }
    }
}

// =============================================================================
// IntrospectionResult
// =============================================================================

#[derive(Deserialize)]
struct WireIntrospection {
    active: bool,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    sub: Option<String>,
}

impl From<WireIntrospection> for IntrospectionResult {
    fn from(wire: WireIntrospection) -> Self {
        Self {
            active: wire.active,
            scope: wire
                .scope
                .as_deref()
                .map(split_scope)
                .unwrap_or_default(),
            subject: wire.sub.filter(|s| !s.is_empty()),
        }
    }
}

/// What the authority reports about a token. Built fresh for every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireIntrospection")]
pub struct IntrospectionResult {
    /// Whether the token is currently active.
    pub active: bool,
    /// Granted scopes, in wire order.
    pub scope: Vec<String>,
    /// Subject the token was issued to, if reported.
    pub subject: Option<String>,
}

impl IntrospectionResult {
    /// An active result with the given space-delimited scope.
    pub fn active(scope: &str) -> Self {
        Self {
            active: true,
            scope: split_scope(scope),
            subject: None,
        }
    }

    /// An inactive result.
    pub fn inactive() -> Self {
        Self {
            active: false,
            scope: Vec::new(),
            subject: None,
        }
    }

    /// Sets the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Returns `true` if `required` is exactly one of the granted scopes.
    pub fn has_scope(&self, required: &str) -> bool {
        self.scope.iter().any(|s| s == required)
    }

    /// Returns the scopes joined by single spaces.
    pub fn scope_string(&self) -> String {
        self.scope.join(" ")
    }
}

fn split_scope(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(str::to_string).collect()
}

// =============================================================================
// Introspector
// =============================================================================

/// Asks an authority whether a token is active and what it may do.
#[async_trait]
pub trait Introspector: Send + Sync {
    /// Introspects `token` for `required_scope`.
    ///
    /// `token` may still carry a `Bearer ` prefix. Exactly one upstream call per
    /// invocation.
    async fn introspect(
        &self,
        token: &str,
        required_scope: &str,
    ) -> Result<IntrospectionResult, IntrospectionError>;
}

/// Strips a leading `Bearer` scheme (case-insensitive) from a credential.
///
/// A bare scheme with nothing after it yields an empty token.
pub fn strip_bearer(credential: &str) -> &str {
    let trimmed = credential.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim_start(),
        None if trimmed.eq_ignore_ascii_case("bearer") => "",
        _ => trimmed,
    }
}
