// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential verification.
//!
//! Token issuance never looks credentials up itself; it asks a
//! [`CredentialVerifier`]. Two verifiers ship with the gateway:
//!
//! - [`StaticCredentials`]: a principal → secret table from configuration
//! - [`RemoteCredentialVerifier`]: the OAuth2 resource-owner password grant
//!   against the authority's token endpoint

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::introspection::MAX_RESPONSE_SIZE;
use crate::upstream::read_capped;

/// Path of the authority's token endpoint.
pub const TOKEN_PATH: &str = "/oauth2/token";

// =============================================================================
// CredentialError
// =============================================================================

/// Credential verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Unknown principal or wrong secret. Deliberately does not say which.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The credential backend could not answer.
    #[error("Credential backend unavailable: {message}")]
    Unavailable {
        /// Error detail, for logs only.
        message: String,
    },
}

// =============================================================================
// CredentialVerifier
// =============================================================================

/// Checks a credential proof for a principal.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns `Ok(())` if `proof` is the valid credential for `principal`.
    async fn verify(&self, principal: &str, proof: &str) -> Result<(), CredentialError>;
}

// =============================================================================
// StaticCredentials
// =============================================================================

/// In-memory principal → secret table.
///
/// Secrets are compared in constant time, and unknown principals still pay
/// for a comparison so lookups don't leak which usernames exist.
#[derive(Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a principal.
    pub fn with_user(mut self, principal: impl Into<String>, secret: impl Into<String>) -> Self {
        self.users.insert(principal.into(), secret.into());
        self
    }

    /// Returns the number of principals.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if no principals are configured.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl From<HashMap<String, String>> for StaticCredentials {
    fn from(users: HashMap<String, String>) -> Self {
        Self { users }
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("principals", &self.users.len())
            .finish()
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentials {
    async fn verify(&self, principal: &str, proof: &str) -> Result<(), CredentialError> {
        if principal.is_empty() || proof.is_empty() {
            return Err(CredentialError::InvalidCredentials);
        }

        let (stored, known) = match self.users.get(principal) {
            Some(secret) => (secret.as_bytes(), true),
            None => (proof.as_bytes(), false),
        };

        let matches: bool = stored.ct_eq(proof.as_bytes()).into();
        if matches && known {
            Ok(())
        } else {
            Err(CredentialError::InvalidCredentials)
        }
    }
}

// =============================================================================
// RemoteCredentialVerifier
// =============================================================================

#[derive(Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct TokenEndpointError {
    error: String,
}

/// Verifies credentials with the OAuth2 resource-owner password grant.
///
/// A granted access token means the credentials are good. The token itself is
/// discarded; the gateway signs its own.
#[derive(Clone)]
pub struct RemoteCredentialVerifier {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: Option<String>,
}

impl RemoteCredentialVerifier {
    /// Creates a verifier against `<base_url>/oauth2/token`.
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token_url: format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: None,
        }
    }

    /// Creates a verifier with its own HTTP client bounded by `timeout`.
    pub fn with_timeout(
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CredentialError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CredentialError::Unavailable {
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self::new(client, base_url, client_id, client_secret))
    }

    /// Requests the given scope with the grant.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Returns the token endpoint URL.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

impl fmt::Debug for RemoteCredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCredentialVerifier")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish()
    }
}

#[async_trait]
impl CredentialVerifier for RemoteCredentialVerifier {
    async fn verify(&self, principal: &str, proof: &str) -> Result<(), CredentialError> {
        if principal.is_empty() || proof.is_empty() {
            return Err(CredentialError::InvalidCredentials);
        }

        let mut form = vec![
            ("grant_type", "password"),
            ("username", principal),
            ("password", proof),
        ];
        if let Some(scope) = self.scope.as_deref() {
            form.push(("scope", scope));
        }

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| CredentialError::Unavailable {
                message: format!("network: {}", e),
            })?;

        let status = response.status();
        let body = read_capped(response, MAX_RESPONSE_SIZE)
            .await
            .map_err(|e| CredentialError::Unavailable {
                message: e.to_string(),
            })?;

        if status.is_success() {
            let parsed: TokenEndpointResponse =
                serde_json::from_slice(&body).map_err(|e| CredentialError::Unavailable {
                    message: format!("invalid token response: {}", e),
                })?;
            return match parsed.access_token {
                Some(token) if !token.is_empty() => Ok(()),
                _ => Err(CredentialError::Unavailable {
                    message: "token response has no access_token".to_string(),
                }),
            };
        }

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let reason = serde_json::from_slice::<TokenEndpointError>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| status.to_string());
            tracing::debug!(principal = %principal, reason = %reason, "Password grant refused");
            return Err(CredentialError::InvalidCredentials);
        }

        Err(CredentialError::Unavailable {
            message: format!("http: status {}", status),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
