// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Gateway state shared across handlers.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::auth::{
    ClaimsCodec, Clock, CredentialVerifier, IssueError, IssuedToken, RemoteCredentialVerifier,
    StaticCredentials, SystemClock, TokenIssuer,
};
use crate::config::{CredentialsConfig, GatewayConfig};
use crate::error::{ApiError, ApiResult};
use crate::guard::{bearer_token, AuthorizationDecision, AuthorizationGuard, DecisionReason};
use crate::introspection::{IntrospectionClient, Introspector};
use crate::middleware::ScopeLayer;
use crate::verifier::{TokenVerifier, Verification, VerifyError};

// =============================================================================
// AuthGateway
// =============================================================================

/// The gateway: issuance, verification and authorization wired together.
///
/// Passed to every handler through axum's state extraction. All parts are
/// immutable after construction.
#[derive(Clone)]
pub struct AuthGateway {
    /// Gateway configuration.
    pub config: Arc<GatewayConfig>,
    issuer: Arc<TokenIssuer>,
    verifier: Arc<TokenVerifier>,
    guard: Option<AuthorizationGuard>,
}

impl AuthGateway {
    /// Creates a new gateway builder.
    pub fn builder() -> AuthGatewayBuilder {
        AuthGatewayBuilder::new()
    }

    /// Issues a token to `principal` if `proof` checks out.
    pub async fn issue(&self, principal: &str, proof: &str) -> Result<IssuedToken, IssueError> {
        self.issuer.issue(principal, proof).await
    }

    /// Verifies a raw `Authorization` value, local or introspected.
    pub async fn verify(
        &self,
        credential: Option<&str>,
        scope: Option<&str>,
    ) -> Result<Verification, VerifyError> {
        self.verifier.verify(credential, scope).await
    }

    /// Runs the authorization check. Without an authority every request that
    /// carries a token is denied with `UpstreamError`.
    pub async fn check(&self, headers: &HeaderMap, required_scope: &str) -> AuthorizationDecision {
        match &self.guard {
            Some(guard) => guard.check(headers, required_scope).await,
            None if bearer_token(headers).is_none() => {
                AuthorizationDecision::deny(DecisionReason::MissingToken)
            }
            None => {
                tracing::error!("Authorization check requested but no authority is configured");
                AuthorizationDecision::deny(DecisionReason::UpstreamError)
            }
        }
    }

    /// Returns the token issuer.
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Returns the authorization guard, if an authority is configured.
    pub fn guard(&self) -> Option<&AuthorizationGuard> {
        self.guard.as_ref()
    }

    /// Returns a layer that gates routes on `required_scope`, if an authority
    /// is configured.
    pub fn require_scope(&self, required_scope: impl Into<String>) -> Option<ScopeLayer> {
        self.guard
            .as_ref()
            .map(|guard| ScopeLayer::new(guard.clone(), required_scope))
    }
}

// =============================================================================
// AuthGatewayBuilder
// =============================================================================

/// Builder for constructing an [`AuthGateway`].
///
/// Parts not supplied explicitly are built from the configuration.
pub struct AuthGatewayBuilder {
    config: Option<GatewayConfig>,
    clock: Option<Arc<dyn Clock>>,
    credentials: Option<Arc<dyn CredentialVerifier>>,
    introspector: Option<Arc<dyn Introspector>>,
}

impl AuthGatewayBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            clock: None,
            credentials: None,
            introspector: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the clock used for issuance and expiry.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the credential verifier.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialVerifier>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the introspector. Enables the authorization guard even without an
    /// authority in the configuration.
    pub fn introspector(mut self, introspector: Arc<dyn Introspector>) -> Self {
        self.introspector = Some(introspector);
        self
    }

    /// Builds the gateway.
    pub fn build(self) -> ApiResult<AuthGateway> {
        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| ApiError::internal(e.to_string()))?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let codec = ClaimsCodec::from_config(&config.token, clock)
            .map_err(|e| ApiError::internal(format!("invalid token configuration: {}", e)))?;

        let credentials = match self.credentials {
            Some(credentials) => credentials,
            None => credentials_from_config(&config)?,
        };

        let introspector = match self.introspector {
            Some(introspector) => Some(introspector),
            None => match &config.authority {
                Some(authority) => {
                    let client = IntrospectionClient::new(&authority.admin_url, authority.timeout)
                        .map_err(|e| ApiError::internal(e.to_string()))?;
                    tracing::info!(endpoint = %client.endpoint(), "Token introspection enabled");
                    Some(Arc::new(client) as Arc<dyn Introspector>)
                }
                None => None,
            },
        };
        let guard = introspector.map(AuthorizationGuard::new);

        let mut verifier = TokenVerifier::local(codec.clone());
        if let Some(guard) = &guard {
            verifier = verifier.with_introspection(guard.clone());
        }
        if let Some(authority) = &config.authority {
            verifier = verifier.with_default_scope(authority.verify_scope.clone());
        }

        let issuer = TokenIssuer::new(codec, credentials).with_lifetime_secs(config.token.lifetime_secs);

        Ok(AuthGateway {
            config: Arc::new(config),
            issuer: Arc::new(issuer),
            verifier: Arc::new(verifier),
            guard,
        })
    }
}

impl Default for AuthGatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn credentials_from_config(config: &GatewayConfig) -> ApiResult<Arc<dyn CredentialVerifier>> {
    match &config.credentials {
        CredentialsConfig::Static { users } => {
            if users.is_empty() {
                tracing::warn!("No static credentials configured; every login will fail");
            }
            Ok(Arc::new(StaticCredentials::from(users.clone())))
        }
        CredentialsConfig::Remote { scope } => {
            let authority = config
                .authority
                .as_ref()
                .ok_or_else(|| ApiError::internal("remote credentials require an authority"))?;
            let public_url = authority
                .public_url
                .as_deref()
                .ok_or_else(|| ApiError::internal("remote credentials require authority.public_url"))?;

            let mut verifier = RemoteCredentialVerifier::with_timeout(
                public_url,
                authority.client_id.clone(),
                authority.client_secret.clone(),
                authority.timeout,
            )
            .map_err(|e| ApiError::internal(e.to_string()))?;
            if let Some(scope) = scope {
                verifier = verifier.with_scope(scope.clone());
            }
            Ok(Arc::new(verifier))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use axum::http::header;

    use super::*;
    use crate::auth::TokenConfig;
    use crate::config::AuthorityConfig;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-testing";

    fn config() -> GatewayConfig {
        GatewayConfig::default()
            .with_token(TokenConfig::new(SECRET))
            .with_credentials(CredentialsConfig::single_user("username", "password123"))
    }

    #[test]
    fn test_builder_requires_signing_key() {
        assert!(AuthGateway::builder().build().is_err());
    }

    #[test]
    fn test_builder_without_authority() {
        let gateway = AuthGateway::builder().config(config()).build().unwrap();
        assert!(gateway.guard().is_none());
        assert_eq!(gateway.issuer().lifetime_secs(), 86_400);
    }

    #[test]
    fn test_builder_with_authority() {
        let config = config().with_authority(AuthorityConfig::new("http://127.0.0.1:4445"));
        let gateway = AuthGateway::builder().config(config).build().unwrap();
        assert!(gateway.guard().is_some());
        assert!(gateway.require_scope("admin").is_some());
    }

    #[tokio::test]
    async fn test_issue_then_verify() {
        let gateway = AuthGateway::builder().config(config()).build().unwrap();

        let issued = gateway.issue("username", "password123").await.unwrap();
        let verification = gateway.verify(Some(&issued.token), None).await.unwrap();
        assert_eq!(verification.subject(), Some("username"));
    }

    #[tokio::test]
    async fn test_check_without_authority() {
        let gateway = AuthGateway::builder().config(config()).build().unwrap();
        let decision = gateway.check(&HeaderMap::new(), "read").await;
        assert_eq!(decision.reason, DecisionReason::MissingToken);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        let decision = gateway.check(&headers, "read").await;
        assert_eq!(decision.reason, DecisionReason::UpstreamError);

        // An empty bearer credential is no token, with or without an authority.
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer".parse().unwrap());
        let decision = gateway.check(&headers, "read").await;
        assert_eq!(decision.reason, DecisionReason::MissingToken);

        headers.insert(header::AUTHORIZATION, "".parse().unwrap());
        let decision = gateway.check(&headers, "read").await;
        assert_eq!(decision.reason, DecisionReason::MissingToken);
    }
}
