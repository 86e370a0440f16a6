// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token issuance.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::{ClaimSet, ClaimsCodec, CredentialError, CredentialVerifier, TokenError, DEFAULT_LIFETIME_SECS};

/// Token issuance failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueError {
    /// The credential proof did not match.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The credential backend could not be reached.
    #[error("Credential backend unavailable: {message}")]
    Upstream {
        /// Error detail, for logs only.
        message: String,
    },

    /// Signing failed.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<CredentialError> for IssueError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidCredentials => IssueError::InvalidCredentials,
            CredentialError::Unavailable { message } => IssueError::Upstream { message },
        }
    }
}

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWS.
    pub token: String,
    /// Signed claims.
    pub claims: ClaimSet,
}

impl IssuedToken {
    /// Returns the token lifetime in seconds.
    pub fn expires_in(&self) -> i64 {
        self.claims.lifetime_secs()
    }
}

/// Issues signed tokens to principals that prove their credentials.
#[derive(Clone)]
pub struct TokenIssuer {
    codec: ClaimsCodec,
    credentials: Arc<dyn CredentialVerifier>,
    lifetime_secs: i64,
}

impl TokenIssuer {
    /// Creates an issuer with the default 24 hour lifetime.
    pub fn new(codec: ClaimsCodec, credentials: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            codec,
            credentials,
            lifetime_secs: DEFAULT_LIFETIME_SECS,
        }
    }

    /// Sets the token lifetime.
    pub fn with_lifetime_secs(mut self, secs: i64) -> Self {
        self.lifetime_secs = secs;
        self
    }

    /// Returns the token lifetime in seconds.
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Returns the codec used for signing.
    pub fn codec(&self) -> &ClaimsCodec {
        &self.codec
    }

    /// Verifies `proof` for `principal` and signs a claim set issued now.
    pub async fn issue(&self, principal: &str, proof: &str) -> Result<IssuedToken, IssueError> {
        self.credentials.verify(principal, proof).await?;

        let now = self.codec.clock().timestamp();
        let claims = ClaimSet::issue(principal, now, self.lifetime_secs)?;
        let token = self.codec.sign(&claims)?;

        tracing::info!(subject = %principal, expires_at = claims.expires_at(), "Token issued");

        Ok(IssuedToken { token, claims })
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("codec", &self.codec)
            .field("lifetime_secs", &self.lifetime_secs)
            .finish()
    }
}
