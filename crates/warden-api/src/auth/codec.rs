// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Signing and verification of locally issued tokens.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, Header, Validation};
use thiserror::Error;

use super::{ClaimSet, Clock, KeyRing, SystemClock, TokenConfig};

/// Signing algorithm for local tokens.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

// =============================================================================
// TokenError
// =============================================================================

/// Failures of local token signing and verification.
///
/// Callers across the trust boundary must not distinguish `Malformed`,
/// `InvalidSignature` and `Expired`; they all surface as "invalid token".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token could not be decoded.
    #[error("Malformed token: {message}")]
    Malformed {
        /// What could not be decoded.
        message: String,
    },

    /// The signature does not match the payload.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// The token's expiry has passed.
    #[error("Token has expired")]
    Expired,

    /// No signing key is in effect yet.
    #[error("No signing key is in effect")]
    KeyUnavailable,

    /// Invalid token or key configuration.
    #[error("Invalid token configuration: {message}")]
    Configuration {
        /// Error message.
        message: String,
    },

    /// Encoding the token failed.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Error message.
        message: String,
    },
}

impl TokenError {
    fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a verification failure of a presented token.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            TokenError::Malformed { .. } | TokenError::InvalidSignature | TokenError::Expired
        )
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::malformed(err.to_string()),
        }
    }
}

// =============================================================================
// ClaimsCodec
// =============================================================================

/// Signs claim sets into compact HS256 tokens and verifies them back.
///
/// The key ring and clock are injected at construction; the codec holds no
/// mutable state and is shared across requests behind an `Arc`.
#[derive(Clone)]
pub struct ClaimsCodec {
    keys: Arc<KeyRing>,
    clock: Arc<dyn Clock>,
    validation: Arc<Validation>,
    leeway_secs: i64,
}

impl ClaimsCodec {
    /// Creates a codec over the given key ring using wall-clock time.
    pub fn new(keys: KeyRing) -> Self {
        Self::with_clock(keys, Arc::new(SystemClock))
    }

    /// Creates a codec over the given key ring and clock.
    pub fn with_clock(keys: KeyRing, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["sub", "iat", "exp"]);

        Self {
            keys: Arc::new(keys),
            clock,
            validation: Arc::new(validation),
            leeway_secs: 0,
        }
    }

    /// Creates a codec from configuration.
    pub fn from_config(config: &TokenConfig, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        config.validate()?;
        let keys = KeyRing::new(config.keys.clone())?;
        Ok(Self::with_clock(keys, clock).with_leeway(config.leeway_secs))
    }

    /// Sets the clock skew tolerance for the expiry check.
    pub fn with_leeway(mut self, secs: i64) -> Self {
        self.leeway_secs = secs.max(0);
        self
    }

    /// Returns the clock used for expiry checks.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Returns the key ring.
    pub fn keys(&self) -> &KeyRing {
        &self.keys
    }

    /// Signs a claim set with the key in effect now.
    pub fn sign(&self, claims: &ClaimSet) -> Result<String, TokenError> {
        let key = self.keys.signing_entry(self.clock.timestamp())?;

        let mut header = Header::new(ALGORITHM);
        header.kid = Some(key.id.clone());

        encode(&header, claims, &key.encoding).map_err(|e| TokenError::Encoding {
            message: e.to_string(),
        })
    }

    /// Verifies a token and returns its claim set.
    ///
    /// The MAC comparison is constant-time. Expiry is only checked once the
    /// signature holds, so an expired token with a bad signature reports
    /// `InvalidSignature`.
    pub fn verify(&self, token: &str) -> Result<ClaimSet, TokenError> {
        let header = decode_header(token)?;

        let kid = header
            .kid
            .ok_or_else(|| TokenError::malformed("missing key id"))?;
        let key = self
            .keys
            .verification_entry(&kid)
            .ok_or_else(|| TokenError::malformed(format!("unknown key id '{}'", kid)))?;

        let data = decode::<ClaimSet>(token, &key.decoding, &self.validation)?;
        let claims = data.claims;

        let now = self.clock.timestamp();
        if claims.is_expired_at(now.saturating_sub(self.leeway_secs)) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for ClaimsCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimsCodec")
            .field("algorithm", &ALGORITHM)
            .field("keys", &self.keys)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
