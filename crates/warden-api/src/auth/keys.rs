// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Signing key configuration and the key ring.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};

use super::TokenError;

/// Recommended minimum secret length in bytes for HS256.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Default token lifetime: 24 hours.
pub const DEFAULT_LIFETIME_SECS: i64 = 24 * 60 * 60;

// =============================================================================
// TokenConfig
// =============================================================================

/// Local token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Signing keys, any order. The newest key already in effect signs.
    pub keys: Vec<SigningKey>,
    /// Token lifetime in seconds.
    pub lifetime_secs: i64,
    /// Clock skew tolerance in seconds applied to the expiry check.
    pub leeway_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            keys: Vec::new(), // Must be set by user
            lifetime_secs: DEFAULT_LIFETIME_SECS,
            leeway_secs: 0,
        }
    }
}

impl TokenConfig {
    /// Creates a configuration with a single key in effect immediately.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            keys: vec![SigningKey::new("default", secret)],
            ..Default::default()
        }
    }

    /// Adds a key.
    pub fn with_key(mut self, key: SigningKey) -> Self {
        self.keys.push(key);
        self
    }

    /// Sets the token lifetime.
    pub fn with_lifetime_secs(mut self, secs: i64) -> Self {
        self.lifetime_secs = secs;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.lifetime_secs <= 0 {
            return Err(TokenError::Configuration {
                message: "token lifetime must be positive".to_string(),
            });
        }
        if self.leeway_secs < 0 {
            return Err(TokenError::Configuration {
                message: "leeway must not be negative".to_string(),
            });
        }
        KeyRing::new(self.keys.clone()).map(|_| ())
    }
}

// =============================================================================
// SigningKey
// =============================================================================

/// A symmetric signing key with the instant it takes effect.
#[derive(Clone, Serialize, Deserialize)]
pub struct SigningKey {
    /// Key identifier, written to the token's `kid` header.
    pub id: String,
    /// Shared secret.
    #[serde(skip_serializing, default)]
    pub secret: String,
    /// When the key starts signing. Absent means always.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
}

impl SigningKey {
    /// Creates a key in effect immediately.
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            valid_from: None,
        }
    }

    /// Sets the instant the key starts signing.
    pub fn valid_from(mut self, at: DateTime<Utc>) -> Self {
        self.valid_from = Some(at);
        self
    }

    fn effective_from(&self) -> i64 {
        self.valid_from.map(|t| t.timestamp()).unwrap_or(i64::MIN)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .field("valid_from", &self.valid_from)
            .finish()
    }
}

// =============================================================================
// KeyRing
// =============================================================================

pub(crate) struct RingEntry {
    pub(crate) id: String,
    pub(crate) effective_from: i64,
    pub(crate) encoding: EncodingKey,
    pub(crate) decoding: DecodingKey,
}

/// Ordered set of signing keys.
///
/// Every key verifies tokens carrying its id. Only the newest key whose
/// `valid_from` has passed signs new tokens.
pub struct KeyRing {
    // Sorted by effective_from, oldest first.
    entries: Vec<RingEntry>,
}

impl KeyRing {
    /// Builds a key ring, rejecting empty rings, blank secrets and duplicate ids.
    pub fn new(keys: Vec<SigningKey>) -> Result<Self, TokenError> {
        if keys.is_empty() {
            return Err(TokenError::Configuration {
                message: "no signing keys configured".to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(keys.len());

        for key in keys {
            if key.id.trim().is_empty() {
                return Err(TokenError::Configuration {
                    message: "signing key id must not be empty".to_string(),
                });
            }
            if key.secret.is_empty() {
                return Err(TokenError::Configuration {
                    message: format!("signing key '{}' has an empty secret", key.id),
                });
            }
            if !seen.insert(key.id.clone()) {
                return Err(TokenError::Configuration {
                    message: format!("duplicate signing key id '{}'", key.id),
                });
            }
            if key.secret.len() < RECOMMENDED_SECRET_LEN {
                tracing::warn!(
                    key_id = %key.id,
                    "Signing secret is shorter than recommended ({} bytes)",
                    RECOMMENDED_SECRET_LEN
                );
            }

            entries.push(RingEntry {
                effective_from: key.effective_from(),
                encoding: EncodingKey::from_secret(key.secret.as_bytes()),
                decoding: DecodingKey::from_secret(key.secret.as_bytes()),
                id: key.id,
            });
        }

        entries.sort_by_key(|e| e.effective_from);

        Ok(Self { entries })
    }

    /// Returns the key that signs at `now`.
    pub(crate) fn signing_entry(&self, now: i64) -> Result<&RingEntry, TokenError> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.effective_from <= now)
            .ok_or(TokenError::KeyUnavailable)
    }

    /// Returns the key with the given id.
    pub(crate) fn verification_entry(&self, id: &str) -> Option<&RingEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Returns the id of the key that signs at `now`.
    pub fn active_key_id(&self, now: i64) -> Option<&str> {
        self.signing_entry(now).ok().map(|e| e.id.as_str())
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the ring holds no keys. Never true for a built ring.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRing")
            .field("key_ids", &self.entries.iter().map(|e| &e.id).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET_A: &str = "first-secret-key-that-is-long-enough-for-hs256";
    const SECRET_B: &str = "second-secret-key-that-is-long-enough-for-hs256";

    #[test]
    fn test_empty_ring_rejected() {
        assert!(KeyRing::new(vec![]).is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = KeyRing::new(vec![
            SigningKey::new("k1", SECRET_A),
            SigningKey::new("k1", SECRET_B),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_secret_rejected() {
        assert!(KeyRing::new(vec![SigningKey::new("k1", "")]).is_err());
    }

    #[test]
    fn test_newest_effective_key_signs() {
        let rotate_at = DateTime::from_timestamp(2_000, 0).unwrap();
        let ring = KeyRing::new(vec![
            SigningKey::new("new", SECRET_B).valid_from(rotate_at),
            SigningKey::new("old", SECRET_A),
        ])
        .unwrap();

        assert_eq!(ring.active_key_id(1_999), Some("old"));
        assert_eq!(ring.active_key_id(2_000), Some("new"));
        assert!(ring.verification_entry("old").is_some());
        assert!(ring.verification_entry("missing").is_none());
    }

    #[test]
    fn test_no_key_in_effect() {
        let later = DateTime::from_timestamp(5_000, 0).unwrap();
        let ring = KeyRing::new(vec![SigningKey::new("future", SECRET_A).valid_from(later)]).unwrap();
        assert!(ring.signing_entry(10).is_err());
    }

    #[test]
    fn test_config_validation() {
        assert!(TokenConfig::default().validate().is_err());
        assert!(TokenConfig::new(SECRET_A).validate().is_ok());
        assert!(TokenConfig::new(SECRET_A).with_lifetime_secs(0).validate().is_err());
    }

    #[test]
    fn test_secret_not_serialized() {
        let json = serde_json::to_string(&SigningKey::new("k1", SECRET_A)).unwrap();
        assert!(!json.contains(SECRET_A));
        assert!(!format!("{:?}", SigningKey::new("k1", SECRET_A)).contains(SECRET_A));
    }
}
