// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token claim set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TokenError;

/// The claims embedded in a locally signed token.
///
/// A claim set always expires strictly after it was issued. Fields are private
/// so the invariant survives construction; deserialization goes through the
/// same check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClaims")]
pub struct ClaimSet {
    /// Subject: the principal the token was issued to.
    sub: String,
    /// Issued at (Unix seconds).
    iat: i64,
    /// Expiration time (Unix seconds).
    exp: i64,
}

#[derive(Deserialize)]
struct RawClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

impl TryFrom<RawClaims> for ClaimSet {
    type Error = TokenError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        ClaimSet::new(raw.sub, raw.iat, raw.exp)
    }
}

impl ClaimSet {
    /// Creates a claim set, rejecting `expires_at <= issued_at`.
    pub fn new(subject: impl Into<String>, issued_at: i64, expires_at: i64) -> Result<Self, TokenError> {
        if expires_at <= issued_at {
            return Err(TokenError::Malformed {
                message: format!(
                    "expiry {} is not after issue time {}",
                    expires_at, issued_at
                ),
            });
        }

        Ok(Self {
            sub: subject.into(),
            iat: issued_at,
            exp: expires_at,
        })
    }

    /// Creates a claim set issued at `now` that lives for `lifetime_secs`.
    pub fn issue(subject: impl Into<String>, now: i64, lifetime_secs: i64) -> Result<Self, TokenError> {
        Self::new(subject, now, now.saturating_add(lifetime_secs))
    }

    /// Returns the subject.
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Returns the issue time in Unix seconds.
    pub fn issued_at(&self) -> i64 {
        self.iat
    }

    /// Returns the expiry time in Unix seconds.
    pub fn expires_at(&self) -> i64 {
        self.exp
    }

    /// Returns the lifetime in seconds.
    pub fn lifetime_secs(&self) -> i64 {
        self.exp - self.iat
    }

    /// Returns `true` if the claim set has expired at `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.exp
    }

    /// Returns the expiry as a DateTime.
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns the seconds left before expiry at `now`, if any.
    pub fn remaining_secs(&self, now: i64) -> Option<i64> {
        (self.exp > now).then(|| self.exp - now)
    }
}
