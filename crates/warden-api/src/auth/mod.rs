// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Local token issuance and verification.
//!
//! - [`ClaimSet`]: subject, issue time and expiry
//! - [`KeyRing`] / [`SigningKey`]: HS256 keys selected by `kid`
//! - [`ClaimsCodec`]: signs and verifies compact JWS tokens
//! - [`TokenIssuer`]: checks credentials and signs a fresh claim set
//! - [`CredentialVerifier`]: the credential lookup seam

mod claims;
mod clock;
mod codec;
mod credentials;
mod issuer;
mod keys;

pub use claims::ClaimSet;
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{ClaimsCodec, TokenError, ALGORITHM};
pub use credentials::{
    CredentialError, CredentialVerifier, RemoteCredentialVerifier, StaticCredentials, TOKEN_PATH,
};
pub use issuer::{IssueError, IssuedToken, TokenIssuer};
pub use keys::{KeyRing, SigningKey, TokenConfig, DEFAULT_LIFETIME_SECS, RECOMMENDED_SECRET_LEN};
