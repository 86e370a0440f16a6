// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-api
//!
//! Authorization gateway core for Warden.
//!
//! This crate issues signed bearer tokens to authenticated principals, verifies
//! tokens presented on later requests, and gates protected operations on the
//! scope a remote OAuth2 authority reports for a token.
//!
//! ## Layout
//!
//! - [`auth`]: claim sets, the signing key ring, the claims codec and token issuance
//! - [`introspection`]: the remote introspection client
//! - [`guard`]: the scope-based authorization check
//! - [`verifier`]: local vs. introspected token verification
//! - [`gateway`], [`handlers`], [`middleware`], [`server`]: the HTTP surface

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod gateway;
pub mod guard;
pub mod handlers;
pub mod introspection;
pub mod middleware;
pub mod response;
pub mod server;
mod upstream;
pub mod verifier;

pub use auth::{
    ClaimSet, ClaimsCodec, Clock, CredentialError, CredentialVerifier, IssueError, IssuedToken,
    KeyRing, ManualClock, RemoteCredentialVerifier, SigningKey, StaticCredentials, SystemClock,
    TokenConfig, TokenError, TokenIssuer, DEFAULT_LIFETIME_SECS, RECOMMENDED_SECRET_LEN,
};
pub use config::{AuthorityConfig, CorsConfig, CredentialsConfig, GatewayConfig, InvalidConfig};
pub use error::{ApiError, ApiResult};
pub use gateway::{AuthGateway, AuthGatewayBuilder};
pub use guard::{has_scope, AuthorizationDecision, AuthorizationGuard, DecisionReason};
pub use introspection::{
    strip_bearer, IntrospectionClient, IntrospectionError, IntrospectionResult, Introspector,
};
pub use middleware::ScopeLayer;
pub use server::GatewayServer;
pub use verifier::{is_compact_jws, TokenVerifier, Verification, VerifyError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
