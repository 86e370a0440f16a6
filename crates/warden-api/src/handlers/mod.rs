// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! HTTP handlers.
//!
//! - [`auth`]: login, verify, logout and the OAuth2 callback
//! - [`health`]: liveness

mod auth;
mod health;

pub use auth::*;
pub use health::*;
