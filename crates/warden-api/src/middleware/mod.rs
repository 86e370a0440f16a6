// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware for gating application routes.
//!
//! - [`ScopeLayer`]: requires an introspected token with a given scope

mod scope;

pub use scope::{ScopeLayer, ScopeMiddleware};
