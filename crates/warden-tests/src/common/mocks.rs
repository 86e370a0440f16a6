// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Stand-ins for the remote authority that record how they were called.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use warden_api::{IntrospectionError, IntrospectionResult, Introspector};

// =============================================================================
// StubIntrospector
// =============================================================================

/// An introspector returning a scripted response.
///
/// Counts calls and remembers the last token and scope it was asked about,
/// so tests can assert the authority was (or was not) consulted.
#[derive(Debug)]
pub struct StubIntrospector {
    response: Mutex<Result<IntrospectionResult, IntrospectionError>>,
    calls: AtomicU64,
    last_request: Mutex<Option<(String, String)>>,
}

impl StubIntrospector {
    /// Creates a stub returning `response` on every call.
    pub fn new(response: Result<IntrospectionResult, IntrospectionError>) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(response),
            calls: AtomicU64::new(0),
            last_request: Mutex::new(None),
        })
    }

    /// A stub reporting an active token with `scope`.
    pub fn active(scope: &str) -> Arc<Self> {
        Self::new(Ok(IntrospectionResult::active(scope)))
    }

    /// A stub reporting an inactive token.
    pub fn inactive() -> Arc<Self> {
        Self::new(Ok(IntrospectionResult::inactive()))
    }

    /// A stub whose authority cannot be reached.
    pub fn unreachable() -> Arc<Self> {
        Self::new(Err(IntrospectionError::unreachable("connection refused")))
    }

    /// Replaces the scripted response.
    pub fn respond_with(&self, response: Result<IntrospectionResult, IntrospectionError>) {
        if let Ok(mut slot) = self.response.lock() {
            *slot = response;
        }
    }

    /// Number of introspection calls so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// The `(token, required_scope)` of the last call.
    pub fn last_request(&self) -> Option<(String, String)> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl Introspector for StubIntrospector {
    async fn introspect(
        &self,
        token: &str,
        required_scope: &str,
    ) -> Result<IntrospectionResult, IntrospectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some((token.to_string(), required_scope.to_string()));
        }

        match self.response.lock() {
            Ok(response) => response.clone(),
            Err(_) => Err(IntrospectionError::malformed("stub poisoned")),
        }
    }
}
