// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Scope-gating middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::error::ApiError;
use crate::guard::AuthorizationGuard;

// =============================================================================
// ScopeLayer
// =============================================================================

/// Layer that admits only requests whose token carries a fixed scope.
///
/// Denials become 401 (missing or inactive token), 403 (insufficient scope)
/// or 502 (authority unavailable). On success the
/// [`IntrospectionResult`](crate::introspection::IntrospectionResult) is
/// stored in the request extensions for the handler.
#[derive(Clone)]
pub struct ScopeLayer {
    guard: AuthorizationGuard,
    required_scope: Arc<str>,
}

impl ScopeLayer {
    /// Creates a layer requiring `required_scope`.
    pub fn new(guard: AuthorizationGuard, required_scope: impl Into<String>) -> Self {
        Self {
            guard,
            required_scope: Arc::from(required_scope.into()),
        }
    }
}

impl<S> Layer<S> for ScopeLayer {
    type Service = ScopeMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ScopeMiddleware {
            inner,
            guard: self.guard.clone(),
            required_scope: self.required_scope.clone(),
        }
    }
}

// =============================================================================
// ScopeMiddleware
// =============================================================================

/// Middleware produced by [`ScopeLayer`].
#[derive(Clone)]
pub struct ScopeMiddleware<S> {
    inner: S,
    guard: AuthorizationGuard,
    required_scope: Arc<str>,
}

impl<S> Service<Request<Body>> for ScopeMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let guard = self.guard.clone();
        let required_scope = self.required_scope.clone();
        // Take the service that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let decision = guard.check(req.headers(), &required_scope).await;

            match decision.introspection {
                Some(result) if decision.allowed => {
                    tracing::debug!(
                        subject = ?result.subject,
                        scope = %required_scope,
                        path = %req.uri().path(),
                        "Request authorized"
                    );
                    req.extensions_mut().insert(result);
                    inner.call(req).await
                }
                _ => Ok(ApiError::from_decision(decision.reason).into_response()),
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
