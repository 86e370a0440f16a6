// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Extractors that reject malformed input with the gateway's JSON error body.

use axum::{
    body::Body,
    extract::{FromRequest, FromRequestParts, Query},
    http::{request::Parts, Request},
    Form,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

// =============================================================================
// Form
// =============================================================================

/// A form-encoded body. Rejects with 400 `BAD_REQUEST`.
pub struct ValidatedForm<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid form: {}", e.body_text())))?;

        Ok(ValidatedForm(value))
    }
}

// =============================================================================
// Query
// =============================================================================

/// Query string parameters. Rejects with 400 `BAD_REQUEST`.
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid query: {}", e.body_text())))?;

        Ok(ValidatedQuery(value))
    }
}
