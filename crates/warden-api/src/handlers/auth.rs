// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse},
    Json,
};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{ValidatedForm, ValidatedQuery};
use crate::gateway::AuthGateway;
use crate::response::{AuthResponse, MessageResponse, TOKEN_VALID};

// =============================================================================
// Login
// =============================================================================

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Principal.
    #[serde(default)]
    pub username: String,
    /// Credential proof.
    #[serde(default)]
    pub password: String,
}

/// POST /login
///
/// Checks the credentials and returns a signed token.
pub async fn login(
    State(gateway): State<AuthGateway>,
    ValidatedForm(request): ValidatedForm<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let issued = gateway.issue(&request.username, &request.password).await?;
    Ok(Json(AuthResponse::from(issued)))
}

// =============================================================================
// Verify
// =============================================================================

/// Query for `/verify`.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    /// Scope the token must carry.
    #[serde(default)]
    pub scope: Option<String>,
}

/// GET /verify
///
/// Verifies the bearer token, locally or through introspection.
pub async fn verify(
    State(gateway): State<AuthGateway>,
    ValidatedQuery(query): ValidatedQuery<VerifyQuery>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let credential = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let verification = gateway.verify(credential, query.scope.as_deref()).await?;
    tracing::debug!(subject = ?verification.subject(), "Token verified");

    Ok(TOKEN_VALID)
}

// =============================================================================
// Logout
// =============================================================================

/// POST /logout
///
/// Stateless: tokens stay valid until they expire.
pub async fn logout() -> impl IntoResponse {
    Json(MessageResponse::new("Logged out successfully"))
}

// =============================================================================
// Callback
// =============================================================================

/// Query for `/callback`.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code.
    #[serde(default)]
    pub code: String,
    /// Opaque client state.
    #[serde(default)]
    pub state: String,
}

/// GET /callback
///
/// Echoes the authorization code. The code is not exchanged.
pub async fn callback(ValidatedQuery(query): ValidatedQuery<CallbackQuery>) -> impl IntoResponse {
    tracing::debug!(code = %query.code, state = %query.state, "Received authorization callback");

    Html(format!(
        "<html><body><h1>Callback Received</h1><p>Authorization Code: {}</p></body></html>",
        escape_html(&query.code)
    ))
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
