// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Gateway HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::CorsConfig;
use crate::error::{ApiError, ApiResult};
use crate::gateway::AuthGateway;
use crate::handlers;

// =============================================================================
// GatewayServer
// =============================================================================

/// The gateway HTTP server.
pub struct GatewayServer {
    gateway: AuthGateway,
}

impl GatewayServer {
    /// Creates a server over the given gateway.
    pub fn new(gateway: AuthGateway) -> Self {
        Self { gateway }
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let config = &self.gateway.config;

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.request_timeout,
            ))
            .layer(create_cors_layer(&config.cors));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/login", post(handlers::login))
            .route("/verify", get(handlers::verify))
            .route("/logout", post(handlers::logout))
            .route("/callback", get(handlers::callback))
            .layer(middleware_stack)
            .with_state(self.gateway.clone())
    }

    /// Binds the configured address and serves until `shutdown_signal` resolves.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        self.serve(listener, shutdown_signal).await
    }

    /// Serves on an already bound listener until `shutdown_signal` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let router = self.router();
        let local = listener
            .local_addr()
            .map_err(|e| ApiError::internal(format!("Failed to read local address: {}", e)))?;

        info!(
            addr = %local,
            introspection = self.gateway.guard().is_some(),
            "Starting gateway server"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("Gateway server shutdown complete");

        Ok(())
    }

    /// Returns the configured address.
    pub fn addr(&self) -> SocketAddr {
        self.gateway.config.socket_addr()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
fn create_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new().max_age(Duration::from_secs(cors.max_age));

    if cors.allowed_origins.iter().any(|o| o == "*") {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer = layer.allow_origin(AllowOrigin::list(origins));
    }

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    layer = layer.allow_methods(methods);

    if cors.allowed_headers.iter().any(|h| h == "*") {
        layer = layer.allow_headers(Any);
    } else {
        layer = layer.allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);
    }

    // Credentials cannot be combined with wildcard origins.
    if cors.allow_credentials && !cors.allowed_origins.iter().any(|o| o == "*") {
        layer = layer.allow_credentials(true);
    }

    layer
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenConfig;
    use crate::config::{CredentialsConfig, GatewayConfig};

    fn gateway() -> AuthGateway {
        let config = GatewayConfig::default()
            .with_port(9090)
            .with_token(TokenConfig::new("test-secret-key-that-is-long-enough-for-testing"))
            .with_credentials(CredentialsConfig::single_user("u", "p"));
        AuthGateway::builder().config(config).build().unwrap()
    }

    #[test]
    fn test_server_addr() {
        let server = GatewayServer::new(gateway());
        assert_eq!(server.addr().port(), 9090);
    }

    #[tokio::test]
    async fn test_router_creation() {
        let _router = GatewayServer::new(gateway()).router();
    }

    #[test]
    fn test_cors_layer_strict() {
        let _layer = create_cors_layer(&CorsConfig::strict(vec!["https://app.example.com".to_string()]));
    }
}
