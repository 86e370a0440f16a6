// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! HTTP introspection client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use super::{strip_bearer, IntrospectionError, IntrospectionResult, Introspector};
use crate::upstream::{read_capped, BodyError};

/// Path of the introspection endpoint under the authority's admin base URL.
pub const INTROSPECT_PATH: &str = "/admin/oauth2/introspect";

/// Largest introspection response body accepted, in bytes.
pub const MAX_RESPONSE_SIZE: usize = 64 * 1024;

/// Default bound on a single introspection call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Introspects tokens over HTTP.
///
/// Every call makes exactly one POST. There is no retry and no cache; the
/// request future is cancelled if the caller drops it.
#[derive(Clone)]
pub struct IntrospectionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl IntrospectionClient {
    /// Creates a client against `<admin_url>/admin/oauth2/introspect` with the
    /// given timeout.
    pub fn new(admin_url: &str, timeout: Duration) -> Result<Self, IntrospectionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IntrospectionError::unreachable(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, admin_url))
    }

    /// Creates a client using an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, admin_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", admin_url.trim_end_matches('/'), INTROSPECT_PATH),
        }
    }

    /// Returns the introspection endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for IntrospectionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntrospectionClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl Introspector for IntrospectionClient {
    async fn introspect(
        &self,
        token: &str,
        required_scope: &str,
    ) -> Result<IntrospectionResult, IntrospectionError> {
        let token = strip_bearer(token);

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("token", token), ("scope", required_scope)])
            .send()
            .await
            .map_err(|e| IntrospectionError::unreachable(format!("network: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IntrospectionError::malformed(format!("http: status {}", status)));
        }

        let bytes = read_capped(response, MAX_RESPONSE_SIZE)
            .await
            .map_err(|e| match e {
                BodyError::Transport(_) => IntrospectionError::unreachable(e.to_string()),
                BodyError::TooLarge { .. } => IntrospectionError::malformed(e.to_string()),
            })?;

        serde_json::from_slice(&bytes)
            .map_err(|e| IntrospectionError::malformed(format!("invalid json: {}", e)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    #[tokio::test]
    async fn test_introspect_active_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", INTROSPECT_PATH)
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("token".into(), "abc".into()),
                Matcher::UrlEncoded("scope".into(), "read".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"active":true,"scope":"read write","sub":"alice","client_id":"app"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = IntrospectionClient::with_client(reqwest::Client::new(), &server.url());
        let result = client.introspect("Bearer abc", "read").await.unwrap();

        assert!(result.active);
        assert!(result.has_scope("write"));
        assert_eq!(result.subject.as_deref(), Some("alice"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_introspect_inactive_token() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", INTROSPECT_PATH)
            .with_status(200)
            .with_body(r#"{"active":false}"#)
            .create_async()
            .await;

        let client = IntrospectionClient::with_client(reqwest::Client::new(), &server.url());
        let result = client.introspect("abc", "read").await.unwrap();
        assert!(!result.active);
        assert!(result.scope.is_empty());
    }

    #[tokio::test]
    async fn test_introspect_invalid_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", INTROSPECT_PATH)
            .with_status(200)
            .with_body("{ invalid json }")
            .create_async()
            .await;

        let client = IntrospectionClient::with_client(reqwest::Client::new(), &server.url());
        assert!(matches!(
            client.introspect("abc", "read").await,
            Err(IntrospectionError::UpstreamMalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_introspect_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", INTROSPECT_PATH)
            .with_status(500)
            .with_body(r#"{"error":"server_error"}"#)
            .create_async()
            .await;

        let client = IntrospectionClient::with_client(reqwest::Client::new(), &server.url());
        assert!(matches!(
            client.introspect("abc", "read").await,
            Err(IntrospectionError::UpstreamMalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_introspect_oversized_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", INTROSPECT_PATH)
            .with_status(200)
            .with_body("a".repeat(MAX_RESPONSE_SIZE + 1))
            .create_async()
            .await;

        let client = IntrospectionClient::with_client(reqwest::Client::new(), &server.url());
        assert!(matches!(
            client.introspect("abc", "read").await,
            Err(IntrospectionError::UpstreamMalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_introspect_unreachable() {
        // Nothing listens on port 1.
        let client = IntrospectionClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        assert!(matches!(
            client.introspect("abc", "read").await,
            Err(IntrospectionError::UpstreamUnreachable { .. })
        ));
    }

    #[tokio::test]
    async fn test_introspect_times_out_on_silent_authority() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _silent = tokio::spawn(async move {
            // Accept and hold connections without ever answering.
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client =
            IntrospectionClient::new(&format!("http://{}", addr), Duration::from_millis(200)).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), client.introspect("abc", "read"))
            .await
            .expect("client timeout should fire first");

        assert!(matches!(
            result,
            Err(IntrospectionError::UpstreamUnreachable { .. })
        ));
    }

    #[test]
    fn test_endpoint_joins_path() {
        let client = IntrospectionClient::with_client(reqwest::Client::new(), "http://hydra:4445/");
        assert_eq!(client.endpoint(), "http://hydra:4445/admin/oauth2/introspect");
    }
}
