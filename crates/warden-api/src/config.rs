// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Gateway configuration.

use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::TokenConfig;
use crate::introspection::DEFAULT_TIMEOUT;

/// A configuration value that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for '{field}': {message}")]
pub struct InvalidConfig {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl InvalidConfig {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// GatewayConfig
// =============================================================================

/// Configuration for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Local token configuration.
    pub token: TokenConfig,
    /// Where login credentials are checked.
    pub credentials: CredentialsConfig,
    /// Remote OAuth2 authority. Without one, only local tokens verify.
    pub authority: Option<AuthorityConfig>,
    /// Request timeout.
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    /// Graceful shutdown timeout.
    #[serde(with = "duration_secs")]
    pub shutdown_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            cors: CorsConfig::default(),
            token: TokenConfig::default(),
            credentials: CredentialsConfig::default(),
            authority: None,
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl GatewayConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the token configuration.
    pub fn with_token(mut self, token: TokenConfig) -> Self {
        self.token = token;
        self
    }

    /// Sets the credentials source.
    pub fn with_credentials(mut self, credentials: CredentialsConfig) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sets the remote authority.
    pub fn with_authority(mut self, authority: AuthorityConfig) -> Self {
        self.authority = Some(authority);
        self
    }

    /// Returns `true` if opaque tokens are introspected.
    pub fn is_introspection_enabled(&self) -> bool {
        self.authority.is_some()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        self.token
            .validate()
            .map_err(|e| InvalidConfig::new("token", e.to_string()))?;

        if self.request_timeout.is_zero() {
            return Err(InvalidConfig::new("request_timeout", "must be positive"));
        }

        if let Some(authority) = &self.authority {
            authority.validate()?;
        }

        if let CredentialsConfig::Remote { .. } = self.credentials {
            match &self.authority {
                Some(authority) if authority.public_url.is_some() => {}
                _ => {
                    return Err(InvalidConfig::new(
                        "credentials",
                        "remote credentials require authority.public_url",
                    ))
                }
            }
        }

        Ok(())
    }
}

// =============================================================================
// CredentialsConfig
// =============================================================================

/// Where login credentials are checked.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialsConfig {
    /// A fixed principal → secret table.
    Static {
        /// Principals and their secrets.
        #[serde(default, skip_serializing)]
        users: HashMap<String, String>,
    },
    /// The authority's resource-owner password grant.
    Remote {
        /// Scope requested with the grant.
        #[serde(default)]
        scope: Option<String>,
    },
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self::Static {
            users: HashMap::new(),
        }
    }
}

impl CredentialsConfig {
    /// A static table with one principal.
    pub fn single_user(principal: impl Into<String>, secret: impl Into<String>) -> Self {
        let mut users = HashMap::new();
        users.insert(principal.into(), secret.into());
        Self::Static { users }
    }
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialsConfig::Static { users } => f
                .debug_struct("Static")
                .field("principals", &users.len())
                .finish(),
            CredentialsConfig::Remote { scope } => {
                f.debug_struct("Remote").field("scope", scope).finish()
            }
        }
    }
}

// =============================================================================
// AuthorityConfig
// =============================================================================

/// Remote OAuth2 authority.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthorityConfig {
    /// Admin API base URL; introspection lives under it.
    pub admin_url: String,
    /// Public API base URL; the token endpoint lives under it.
    #[serde(default)]
    pub public_url: Option<String>,
    /// OAuth2 client id.
    #[serde(default)]
    pub client_id: String,
    /// OAuth2 client secret.
    #[serde(default, skip_serializing)]
    pub client_secret: String,
    /// Bound on each call to the authority.
    #[serde(default = "default_authority_timeout", with = "duration_secs")]
    pub timeout: Duration,
    /// Scope required of introspected tokens on `/verify` when none is asked for.
    #[serde(default)]
    pub verify_scope: String,
}

fn default_authority_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl AuthorityConfig {
    /// Creates an authority configuration with only the admin URL set.
    pub fn new(admin_url: impl Into<String>) -> Self {
        Self {
            admin_url: admin_url.into(),
            public_url: None,
            client_id: String::new(),
            client_secret: String::new(),
            timeout: DEFAULT_TIMEOUT,
            verify_scope: String::new(),
        }
    }

    /// Sets the public URL.
    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = Some(url.into());
        self
    }

    /// Sets the client credentials.
    pub fn with_client(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.client_id = id.into();
        self.client_secret = secret.into();
        self
    }

    /// Sets the call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn validate(&self) -> Result<(), InvalidConfig> {
        check_url("authority.admin_url", &self.admin_url)?;
        if let Some(public_url) = &self.public_url {
            check_url("authority.public_url", public_url)?;
        }
        if self.timeout.is_zero() {
            return Err(InvalidConfig::new("authority.timeout", "must be positive"));
        }
        Ok(())
    }
}

impl fmt::Debug for AuthorityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorityConfig")
            .field("admin_url", &self.admin_url)
            .field("public_url", &self.public_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("verify_scope", &self.verify_scope)
            .finish()
    }
}

fn check_url(field: &str, value: &str) -> Result<(), InvalidConfig> {
    let url = reqwest::Url::parse(value).map_err(|e| InvalidConfig::new(field, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(InvalidConfig::new(
            field,
            format!("unsupported scheme '{}'", other),
        )),
    }
}

// =============================================================================
// CorsConfig
// =============================================================================

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins.
    pub allowed_origins: Vec<String>,
    /// Allowed methods.
    pub allowed_methods: Vec<String>,
    /// Allowed headers.
    pub allowed_headers: Vec<String>,
    /// Whether to allow credentials.
    pub allow_credentials: bool,
    /// Max age for preflight cache (seconds).
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec![
                "GET".to_string(),
                "POST".to_string(),
                "OPTIONS".to_string(),
            ],
            allowed_headers: vec![
                "Content-Type".to_string(),
                "Authorization".to_string(),
            ],
            allow_credentials: false,
            max_age: 3600,
        }
    }
}

impl CorsConfig {
    /// Creates a restrictive CORS configuration for the given origins.
    pub fn strict(origins: Vec<String>) -> Self {
        Self {
            allowed_origins: origins,
            allow_credentials: true,
            ..Default::default()
        }
    }
}

// =============================================================================
// Duration as whole seconds
// =============================================================================

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// =============================================================================
// Tests
// =============================================================================
