// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading.
//!
//! Files are parsed by extension (`.yaml`/`.yml`, `.toml`, `.json`). Before
//! parsing, `${VAR}` and `${VAR:default}` placeholders are expanded from the
//! environment. After parsing, `WARDEN_*` overrides are applied and the result
//! is validated.
//!
//! | Variable                       | Field                          |
//! |--------------------------------|--------------------------------|
//! | `WARDEN_HOST`                  | `host`                         |
//! | `WARDEN_PORT`                  | `port`                         |
//! | `WARDEN_SIGNING_SECRET`        | secret of the `default` key    |
//! | `WARDEN_AUTHORITY_ADMIN_URL`   | `authority.admin_url`          |

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use warden_api::{
    AuthorityConfig, CredentialsConfig, GatewayConfig, InvalidConfig, SigningKey,
    RECOMMENDED_SECRET_LEN,
};

/// Default prefix for environment overrides.
pub const ENV_PREFIX: &str = "WARDEN";

/// Key id that `WARDEN_SIGNING_SECRET` writes to.
const DEFAULT_KEY_ID: &str = "default";

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file does not exist.
    #[error("Configuration file not found: {}", path.display())]
    FileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// The file could not be read.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        /// Requested path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The extension does not name a supported format.
    #[error("Unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// The offending extension.
        format: String,
    },

    /// The content did not parse.
    #[error("Failed to parse config file '{}': {message}", path.display())]
    Parse {
        /// Source path, or `<string>` for in-memory content.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An override variable held an unusable value.
    #[error("Invalid environment variable {name}: {message}")]
    InvalidEnvVar {
        /// Variable name.
        name: String,
        /// What was wrong with it.
        message: String,
    },

    /// The parsed configuration failed validation.
    #[error("Invalid configuration: {0}")]
    Validation(#[from] InvalidConfig),
}

impl ConfigError {
    fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::UnsupportedFormat {
                format: other.to_string(),
            }),
            None => Err(ConfigError::UnsupportedFormat {
                format: "(no extension)".to_string(),
            }),
        }
    }
}

// =============================================================================
// ConfigLoader
// =============================================================================

/// Loads and validates [`GatewayConfig`].
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    resolve_env_vars: bool,
    /// Replaces the process environment when set.
    vars: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    /// Creates a loader reading the process environment.
    pub fn new() -> Self {
        Self {
            env_prefix: ENV_PREFIX.to_string(),
            resolve_env_vars: true,
            vars: None,
        }
    }

    /// Sets the prefix for override variables.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables placeholder expansion and overrides.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Reads variables from `vars` instead of the process environment.
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = Some(vars);
        self
    }

    /// Loads a configuration file.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<GatewayConfig> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let format = ConfigFormat::from_path(path)?;
        let config = self.load_content(&content, format, path)?;

        debug!(
            keys = config.token.keys.len(),
            introspection = config.is_introspection_enabled(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<GatewayConfig> {
        self.load_content(content, format, Path::new("<string>"))
    }

    fn load_content(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<GatewayConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        let mut config = parse_str(&content, format).map_err(|e| ConfigError::parse(path, e))?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;
        Ok(config)
    }

    fn var(&self, name: &str) -> Option<String> {
        match &self.vars {
            Some(vars) => vars.get(name).cloned(),
            None => env::var(name).ok(),
        }
    }

    /// Expands `${VAR}` and `${VAR:default}`. Unknown variables without a
    /// default are left in place.
    fn resolve_env_placeholders(&self, content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find('}') else {
                result.push_str(&rest[start..]);
                return result;
            };

            let expr = &after[..end];
            let (name, default) = match expr.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (expr, None),
            };

            match (self.var(name), default) {
                (Some(value), _) => result.push_str(&value),
                (None, Some(default)) => result.push_str(default),
                (None, None) => {
                    warn!(variable = name, "Environment variable not found");
                    result.push_str(&rest[start..start + 2 + end + 1]);
                }
            }

            rest = &after[end + 1..];
        }

        result.push_str(rest);
        result
    }

    fn apply_env_overrides(&self, config: &mut GatewayConfig) -> ConfigResult<()> {
        let name = |suffix: &str| format!("{}_{}", self.env_prefix, suffix);

        if let Some(value) = self.var(&name("HOST")) {
            config.host = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name("HOST"), "expected an IP address"))?;
        }

        if let Some(value) = self.var(&name("PORT")) {
            config.port = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name("PORT"), "expected valid port number"))?;
        }

        if let Some(secret) = self.var(&name("SIGNING_SECRET")) {
            match config.token.keys.iter_mut().find(|k| k.id == DEFAULT_KEY_ID) {
                Some(key) => key.secret = secret,
                None => config.token.keys.push(SigningKey::new(DEFAULT_KEY_ID, secret)),
            }
        }

        if let Some(url) = self.var(&name("AUTHORITY_ADMIN_URL")) {
            match config.authority.as_mut() {
                Some(authority) => authority.admin_url = url,
                None => config.authority = Some(AuthorityConfig::new(url)),
            }
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_str(content: &str, format: ConfigFormat) -> Result<GatewayConfig, String> {
    match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    }
}

// =============================================================================
// Warnings
// =============================================================================

/// Returns findings that are legal but probably mistakes.
pub fn config_warnings(config: &GatewayConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    for key in &config.token.keys {
        if key.secret.len() < RECOMMENDED_SECRET_LEN {
            warnings.push(format!(
                "signing key '{}' is shorter than {} bytes",
                key.id, RECOMMENDED_SECRET_LEN
            ));
        }
    }

    if let CredentialsConfig::Static { users } = &config.credentials {
        if users.is_empty() {
            warnings.push("no static users configured; every login will fail".to_string());
        }
    }

    if config.cors.allowed_origins.iter().any(|o| o == "*") {
        warnings.push("CORS allows any origin".to_string());
    }

    if let Some(authority) = &config.authority {
        if authority.admin_url.starts_with("http://") {
            warnings.push("authority admin URL is not using TLS".to_string());
        }
    }

    warnings
}

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<GatewayConfig> {
    ConfigLoader::new().load(path)
}

// =============================================================================
// Tests
// =============================================================================
