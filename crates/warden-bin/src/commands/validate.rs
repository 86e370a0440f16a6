// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use std::path::Path;

use serde::Serialize;
use warden_api::{CredentialsConfig, GatewayConfig};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};
use crate::loader::{config_warnings, ConfigLoader};

/// Summary printed by `validate`. Secrets never appear here; the
/// configuration types skip them when serialized.
#[derive(Debug, Serialize)]
struct ValidationReport<'a> {
    valid: bool,
    config_path: String,
    listen: String,
    signing_keys: Vec<&'a str>,
    token_lifetime_secs: i64,
    credentials: &'static str,
    introspection: Option<&'a str>,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<&'a GatewayConfig>,
}

impl<'a> ValidationReport<'a> {
    fn new(path: &Path, config: &'a GatewayConfig, warnings: Vec<String>, show_config: bool) -> Self {
        Self {
            valid: true,
            config_path: path.display().to_string(),
            listen: config.socket_addr().to_string(),
            signing_keys: config.token.keys.iter().map(|k| k.id.as_str()).collect(),
            token_lifetime_secs: config.token.lifetime_secs,
            credentials: match config.credentials {
                CredentialsConfig::Static { .. } => "static",
                CredentialsConfig::Remote { .. } => "remote",
            },
            introspection: config.authority.as_ref().map(|a| a.admin_url.as_str()),
            warnings,
            config: show_config.then_some(config),
        }
    }
}

/// Loads and validates the configuration without starting the server.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    let config = ConfigLoader::new()
        .load(config_path)
        .map_err(|e| BinError::from(e).with_context("Configuration validation failed"))?;
    let warnings = config_warnings(&config);
    let warning_count = warnings.len();

    let report = ValidationReport::new(config_path, &config, warnings, args.show_config);
    print!("{}", render(&report, args.format)?);

    if args.strict && warning_count > 0 {
        return Err(BinError::rejected(format!(
            "Strict mode: {} warning(s) found",
            warning_count
        )));
    }

    Ok(())
}

fn render(report: &ValidationReport<'_>, format: OutputFormat) -> BinResult<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map(|s| s + "\n")
            .map_err(|e| BinError::output(e.to_string()))?,
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| BinError::output(e.to_string()))?
        }
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&format!("✓ Configuration is valid: {}\n\n", report.config_path));
            out.push_str("Summary:\n");
            out.push_str(&format!("  Listen:        {}\n", report.listen));
            out.push_str(&format!("  Signing keys:  {}\n", report.signing_keys.join(", ")));
            out.push_str(&format!("  Token TTL:     {}s\n", report.token_lifetime_secs));
            out.push_str(&format!("  Credentials:   {}\n", report.credentials));
            out.push_str(&format!(
                "  Introspection: {}\n",
                report.introspection.unwrap_or("disabled")
            ));

            if !report.warnings.is_empty() {
                out.push_str("\nWarnings:\n");
                for warning in &report.warnings {
                    out.push_str(&format!("  ⚠ {}\n", warning));
                }
            }

            if let Some(config) = report.config {
                let yaml = serde_yaml::to_string(config).map_err(|e| BinError::output(e.to_string()))?;
                out.push_str("\nParsed configuration:\n");
                out.push_str(&yaml);
            }
            out
        }
    };

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_api::{AuthorityConfig, TokenConfig};

    const SECRET: &str = "do-not-print-this-secret-anywhere-at-all";

    fn config() -> GatewayConfig {
        let authority = AuthorityConfig::new("https://auth.internal:4445")
            .with_client("warden", "client-secret-value");
        GatewayConfig::default()
            .with_token(TokenConfig::new(SECRET))
            .with_credentials(CredentialsConfig::single_user("alice", "wonderland"))
            .with_authority(authority)
    }

    #[test]
    fn test_report_never_contains_secrets() {
        let config = config();
        let report = ValidationReport::new(Path::new("warden.yaml"), &config, Vec::new(), true);

        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Yaml] {
            let rendered = render(&report, format).unwrap();
            assert!(rendered.contains("default"));
            assert!(!rendered.contains(SECRET));
            assert!(!rendered.contains("client-secret-value"));
            assert!(!rendered.contains("wonderland"));
        }
    }

    #[test]
    fn test_json_report_fields() {
        let config = config();
        let report = ValidationReport::new(
            Path::new("warden.yaml"),
            &config,
            vec!["CORS allows any origin".to_string()],
            false,
        );

        let json: serde_json::Value = serde_json::from_str(&render(&report, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["credentials"], "static");
        assert_eq!(json["introspection"], "https://auth.internal:4445");
        assert_eq!(json["warnings"][0], "CORS allows any origin");
        assert!(json.get("config").is_none());
    }
}
