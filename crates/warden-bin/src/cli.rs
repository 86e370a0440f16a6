// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the gateway (default)
//! - `validate`: Validate a configuration file
//! - `version`: Show version information
//! - `gen-key`: Generate a signing secret

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Warden - token issuance and authorization gateway
///
/// Issues signed bearer tokens for static or delegated credentials and
/// authorizes requests against an OAuth2 introspection endpoint.
#[derive(Parser, Debug)]
#[command(
    name = "warden",
    author = "Sylvex <contact@sylvex.io>",
    version = warden_api::VERSION,
    about = "Token issuance and authorization gateway",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "warden.yaml",
        env = "WARDEN_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "WARDEN_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "WARDEN_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the gateway server
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration without starting the server.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,

    /// Generate a random signing secret
    ///
    /// The output can be used as a `token.keys[].secret` value.
    #[command(name = "gen-key")]
    GenKey(GenKeyArgs),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Override the listen port from the configuration
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation (secrets omitted)
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `gen-key` command.
#[derive(Args, Debug, Clone, Default)]
pub struct GenKeyArgs {
    /// Output format for the key
    #[arg(short, long, default_value = "base64")]
    pub format: KeyFormat,

    /// Key length in bytes
    #[arg(short = 'n', long, default_value_t = 32)]
    pub length: usize,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
    /// YAML format
    Yaml,
}

/// Signing key output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum KeyFormat {
    /// Base64 encoded
    #[default]
    Base64,
    /// Hexadecimal encoded
    Hex,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Get the effective log level based on flags.
    pub fn effective_log_level(&self) -> &str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["warden"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.effective_command(), Commands::Run(_)));
        assert_eq!(cli.config, PathBuf::from("warden.yaml"));
    }

    #[test]
    fn test_run_port_override() {
        let cli = Cli::parse_from(["warden", "run", "--port", "9000"]);
        match cli.command {
            Some(Commands::Run(args)) => assert_eq!(args.port, Some(9000)),
            other => panic!("Expected Run command, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["warden", "validate", "--show-config", "--strict", "-f", "json"]);
        if let Some(Commands::Validate(args)) = cli.command {
            assert!(args.show_config);
            assert!(args.strict);
            assert_eq!(args.format, OutputFormat::Json);
        } else {
            panic!("Expected Validate command");
        }
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["warden", "-c", "/etc/warden/config.toml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/warden/config.toml"));
    }

    #[test]
    fn test_log_level_flags() {
        let cli = Cli::parse_from(["warden", "-l", "trace"]);
        assert_eq!(cli.effective_log_level(), "trace");

        let cli = Cli::parse_from(["warden", "-q"]);
        assert_eq!(cli.effective_log_level(), "warn");

        let cli = Cli::parse_from(["warden", "-v"]);
        assert_eq!(cli.effective_log_level(), "debug");
    }

    #[test]
    fn test_gen_key_command() {
        let cli = Cli::parse_from(["warden", "gen-key", "-f", "hex", "--length", "48"]);
        if let Some(Commands::GenKey(args)) = cli.command {
            assert_eq!(args.format, KeyFormat::Hex);
            assert_eq!(args.length, 48);
            assert!(args.output.is_none());
        } else {
            panic!("Expected GenKey command");
        }
    }

    #[test]
    fn test_gen_key_short_flags_with_global_log_level() {
        let cli = Cli::try_parse_from(["warden", "gen-key", "-n", "64", "-l", "debug", "-o", "key.txt"])
            .unwrap();
        assert_eq!(cli.effective_log_level(), "debug");
        match cli.command {
            Some(Commands::GenKey(args)) => {
                assert_eq!(args.length, 64);
                assert_eq!(args.output, Some(PathBuf::from("key.txt")));
            }
            other => panic!("Expected GenKey command, got {:?}", other),
        }
    }
}
