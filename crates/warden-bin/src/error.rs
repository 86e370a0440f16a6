// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Failures of the `warden` command and the exit codes they map to.
//!
//! | Exit | Cause                                            |
//! |------|--------------------------------------------------|
//! | 1    | configuration unreadable, invalid or rejected    |
//! | 2    | bad command-line arguments                       |
//! | 3    | the gateway could not be built                   |
//! | 4    | the server failed while running                  |
//! | 5    | output could not be rendered or written          |

use thiserror::Error;

use crate::loader::ConfigError;

/// Result type alias for command execution.
pub type BinResult<T> = Result<T, BinError>;

/// Errors surfaced by `warden` subcommands.
#[derive(Debug, Error)]
pub enum BinError {
    /// The configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The configuration loaded but a check refused it.
    #[error("Configuration rejected: {0}")]
    Rejected(String),

    /// An argument is out of range.
    #[error("Invalid argument: {0}")]
    Usage(String),

    /// Building the gateway from configuration failed.
    #[error("Gateway startup failed: {0}")]
    Startup(String),

    /// The HTTP server stopped with an error.
    #[error("Server error: {0}")]
    Server(#[from] warden_api::ApiError),

    /// A report or key could not be rendered or written.
    #[error("Output error: {0}")]
    Output(String),

    /// Another error with a description of what was being done.
    #[error("{context}: {source}")]
    WithContext {
        /// What was being done.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a configuration-rejected error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Creates an invalid-argument error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Creates a startup error.
    pub fn startup(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }

    /// Creates an output error.
    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }

    /// Wraps the error with what was being done.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Process exit code; see the module table.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Rejected(_) => 1,
            Self::Usage(_) => 2,
            Self::Startup(_) => 3,
            Self::Server(_) => 4,
            Self::Output(_) => 5,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }

    /// The error followed by each of its causes, outermost first.
    pub fn chain(&self) -> Vec<String> {
        let mut lines = vec![self.to_string()];
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            lines.push(err.to_string());
            cause = err.source();
        }
        lines
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Output(err.to_string())
    }
}

// =============================================================================
// Reporting
// =============================================================================

/// Writes the error chain to stderr.
pub fn report_error(error: &BinError) {
    let mut lines = error.chain().into_iter();
    if let Some(first) = lines.next() {
        eprintln!("Error: {}", first);
    }
    for cause in lines {
        eprintln!("  Caused by: {}", cause);
    }
}

/// Reports the error and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_exit_code_and_chain() {
        let err = BinError::rejected("2 warning(s) found").with_context("validating warden.yaml");
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.chain(),
            vec![
                "validating warden.yaml: Configuration rejected: 2 warning(s) found".to_string(),
                "Configuration rejected: 2 warning(s) found".to_string(),
            ]
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BinError::from(ConfigError::FileNotFound { path: "warden.yaml".into() }).exit_code(), 1);
        assert_eq!(BinError::usage("length").exit_code(), 2);
        assert_eq!(BinError::startup("no signing key").exit_code(), 3);
        assert_eq!(BinError::from(warden_api::ApiError::internal("bind")).exit_code(), 4);
        assert_eq!(BinError::output("disk full").exit_code(), 5);
    }

    #[test]
    fn test_io_error_is_output() {
        let err = BinError::from(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
        assert!(matches!(err, BinError::Output(_)));
    }
}
