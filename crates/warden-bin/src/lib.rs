// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-bin
//!
//! Command-line entry point for the Warden gateway.
//!
//! ```text
//!   main.rs ──► cli ──► commands ──► loader ──► warden-api
//!                 │         │
//!                 ▼         ▼
//!              logging   shutdown
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the gateway (default command)
//! warden
//!
//! # Start with a custom config and port
//! warden -c /etc/warden/warden.toml run --port 9000
//!
//! # Validate configuration, failing on warnings
//! warden validate --strict
//!
//! # Generate a signing secret
//! warden gen-key -f hex
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod loader;
pub mod logging;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use loader::{load_config, ConfigError, ConfigFormat, ConfigLoader};
pub use logging::init_logging;
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
