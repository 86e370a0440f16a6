// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Prints version and build information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("Warden - token issuance and authorization gateway");
    println!();
    println!("Version Information:");
    println!("  warden-bin: {}", env!("CARGO_PKG_VERSION"));
    println!("  warden-api: {}", warden_api::VERSION);
    println!();
    println!("Build Information:");
    println!("  Target:     {}", std::env::consts::ARCH);
    println!("  OS:         {}", std::env::consts::OS);
    println!("  Signing:    HS256");
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
