// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `gen-key` command.

use std::fs;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;

use crate::cli::{Cli, GenKeyArgs, KeyFormat};
use crate::error::{BinError, BinResult};
use warden_api::RECOMMENDED_SECRET_LEN;

/// Generates `len` random bytes encoded in `format`.
pub fn generate_secret(len: usize, format: KeyFormat) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);

    match format {
        KeyFormat::Base64 => STANDARD.encode(&bytes),
        KeyFormat::Hex => hex::encode(&bytes),
    }
}

/// Prints or writes a fresh signing secret.
pub fn gen_key(_cli: &Cli, args: GenKeyArgs) -> BinResult<()> {
    if args.length < RECOMMENDED_SECRET_LEN {
        return Err(BinError::usage(format!(
            "key length must be at least {} bytes",
            RECOMMENDED_SECRET_LEN
        )));
    }

    let secret = generate_secret(args.length, args.format);

    match &args.output {
        Some(path) => {
            fs::write(path, &secret)
                .map_err(|e| BinError::output(format!("Failed to write key file: {}", e)))?;
            eprintln!("Key written to: {}", path.display());
        }
        None => println!("{}", secret),
    }

    eprintln!();
    eprintln!("Store this secret securely. Use it as a signing key:");
    eprintln!("  - In the config file under token.keys[].secret");
    eprintln!("  - Or as an environment variable: export WARDEN_SIGNING_SECRET=<key>");

    Ok(())
}
