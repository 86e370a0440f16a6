// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use tracing::{info, warn};
use warden_api::{AuthGateway, GatewayServer};

use crate::cli::{Cli, RunArgs};
use crate::error::{BinError, BinResult};
use crate::loader::{config_warnings, ConfigLoader};
use crate::shutdown::ShutdownCoordinator;

/// Loads the configuration and serves until a shutdown signal arrives.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    info!(version = warden_api::VERSION, "Starting Warden gateway");

    let mut config = ConfigLoader::new()
        .load(&cli.config)
        .map_err(|e| BinError::from(e).with_context(format!("loading {}", cli.config.display())))?;

    if let Some(port) = args.port {
        config.port = port;
    }
    for warning in config_warnings(&config) {
        warn!("{}", warning);
    }

    let shutdown_timeout = config.shutdown_timeout;
    let gateway = AuthGateway::builder()
        .config(config)
        .build()
        .map_err(|e| BinError::startup(e.to_string()))?;
    let server = GatewayServer::new(gateway);

    let coordinator = ShutdownCoordinator::new();
    let signals = coordinator.clone();
    tokio::spawn(async move { signals.wait_for_signal().await });

    let serve = server.run_with_shutdown(coordinator.shutdown_signal());
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => return result.map_err(BinError::from),
        _ = coordinator.shutdown_signal() => {}
    }

    // Draining in-flight requests.
    match tokio::time::timeout(shutdown_timeout, serve).await {
        Ok(result) => result.map_err(BinError::from),
        Err(_) => {
            warn!(timeout_secs = shutdown_timeout.as_secs(), "Graceful shutdown timed out");
            Ok(())
        }
    }
}
