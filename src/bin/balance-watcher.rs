// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use ledger_scripts::blockchain::RpcChainClient;
use ledger_scripts::config::WatcherConfig;
use ledger_scripts::error::AppError;
use ledger_scripts::logging::init_tracing;
use ledger_scripts::report::ConsoleSink;
use ledger_scripts::watcher::BalanceWatcher;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => e.report(),
    }
}

async fn run() -> Result<(), AppError> {
    let config = WatcherConfig::from_env()?;
    tracing::info!(rpc_url = %config.network.rpc_url, "Connecting to ledger node");

    let client = Arc::new(RpcChainClient::new(config.network)?);
    let watcher = BalanceWatcher::new(
        client,
        config.accounts,
        config.poll_interval,
        Arc::new(ConsoleSink),
    )?;

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
        }
        on_signal.cancel();
    });

    watcher.run(shutdown).await?;
    Ok(())
}
