// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use ledger_scripts::blockchain::{ChainClient, RpcChainClient};
use ledger_scripts::config::DemoConfig;
use ledger_scripts::error::AppError;
use ledger_scripts::logging::init_tracing;
use ledger_scripts::report::ConsoleSink;
use ledger_scripts::token_demo::{DemoAccounts, TokenDemo};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => e.report(),
    }
}

async fn run() -> Result<(), AppError> {
    let config = DemoConfig::from_env()?;
    tracing::info!(
        rpc_url = %config.network.rpc_url,
        variants = config.variants.len(),
        "Connecting to ledger node"
    );

    let client: Arc<dyn ChainClient> = Arc::new(RpcChainClient::new(config.network)?);
    let accounts = DemoAccounts::resolve(client.as_ref(), config.accounts).await?;

    let demo = TokenDemo::new(client, accounts, config.variants, Arc::new(ConsoleSink))
        .with_transfer_amount(config.transfer_amount);
    let summary = demo.run_all().await?;

    for (variant, error) in summary.failures() {
        tracing::error!(variant, error = %error, "Token variant failed");
    }
    if !summary.all_succeeded() {
        return Err(AppError::VariantsFailed {
            failed: summary.outcomes.len() - summary.succeeded(),
            total: summary.outcomes.len(),
        });
    }
    Ok(())
}
