// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Top-level error for the entry points.

use std::process::ExitCode;

use crate::blockchain::ChainClientError;
use crate::config::ConfigError;
use crate::token_demo::TokenDemoError;
use crate::watcher::WatcherError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Chain client error: {0}")]
    Client(#[from] ChainClientError),

    #[error("Balance watcher failed: {0}")]
    Watcher(#[from] WatcherError),

    #[error("Token demo failed: {0}")]
    TokenDemo(#[from] TokenDemoError),

    #[error("{failed} of {total} token variants failed")]
    VariantsFailed { failed: usize, total: usize },
}

impl AppError {
    /// Log the failure and map it to a process exit code.
    pub fn report(&self) -> ExitCode {
        tracing::error!(error = %self, "Exiting after unhandled failure");
        ExitCode::FAILURE
    }
}
