// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! by both entry points. Configuration is loaded from the environment at
//! startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `LEDGER_RPC_URL` | JSON-RPC endpoint of the chain node | `http://127.0.0.1:8545` |
//! | `RECEIPT_TIMEOUT_SECS` | Upper bound on a receipt wait | `60` |
//! | `POLL_INTERVAL_SECS` | Balance watcher interval | `6` |
//! | `WATCH_ACCOUNTS` | Comma-separated accounts to watch | two dev accounts |
//! | `DEMO_SENDER` | Token demo sender (set together with `DEMO_RECEIVER`) | first node account |
//! | `DEMO_RECEIVER` | Token demo receiver | second node account |
//! | `TOKEN_VARIANTS_FILE` | JSON manifest of token variants | Required for the token demo |
//! | `TRANSFER_AMOUNT` | Units moved per demo transfer | `1` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |
//!
//! ## Variant manifest
//!
//! ```json
//! { "variants": [ { "name": "evm", "bytecode": "0x6080...", "abi": [ ... ] } ] }
//! ```
//!
//! Variants run in manifest order. `abi` is optional and defaults to the
//! standard ERC-20 interface.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use alloy::json_abi::JsonAbi;
use alloy::primitives::{Bytes, U256};
use serde::Deserialize;

use crate::blockchain::erc20::{ensure_token_interface, standard_abi};
use crate::blockchain::{Account, ContractVariant, NetworkConfig, DEFAULT_RPC_URL};
use crate::token_demo::DEFAULT_TRANSFER_AMOUNT;
use crate::watcher::DEFAULT_POLL_INTERVAL;

/// Environment variable name for the node's JSON-RPC endpoint.
pub const RPC_URL_ENV: &str = "LEDGER_RPC_URL";

/// Environment variable name for the receipt wait bound, in seconds.
pub const RECEIPT_TIMEOUT_ENV: &str = "RECEIPT_TIMEOUT_SECS";

/// Environment variable name for the watcher interval, in seconds.
pub const POLL_INTERVAL_ENV: &str = "POLL_INTERVAL_SECS";

/// Environment variable name for the watched account list.
pub const WATCH_ACCOUNTS_ENV: &str = "WATCH_ACCOUNTS";

/// Environment variable name for the demo sender.
pub const DEMO_SENDER_ENV: &str = "DEMO_SENDER";

/// Environment variable name for the demo receiver.
pub const DEMO_RECEIVER_ENV: &str = "DEMO_RECEIVER";

/// Environment variable name for the token variant manifest path.
pub const TOKEN_VARIANTS_FILE_ENV: &str = "TOKEN_VARIANTS_FILE";

/// Environment variable name for the demo transfer amount.
pub const TRANSFER_AMOUNT_ENV: &str = "TRANSFER_AMOUNT";

/// Default receipt wait bound.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Accounts watched when `WATCH_ACCOUNTS` is unset.
pub const DEFAULT_WATCH_ACCOUNTS: [&str; 2] = [
    "0x6be02d1d3665660d22ff9624b7be0551ee1ac91b",
    "0x1cCA28600d7491365520B31b466f88647B9839eC",
];

/// Settings for the balance watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub network: NetworkConfig,
    pub accounts: Vec<Account>,
    pub poll_interval: Duration,
}

impl WatcherConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let network = network_from(&lookup)?;

        let accounts = match lookup(WATCH_ACCOUNTS_ENV) {
            Some(raw) => parse_account_list(WATCH_ACCOUNTS_ENV, &raw)?,
            None => DEFAULT_WATCH_ACCOUNTS
                .iter()
                .map(|raw| parse_account(WATCH_ACCOUNTS_ENV, raw))
                .collect::<Result<_, _>>()?,
        };

        let poll_interval = match lookup(POLL_INTERVAL_ENV) {
            Some(raw) => positive_secs(POLL_INTERVAL_ENV, &raw)?,
            None => DEFAULT_POLL_INTERVAL,
        };

        Ok(Self {
            network,
            accounts,
            poll_interval,
        })
    }
}

/// Settings for the token demo.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub network: NetworkConfig,
    /// Statically configured `(sender, receiver)`; discovered when `None`
    pub accounts: Option<(Account, Account)>,
    pub variants: Vec<ContractVariant>,
    pub transfer_amount: U256,
}

impl DemoConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let network = network_from(&lookup)?;

        let accounts = match (lookup(DEMO_SENDER_ENV), lookup(DEMO_RECEIVER_ENV)) {
            (Some(sender), Some(receiver)) => Some((
                parse_account(DEMO_SENDER_ENV, &sender)?,
                parse_account(DEMO_RECEIVER_ENV, &receiver)?,
            )),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(DEMO_RECEIVER_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(DEMO_SENDER_ENV)),
        };

        let manifest = lookup(TOKEN_VARIANTS_FILE_ENV)
            .ok_or(ConfigError::Missing(TOKEN_VARIANTS_FILE_ENV))?;
        let variants = load_variants(Path::new(&manifest))?;

        let transfer_amount = match lookup(TRANSFER_AMOUNT_ENV) {
            Some(raw) => U256::from_str(raw.trim()).map_err(|e| ConfigError::Invalid {
                var: TRANSFER_AMOUNT_ENV,
                reason: e.to_string(),
            })?,
            None => U256::from(DEFAULT_TRANSFER_AMOUNT),
        };
        if transfer_amount.is_zero() {
            return Err(ConfigError::Invalid {
                var: TRANSFER_AMOUNT_ENV,
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            network,
            accounts,
            variants,
            transfer_amount,
        })
    }
}

#[derive(Debug, Deserialize)]
struct VariantManifest {
    variants: Vec<VariantEntry>,
}

#[derive(Debug, Deserialize)]
struct VariantEntry {
    name: String,
    bytecode: Bytes,
    #[serde(default)]
    abi: Option<JsonAbi>,
}

/// Read and validate a variant manifest file.
pub fn load_variants(path: &Path) -> Result<Vec<ContractVariant>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Manifest {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_variants(&raw).map_err(|reason| ConfigError::Manifest {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parse a manifest document, preserving variant order.
pub fn parse_variants(raw: &str) -> Result<Vec<ContractVariant>, String> {
    let manifest: VariantManifest = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    if manifest.variants.is_empty() {
        return Err("no variants declared".to_string());
    }

    let mut seen = HashSet::new();
    let mut variants = Vec::with_capacity(manifest.variants.len());
    for entry in manifest.variants {
        if entry.name.trim().is_empty() {
            return Err("variant with empty name".to_string());
        }
        if !seen.insert(entry.name.clone()) {
            return Err(format!("duplicate variant `{}`", entry.name));
        }
        if entry.bytecode.is_empty() {
            return Err(format!("variant `{}` has empty bytecode", entry.name));
        }

        let abi = entry.abi.unwrap_or_else(standard_abi);
        ensure_token_interface(&abi).map_err(|missing| {
            format!("variant `{}` ABI does not declare {missing}", entry.name)
        })?;

        variants.push(ContractVariant {
            name: entry.name,
            bytecode: entry.bytecode,
            abi,
        });
    }
    Ok(variants)
}

fn network_from(lookup: &impl Fn(&str) -> Option<String>) -> Result<NetworkConfig, ConfigError> {
    let rpc_url = lookup(RPC_URL_ENV).unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
    let receipt_timeout = match lookup(RECEIPT_TIMEOUT_ENV) {
        Some(raw) => positive_secs(RECEIPT_TIMEOUT_ENV, &raw)?,
        None => DEFAULT_RECEIPT_TIMEOUT,
    };
    Ok(NetworkConfig {
        rpc_url,
        receipt_timeout,
    })
}

fn parse_account(var: &'static str, raw: &str) -> Result<Account, ConfigError> {
    Account::from_str(raw.trim()).map_err(|e| ConfigError::Invalid {
        var,
        reason: format!("`{}` is not an address: {e}", raw.trim()),
    })
}

fn parse_account_list(var: &'static str, raw: &str) -> Result<Vec<Account>, ConfigError> {
    let accounts = raw
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| parse_account(var, part))
        .collect::<Result<Vec<_>, _>>()?;
    if accounts.is_empty() {
        return Err(ConfigError::Invalid {
            var,
            reason: "no accounts listed".to_string(),
        });
    }
    Ok(accounts)
}

fn positive_secs(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: f64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        reason: format!("`{raw}` is not a number of seconds"),
    })?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::Invalid {
            var,
            reason: "must be positive".to_string(),
        });
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("Invalid variant manifest {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },
}
