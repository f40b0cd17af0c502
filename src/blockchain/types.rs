// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger types shared by the watcher and the token demo.

use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, Bytes, B256, U256};

/// An address identifying a holder of balance on the ledger.
pub type Account = Address;

/// Amount held by an account, in the smallest denomination.
pub type Balance = U256;

/// Chain progress as reported by the node.
pub type BlockHeight = u64;

/// Node connection settings.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL
    pub rpc_url: String,
    /// Upper bound on how long a receipt is awaited
    pub receipt_timeout: std::time::Duration,
}

/// Default JSON-RPC endpoint of a local development node.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Result of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Transaction hash
    pub tx_hash: B256,
    /// Block the transaction was included in
    pub block_number: Option<u64>,
    /// Address of the contract created by a deployment, if any
    pub contract_address: Option<Address>,
    /// Whether execution succeeded
    pub success: bool,
}

/// A named token contract to deploy and exercise.
#[derive(Debug, Clone)]
pub struct ContractVariant {
    /// Display name (e.g. "evm", "wasm")
    pub name: String,
    /// Creation bytecode sent as the deployment payload
    pub bytecode: Bytes,
    /// Interface descriptor; must declare `balanceOf` and `transfer`.
    ///
    /// Checked once when the manifest is loaded. Calls are always encoded
    /// from the built-in ERC-20 interface, never from this descriptor.
    pub abi: JsonAbi,
}

impl ContractVariant {
    /// Build a variant that uses the standard ERC-20 interface.
    pub fn erc20(name: impl Into<String>, bytecode: Bytes) -> Self {
        Self {
            name: name.into(),
            bytecode,
            abi: super::erc20::standard_abi(),
        }
    }
}
