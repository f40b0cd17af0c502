// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The chain client seam used by both flows.

use alloy::primitives::Bytes;
use async_trait::async_trait;

use super::erc20::MethodCall;
use super::types::{Account, Balance, BlockHeight, Receipt};

/// RPC access to a ledger node.
///
/// Implementations are injected into the watcher and the token demo; the
/// flows never reach for a global handle. Each method is one suspension
/// point and the flows never issue two calls at once.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current chain height.
    async fn block_height(&self) -> Result<BlockHeight, ChainClientError>;

    /// Native balance of an account at the latest block.
    async fn balance(&self, account: Account) -> Result<Balance, ChainClientError>;

    /// Accounts the node can sign for.
    async fn accounts(&self) -> Result<Vec<Account>, ChainClientError>;

    /// Submit a contract creation carrying `payload` from `from` and wait
    /// for its receipt.
    async fn send_transaction(
        &self,
        from: Account,
        payload: Bytes,
    ) -> Result<Receipt, ChainClientError>;

    /// Read-only contract call. Returns the raw return data.
    async fn call(&self, contract: Account, call: &MethodCall) -> Result<Bytes, ChainClientError>;

    /// State-changing contract call signed by `from`. Waits for the receipt.
    async fn send(
        &self,
        contract: Account,
        call: &MethodCall,
        from: Account,
    ) -> Result<Receipt, ChainClientError>;
}

/// Errors that can occur during chain operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unknown account: {0}")]
    UnknownAccount(Account),

    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Execution reverted: {0}")]
    Revert(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl ChainClientError {
    /// Network or timeout failure; the request may succeed if repeated.
    pub fn is_transient(&self) -> bool {
        matches!(self, ChainClientError::Transport(_))
    }
}
