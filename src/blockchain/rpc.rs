// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC chain client over an alloy HTTP provider.
//!
//! Transactions are submitted with `eth_sendTransaction` and signed by the
//! node, so only accounts unlocked on the node (dev accounts) can send.

use alloy::{
    network::Ethereum,
    primitives::Bytes,
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::{TransactionReceipt, TransactionRequest},
    transports::{RpcError, TransportError},
};
use async_trait::async_trait;

use super::client::{ChainClient, ChainClientError};
use super::erc20::MethodCall;
use super::types::{Account, Balance, BlockHeight, NetworkConfig, Receipt};

/// HTTP provider type with the recommended fillers.
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Chain client backed by a JSON-RPC node.
pub struct RpcChainClient {
    network: NetworkConfig,
    provider: HttpProvider,
}

impl RpcChainClient {
    /// Create a client for the configured endpoint.
    pub fn new(network: NetworkConfig) -> Result<Self, ChainClientError> {
        let url: url::Url = network.rpc_url.parse().map_err(|e: url::ParseError| {
            ChainClientError::InvalidRpcUrl(format!("{}: {}", network.rpc_url, e))
        })?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self { network, provider })
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Submit a transaction and wait (bounded) for it to be mined.
    async fn submit(
        &self,
        tx: TransactionRequest,
        on_error_resp: fn(String) -> ChainClientError,
    ) -> Result<Receipt, ChainClientError> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| rpc_failure(e, on_error_resp))?;

        let tx_hash = *pending.tx_hash();
        tracing::debug!(tx_hash = %tx_hash, "Transaction submitted, awaiting receipt");

        let receipt = pending
            .with_timeout(Some(self.network.receipt_timeout))
            .get_receipt()
            .await
            .map_err(|e| {
                ChainClientError::Transport(format!("Receipt for {tx_hash} not obtained: {e}"))
            })?;

        Ok(to_receipt(&receipt))
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn block_height(&self) -> Result<BlockHeight, ChainClientError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainClientError::Transport(e.to_string()))
    }

    async fn balance(&self, account: Account) -> Result<Balance, ChainClientError> {
        self.provider
            .get_balance(account)
            .await
            .map_err(|e| ChainClientError::Transport(e.to_string()))
    }

    async fn accounts(&self) -> Result<Vec<Account>, ChainClientError> {
        self.provider
            .get_accounts()
            .await
            .map_err(|e| ChainClientError::Transport(e.to_string()))
    }

    async fn send_transaction(
        &self,
        from: Account,
        payload: Bytes,
    ) -> Result<Receipt, ChainClientError> {
        self.submit(deploy_request(from, payload), ChainClientError::Rejected)
            .await
    }

    async fn call(&self, contract: Account, call: &MethodCall) -> Result<Bytes, ChainClientError> {
        let tx = TransactionRequest::default()
            .to(contract)
            .input(call.input.clone().into());

        self.provider
            .call(tx)
            .await
            .map_err(|e| rpc_failure(e, ChainClientError::Revert))
    }

    async fn send(
        &self,
        contract: Account,
        call: &MethodCall,
        from: Account,
    ) -> Result<Receipt, ChainClientError> {
        let tx = TransactionRequest::default()
            .from(from)
            .to(contract)
            .input(call.input.clone().into());

        self.submit(tx, ChainClientError::Revert).await
    }
}

/// Contract creation: no recipient, bytecode as input.
fn deploy_request(from: Account, payload: Bytes) -> TransactionRequest {
    TransactionRequest::default()
        .from(from)
        .input(payload.into())
        .create()
}

/// Split node-side error responses from transport failures.
fn rpc_failure(err: TransportError, on_error_resp: fn(String) -> ChainClientError) -> ChainClientError {
    match err {
        RpcError::ErrorResp(payload) => on_error_resp(payload.message.to_string()),
        other => ChainClientError::Transport(other.to_string()),
    }
}

fn to_receipt(receipt: &TransactionReceipt) -> Receipt {
    Receipt {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        contract_address: receipt.contract_address,
        success: receipt.status(),
    }
}
