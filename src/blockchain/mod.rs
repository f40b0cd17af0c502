// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger access for the watcher and the token demo.
//!
//! This module provides:
//! - The [`ChainClient`] seam both flows are written against
//! - A JSON-RPC implementation over alloy ([`RpcChainClient`])
//! - ERC-20 call encoding for deployed token variants

pub mod client;
pub mod erc20;
pub mod rpc;
pub mod types;

pub use client::{ChainClient, ChainClientError};
pub use erc20::MethodCall;
pub use rpc::RpcChainClient;
pub use types::*;
