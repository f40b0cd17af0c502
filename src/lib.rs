// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger Scripts - EVM ledger client demonstrations
//!
//! Two independent flows share one injected [`blockchain::ChainClient`]:
//!
//! - `watcher` - reports block height and account balances on an interval
//! - `token_demo` - deploys ERC-20 variants and exercises a transfer on each
//!
//! ## Modules
//!
//! - `blockchain` - chain client seam, JSON-RPC implementation, ERC-20 encoding
//! - `config` - environment configuration and the variant manifest
//! - `report` - textual report lines and sinks
//! - `logging` - `tracing` subscriber setup

pub mod blockchain;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod token_demo;
pub mod watcher;

#[cfg(test)]
pub(crate) mod test_utils;
