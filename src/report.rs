// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Textual report emitted by the watcher and the token demo.
//!
//! Reports are kept apart from diagnostic logging: they are the program's
//! output, written one line per observation to a [`ReportSink`].

use std::fmt;

use alloy::primitives::U256;

use crate::blockchain::{Account, Balance, BlockHeight};

/// One observation in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    /// Chain height at the start of a watcher iteration.
    Height(BlockHeight),
    /// Native balance of a watched account.
    AccountBalance { account: Account, balance: Balance },
    /// Signer accounts available to the token demo.
    Accounts(Vec<Account>),
    /// Native balance of the demo sender.
    SenderBalance { account: Account, balance: Balance },
    /// A token variant was deployed.
    ContractDeployed { variant: String, contract: Account },
    /// `balanceOf` result on a deployed variant.
    TokenBalance {
        contract: Account,
        account: Account,
        balance: Balance,
    },
    /// A token transfer was mined.
    Transfer {
        amount: U256,
        from: Account,
        to: Account,
    },
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportLine::Height(height) => write!(f, "block: {height}"),
            ReportLine::AccountBalance { account, balance } => {
                write!(f, "  account: {account}\n  balance: {balance}")
            }
            ReportLine::Accounts(accounts) => {
                let list: Vec<String> = accounts.iter().map(|a| a.to_string()).collect();
                write!(f, "accounts: [{}]", list.join(", "))
            }
            ReportLine::SenderBalance { account, balance } => {
                write!(f, "balance of {account}: {balance}")
            }
            ReportLine::ContractDeployed { variant, contract } => {
                write!(f, "ERC-20 {variant} contract created at {contract}")
            }
            ReportLine::TokenBalance {
                contract,
                account,
                balance,
            } => write!(f, "{contract}.balanceOf({account}) = {balance}"),
            ReportLine::Transfer { amount, from, to } => {
                write!(f, "Transfer {amount} token from {from} to {to}")
            }
        }
    }
}

/// Destination for report lines.
pub trait ReportSink: Send + Sync {
    fn emit(&self, line: ReportLine);
}

/// Writes each report line to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn emit(&self, line: ReportLine) {
        println!("{line}");
    }
}
