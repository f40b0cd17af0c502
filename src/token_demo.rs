// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Token Demo
//!
//! Deploys each configured ERC-20 variant and exercises one transfer on it.
//!
//! ## Per-variant sequence
//!
//! 1. Deploy the variant's bytecode from the sender and wait for the receipt.
//! 2. Read `balanceOf` for sender and receiver.
//! 3. `transfer(receiver, amount)` signed by the sender; wait for the receipt.
//! 4. Read both balances again.
//!
//! Each step requires the previous one to have succeeded.
//!
//! ## Failure policy
//!
//! A variant that fails because the chain rejected or reverted something is
//! recorded and the next variant is attempted. A transport failure (node
//! unreachable, receipt timeout) aborts the whole run, since every remaining
//! variant would need the same node.

use std::sync::Arc;

use alloy::primitives::U256;
use tracing::{info, warn};

use crate::blockchain::erc20::decode_balance;
use crate::blockchain::{
    Account, Balance, ChainClient, ChainClientError, ContractVariant, MethodCall, Receipt,
};
use crate::report::{ReportLine, ReportSink};

/// Units moved by each demo transfer. Token decimals are not applied.
pub const DEFAULT_TRANSFER_AMOUNT: u64 = 1;

/// The two accounts the demo moves tokens between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoAccounts {
    pub sender: Account,
    pub receiver: Account,
    /// Accounts listed in the preamble: everything the node offered when
    /// discovered, otherwise the configured pair.
    pub available: Vec<Account>,
}

impl DemoAccounts {
    pub fn new(sender: Account, receiver: Account) -> Result<Self, TokenDemoError> {
        if sender == receiver {
            return Err(TokenDemoError::SameAccount(sender));
        }
        Ok(Self {
            sender,
            receiver,
            available: vec![sender, receiver],
        })
    }

    /// Use the configured pair when given, otherwise the first two accounts
    /// the node can sign for.
    pub async fn resolve(
        client: &dyn ChainClient,
        configured: Option<(Account, Account)>,
    ) -> Result<Self, TokenDemoError> {
        if let Some((sender, receiver)) = configured {
            return Self::new(sender, receiver);
        }

        let available = client.accounts().await.map_err(TokenDemoError::Accounts)?;
        info!(count = available.len(), "Discovered signer accounts");
        let (sender, receiver) = match available.as_slice() {
            [sender, receiver, ..] => (*sender, *receiver),
            _ => {
                return Err(TokenDemoError::NotEnoughAccounts {
                    available: available.len(),
                })
            }
        };
        Ok(Self {
            available,
            ..Self::new(sender, receiver)?
        })
    }
}

/// Sender and receiver token balances at one point in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancePair {
    pub sender: Balance,
    pub receiver: Balance,
}

/// Everything observed for a variant that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantReport {
    pub contract: Account,
    pub before: BalancePair,
    pub after: BalancePair,
    pub transfer: Receipt,
    /// Whether the balances moved by exactly the transferred amount
    pub reconciled: bool,
}

/// Result of one variant, in run order.
#[derive(Debug)]
pub struct VariantOutcome {
    pub variant: String,
    pub result: Result<VariantReport, VariantError>,
}

/// Per-variant outcomes of a completed run.
#[derive(Debug, Default)]
pub struct DemoSummary {
    pub outcomes: Vec<VariantOutcome>,
}

impl DemoSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &VariantError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.variant.as_str(), e)))
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Deploys token variants and exercises a transfer on each.
pub struct TokenDemo {
    client: Arc<dyn ChainClient>,
    accounts: DemoAccounts,
    variants: Vec<ContractVariant>,
    amount: U256,
    sink: Arc<dyn ReportSink>,
}

impl TokenDemo {
    /// Variants run in the order given.
    pub fn new(
        client: Arc<dyn ChainClient>,
        accounts: DemoAccounts,
        variants: Vec<ContractVariant>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            client,
            accounts,
            variants,
            amount: U256::from(DEFAULT_TRANSFER_AMOUNT),
            sink,
        }
    }

    /// Override the amount moved by each transfer.
    pub fn with_transfer_amount(mut self, amount: U256) -> Self {
        self.amount = amount;
        self
    }

    /// Run every variant and collect the outcomes.
    ///
    /// Returns early only on a fatal (transport) failure.
    pub async fn run_all(&self) -> Result<DemoSummary, TokenDemoError> {
        let sender = self.accounts.sender;

        self.sink
            .emit(ReportLine::Accounts(self.accounts.available.clone()));
        let balance = self
            .client
            .balance(sender)
            .await
            .map_err(TokenDemoError::SenderBalance)?;
        self.sink.emit(ReportLine::SenderBalance {
            account: sender,
            balance,
        });

        let mut summary = DemoSummary::default();
        for variant in &self.variants {
            let result = self.run_variant(variant).await;

            if let Err(e) = &result {
                if e.is_fatal() {
                    return Err(TokenDemoError::Fatal {
                        variant: variant.name.clone(),
                        source: e.clone(),
                    });
                }
                warn!(variant = %variant.name, error = %e, "Token variant failed, continuing");
            }

            summary.outcomes.push(VariantOutcome {
                variant: variant.name.clone(),
                result,
            });
        }

        info!(
            variants = summary.outcomes.len(),
            succeeded = summary.succeeded(),
            "Token demo finished"
        );

        Ok(summary)
    }

    /// Deploy one variant, then read, transfer and read again.
    pub async fn run_variant(
        &self,
        variant: &ContractVariant,
    ) -> Result<VariantReport, VariantError> {
        let DemoAccounts {
            sender, receiver, ..
        } = self.accounts;

        let contract = self.deploy(variant).await?;
        self.sink.emit(ReportLine::ContractDeployed {
            variant: variant.name.clone(),
            contract,
        });

        let before = self.balances(contract).await?;

        let call = MethodCall::transfer(receiver, self.amount);
        let transfer = self
            .client
            .send(contract, &call, sender)
            .await
            .map_err(|source| VariantError::Transfer { contract, source })?;
        if !transfer.success {
            return Err(VariantError::Transfer {
                contract,
                source: ChainClientError::Revert(format!(
                    "receipt {} reports failure",
                    transfer.tx_hash
                )),
            });
        }
        self.sink.emit(ReportLine::Transfer {
            amount: self.amount,
            from: sender,
            to: receiver,
        });

        let after = self.balances(contract).await?;

        let reconciled = reconciles(before, after, self.amount);
        if !reconciled {
            warn!(
                variant = %variant.name,
                contract = %contract,
                "Balances did not move by the transferred amount"
            );
        }

        Ok(VariantReport {
            contract,
            before,
            after,
            transfer,
            reconciled,
        })
    }

    async fn deploy(&self, variant: &ContractVariant) -> Result<Account, VariantError> {
        let deployment = |source| VariantError::Deployment {
            variant: variant.name.clone(),
            source,
        };

        let receipt = self
            .client
            .send_transaction(self.accounts.sender, variant.bytecode.clone())
            .await
            .map_err(deployment)?;

        match (receipt.success, receipt.contract_address) {
            (true, Some(contract)) => {
                info!(
                    variant = %variant.name,
                    contract = %contract,
                    block = ?receipt.block_number,
                    "Token variant deployed"
                );
                Ok(contract)
            }
            (true, None) => Err(deployment(ChainClientError::Rejected(format!(
                "receipt {} carries no contract address",
                receipt.tx_hash
            )))),
            (false, _) => Err(deployment(ChainClientError::Rejected(format!(
                "receipt {} reports failure",
                receipt.tx_hash
            )))),
        }
    }

    async fn balances(&self, contract: Account) -> Result<BalancePair, VariantError> {
        let DemoAccounts {
            sender, receiver, ..
        } = self.accounts;
        Ok(BalancePair {
            sender: self.token_balance(contract, sender).await?,
            receiver: self.token_balance(contract, receiver).await?,
        })
    }

    async fn token_balance(
        &self,
        contract: Account,
        account: Account,
    ) -> Result<Balance, VariantError> {
        let query = |source| VariantError::BalanceQuery {
            contract,
            account,
            source,
        };

        let raw = self
            .client
            .call(contract, &MethodCall::balance_of(account))
            .await
            .map_err(query)?;
        let balance = decode_balance(&raw).map_err(query)?;

        self.sink.emit(ReportLine::TokenBalance {
            contract,
            account,
            balance,
        });
        Ok(balance)
    }
}

fn reconciles(before: BalancePair, after: BalancePair, amount: U256) -> bool {
    before.sender.checked_sub(amount) == Some(after.sender)
        && before.receiver.checked_add(amount) == Some(after.receiver)
}

// =============================================================================
// Error Types
// =============================================================================

/// Failure of a single variant's sequence.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VariantError {
    #[error("Deploying variant {variant} failed: {source}")]
    Deployment {
        variant: String,
        #[source]
        source: ChainClientError,
    },

    #[error("balanceOf({account}) on {contract} failed: {source}")]
    BalanceQuery {
        contract: Account,
        account: Account,
        #[source]
        source: ChainClientError,
    },

    #[error("Transfer on {contract} failed: {source}")]
    Transfer {
        contract: Account,
        #[source]
        source: ChainClientError,
    },
}

impl VariantError {
    /// The underlying chain client failure.
    pub fn chain_error(&self) -> &ChainClientError {
        match self {
            VariantError::Deployment { source, .. }
            | VariantError::BalanceQuery { source, .. }
            | VariantError::Transfer { source, .. } => source,
        }
    }

    /// Transport failures end the run; chain-level rejections end only the
    /// variant.
    pub fn is_fatal(&self) -> bool {
        self.chain_error().is_transient()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenDemoError {
    #[error("Listing signer accounts failed: {0}")]
    Accounts(#[source] ChainClientError),

    #[error("Token demo needs two signer accounts, node offers {available}")]
    NotEnoughAccounts { available: usize },

    #[error("Sender and receiver are the same account: {0}")]
    SameAccount(Account),

    #[error("Fetching sender balance failed: {0}")]
    SenderBalance(#[source] ChainClientError),

    #[error("Aborted at variant {variant}: {source}")]
    Fatal {
        variant: String,
        #[source]
        source: VariantError,
    },
}
