// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory ledger and report capture shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;

use crate::blockchain::erc20::{balance_of_argument, transfer_arguments};
use crate::blockchain::{
    Account, Balance, BlockHeight, ChainClient, ChainClientError, MethodCall, Receipt,
};
use crate::report::{ReportLine, ReportSink};

/// Token supply credited to the deployer of every mock contract.
pub const INITIAL_SUPPLY: u64 = 100;

#[derive(Default)]
struct Ledger {
    height: BlockHeight,
    native: HashMap<Address, Balance>,
    tokens: HashMap<Address, HashMap<Address, Balance>>,
    bytecodes: HashMap<Address, Bytes>,
    deployed: u8,
    calls: Vec<&'static str>,
}

/// Scripted [`ChainClient`] with call counting and failure injection.
#[derive(Default)]
pub struct MockChain {
    accounts: Vec<Account>,
    ledger: Mutex<Ledger>,
    fail_on_call: Option<(usize, ChainClientError)>,
    deploy_failures: HashMap<Bytes, ChainClientError>,
    transfer_failures: HashMap<Bytes, ChainClientError>,
    failed_transfer_status: bool,
}

impl MockChain {
    pub fn new(height: BlockHeight) -> Self {
        let chain = Self::default();
        chain.ledger.lock().unwrap().height = height;
        chain
    }

    /// Register an account with a native balance; it is also reported by
    /// `accounts()`.
    pub fn with_account(mut self, account: Account, balance: u64) -> Self {
        self.accounts.push(account);
        self.ledger
            .lock()
            .unwrap()
            .native
            .insert(account, U256::from(balance));
        self
    }

    /// Fail the `k`-th client call (1-based) with `error`.
    pub fn fail_on_call(mut self, k: usize, error: ChainClientError) -> Self {
        self.fail_on_call = Some((k, error));
        self
    }

    /// Fail deployments of this bytecode.
    pub fn fail_deploy(mut self, bytecode: Bytes, error: ChainClientError) -> Self {
        self.deploy_failures.insert(bytecode, error);
        self
    }

    /// Fail transfers on contracts deployed from this bytecode.
    pub fn fail_transfer(mut self, bytecode: Bytes, error: ChainClientError) -> Self {
        self.transfer_failures.insert(bytecode, error);
        self
    }

    /// Mine transfers but report a failed receipt status.
    pub fn with_failed_transfer_status(mut self) -> Self {
        self.failed_transfer_status = true;
        self
    }

    /// Names of the client methods invoked so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.ledger.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.ledger.lock().unwrap().calls.len()
    }

    /// Token balance held on a deployed mock contract.
    pub fn token_balance(&self, contract: Address, account: Address) -> Balance {
        self.ledger
            .lock()
            .unwrap()
            .tokens
            .get(&contract)
            .and_then(|holders| holders.get(&account).copied())
            .unwrap_or_default()
    }

    fn record(&self, method: &'static str) -> Result<(), ChainClientError> {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.calls.push(method);
        match &self.fail_on_call {
            Some((k, error)) if *k == ledger.calls.len() => Err(error.clone()),
            _ => Ok(()),
        }
    }

    fn mined(ledger: &mut Ledger, contract_address: Option<Address>, success: bool) -> Receipt {
        ledger.height += 1;
        Receipt {
            tx_hash: B256::with_last_byte(ledger.height as u8),
            block_number: Some(ledger.height),
            contract_address,
            success,
        }
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn block_height(&self) -> Result<BlockHeight, ChainClientError> {
        self.record("block_height")?;
        Ok(self.ledger.lock().unwrap().height)
    }

    async fn balance(&self, account: Account) -> Result<Balance, ChainClientError> {
        self.record("balance")?;
        self.ledger
            .lock()
            .unwrap()
            .native
            .get(&account)
            .copied()
            .ok_or(ChainClientError::UnknownAccount(account))
    }

    async fn accounts(&self) -> Result<Vec<Account>, ChainClientError> {
        self.record("accounts")?;
        Ok(self.accounts.clone())
    }

    async fn send_transaction(
        &self,
        from: Account,
        payload: Bytes,
    ) -> Result<Receipt, ChainClientError> {
        self.record("send_transaction")?;
        if let Some(error) = self.deploy_failures.get(&payload) {
            return Err(error.clone());
        }
        let mut ledger = self.ledger.lock().unwrap();
        // Deployments get addresses 0x..01, 0x..02, ... in order.
        ledger.deployed += 1;
        let contract = Address::with_last_byte(ledger.deployed);
        ledger
            .tokens
            .insert(contract, HashMap::from([(from, U256::from(INITIAL_SUPPLY))]));
        ledger.bytecodes.insert(contract, payload);
        Ok(Self::mined(&mut ledger, Some(contract), true))
    }

    async fn call(&self, contract: Account, call: &MethodCall) -> Result<Bytes, ChainClientError> {
        self.record("call")?;
        let account = balance_of_argument(&call.input)
            .ok_or_else(|| ChainClientError::Revert(format!("unsupported call {}", call.signature)))?;
        let ledger = self.ledger.lock().unwrap();
        let holders = ledger
            .tokens
            .get(&contract)
            .ok_or_else(|| ChainClientError::Revert(format!("no contract at {contract}")))?;
        let balance = holders.get(&account).copied().unwrap_or_default();
        Ok(Bytes::from(balance.to_be_bytes::<32>().to_vec()))
    }

    async fn send(
        &self,
        contract: Account,
        call: &MethodCall,
        from: Account,
    ) -> Result<Receipt, ChainClientError> {
        self.record("send")?;
        let (to, amount) = transfer_arguments(&call.input)
            .ok_or_else(|| ChainClientError::Revert(format!("unsupported call {}", call.signature)))?;

        let mut ledger = self.ledger.lock().unwrap();
        if let Some(error) = ledger
            .bytecodes
            .get(&contract)
            .and_then(|bytecode| self.transfer_failures.get(bytecode))
        {
            return Err(error.clone());
        }
        if self.failed_transfer_status {
            return Ok(Self::mined(&mut ledger, None, false));
        }

        let holders = ledger
            .tokens
            .get_mut(&contract)
            .ok_or_else(|| ChainClientError::Revert(format!("no contract at {contract}")))?;
        let from_balance = holders.get(&from).copied().unwrap_or_default();
        if from_balance < amount {
            return Err(ChainClientError::Revert("transfer amount exceeds balance".into()));
        }
        holders.insert(from, from_balance - amount);
        *holders.entry(to).or_default() += amount;
        Ok(Self::mined(&mut ledger, None, true))
    }
}

/// Captures report lines for assertions.
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<ReportLine>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<ReportLine> {
        self.lines.lock().unwrap().clone()
    }
}

impl ReportSink for RecordingSink {
    fn emit(&self, line: ReportLine) {
        self.lines.lock().unwrap().push(line);
    }
}
