// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 call encoding and interface checks.
//!
//! Token contracts are driven through ABI-encoded [`MethodCall`]s so the
//! [`ChainClient`](super::ChainClient) seam stays transport-agnostic.

use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use super::client::ChainClientError;
use super::types::{Account, Balance};

// Only the two methods the demo exercises are needed.
sol! {
    #[sol(abi)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Signature every deployable variant must expose for balance reads.
pub const BALANCE_OF_SIGNATURE: &str = "balanceOf(address)";

/// Signature every deployable variant must expose for transfers.
pub const TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";

/// An ABI-encoded contract invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    /// Human-readable signature, used in reports and error context
    pub signature: &'static str,
    /// Selector followed by the encoded arguments
    pub input: Bytes,
}

impl MethodCall {
    fn encode<C: SolCall>(call: &C) -> Self {
        Self {
            signature: C::SIGNATURE,
            input: call.abi_encode().into(),
        }
    }

    /// Read-only `balanceOf(account)`.
    pub fn balance_of(account: Account) -> Self {
        Self::encode(&IERC20::balanceOfCall { account })
    }

    /// State-changing `transfer(to, amount)`.
    pub fn transfer(to: Account, amount: U256) -> Self {
        Self::encode(&IERC20::transferCall { to, amount })
    }
}

/// Decode the return data of a `balanceOf` call.
pub fn decode_balance(raw: &Bytes) -> Result<Balance, ChainClientError> {
    IERC20::balanceOfCall::abi_decode_returns(raw)
        .map_err(|e| ChainClientError::Decode(format!("balanceOf returned {} bytes: {e}", raw.len())))
}

/// The standard ERC-20 subset used when a variant ships no ABI of its own.
///
/// Generated from the same interface that encodes [`MethodCall`]s.
pub fn standard_abi() -> JsonAbi {
    IERC20::abi::contract()
}

/// Check that an interface declares both methods the demo invokes.
///
/// Returns the first missing signature.
pub fn ensure_token_interface(abi: &JsonAbi) -> Result<(), &'static str> {
    for required in [BALANCE_OF_SIGNATURE, TRANSFER_SIGNATURE] {
        let name = required.split('(').next().unwrap_or(required);
        let declared = abi
            .function(name)
            .map(|overloads| overloads.iter().any(|f| f.signature() == required))
            .unwrap_or(false);
        if !declared {
            return Err(required);
        }
    }
    Ok(())
}

/// Recover the account argument of an encoded `balanceOf` call.
pub fn balance_of_argument(input: &[u8]) -> Option<Address> {
    if !input.starts_with(&IERC20::balanceOfCall::SELECTOR) {
        return None;
    }
    IERC20::balanceOfCall::abi_decode(input)
        .ok()
        .map(|call| call.account)
}

/// Recover the `(to, amount)` arguments of an encoded `transfer` call.
pub fn transfer_arguments(input: &[u8]) -> Option<(Address, U256)> {
    if !input.starts_with(&IERC20::transferCall::SELECTOR) {
        return None;
    }
    IERC20::transferCall::abi_decode(input)
        .ok()
        .map(|call| (call.to, call.amount))
}
