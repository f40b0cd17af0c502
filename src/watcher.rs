// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Balance Watcher
//!
//! Periodically reports the chain height and the native balance of a fixed
//! list of accounts.
//!
//! ## Strategy
//!
//! Every `interval` the watcher:
//! 1. Reads the current block height and reports it.
//! 2. Reads each account's balance, in configured order, and reports it.
//! 3. Sleeps until the next iteration.
//!
//! A failed read ends the loop; there is no retry.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken`. Cancellation is honoured at the
//! top of an iteration and during the sleep, never in the middle of a report.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::blockchain::{Account, Balance, BlockHeight, ChainClient, ChainClientError};
use crate::report::{ReportLine, ReportSink};

/// Interval used by the original balance script.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(6);

/// What one iteration observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSnapshot {
    pub height: BlockHeight,
    pub balances: Vec<(Account, Balance)>,
}

/// Height and balance poller for a fixed account list.
pub struct BalanceWatcher {
    client: Arc<dyn ChainClient>,
    accounts: Vec<Account>,
    poll_interval: Duration,
    sink: Arc<dyn ReportSink>,
}

impl BalanceWatcher {
    /// Create a watcher for a non-empty account list and a positive interval.
    pub fn new(
        client: Arc<dyn ChainClient>,
        accounts: Vec<Account>,
        poll_interval: Duration,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self, WatcherError> {
        if accounts.is_empty() {
            return Err(WatcherError::NoAccounts);
        }
        if poll_interval.is_zero() {
            return Err(WatcherError::ZeroInterval);
        }

        Ok(Self {
            client,
            accounts,
            poll_interval,
            sink,
        })
    }

    /// Accounts reported each iteration, in order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Run the watcher loop until the cancellation token is triggered or a
    /// read fails.
    ///
    /// Can be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(watcher.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), WatcherError> {
        info!(
            accounts = self.accounts.len(),
            interval_secs = self.poll_interval.as_secs_f64(),
            "Balance watcher starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Balance watcher shutting down");
                return Ok(());
            }

            self.poll_once().await?;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Balance watcher shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Execute one iteration: report the height, then every balance.
    pub async fn poll_once(&self) -> Result<PollSnapshot, WatcherError> {
        let height = self
            .client
            .block_height()
            .await
            .map_err(WatcherError::Height)?;
        self.sink.emit(ReportLine::Height(height));

        let mut balances = Vec::with_capacity(self.accounts.len());
        for &account in &self.accounts {
            let balance = self
                .client
                .balance(account)
                .await
                .map_err(|source| WatcherError::Balance { account, source })?;
            self.sink.emit(ReportLine::AccountBalance { account, balance });
            balances.push((account, balance));
        }

        debug!(height, accounts = balances.len(), "Balance watcher iteration complete");

        Ok(PollSnapshot { height, balances })
    }
}

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    #[error("At least one account must be watched")]
    NoAccounts,

    #[error("Polling interval must be positive")]
    ZeroInterval,

    #[error("Fetching block height failed: {0}")]
    Height(#[source] ChainClientError),

    #[error("Fetching balance of {account} failed: {source}")]
    Balance {
        account: Account,
        #[source]
        source: ChainClientError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockChain, RecordingSink};
    use alloy::primitives::{address, U256};

    const ALICE: Account = address!("6be02d1d3665660d22ff9624b7be0551ee1ac91b");
    const BOB: Account = address!("1cca28600d7491365520b31b466f88647b9839ec");
    const CAROL: Account = address!("00000000000000000000000000000000000000c0");

    fn chain() -> MockChain {
        MockChain::new(7)
            .with_account(ALICE, 1_000)
            .with_account(BOB, 2_000)
            .with_account(CAROL, 0)
    }

    fn watcher(
        chain: Arc<MockChain>,
        accounts: Vec<Account>,
    ) -> (BalanceWatcher, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let watcher =
            BalanceWatcher::new(chain, accounts, Duration::from_secs(6), sink.clone()).unwrap();
        (watcher, sink)
    }

    #[test]
    fn rejects_empty_account_list() {
        let err = BalanceWatcher::new(
            Arc::new(chain()),
            Vec::new(),
            Duration::from_secs(1),
            Arc::new(RecordingSink::default()),
        )
        .err()
        .unwrap();
        assert!(matches!(err, WatcherError::NoAccounts));
    }

    #[test]
    fn rejects_zero_interval() {
        let err = BalanceWatcher::new(
            Arc::new(chain()),
            vec![ALICE],
            Duration::ZERO,
            Arc::new(RecordingSink::default()),
        )
        .err()
        .unwrap();
        assert!(matches!(err, WatcherError::ZeroInterval));
    }

    #[tokio::test]
    async fn iteration_reports_height_then_balances_in_order() {
        let chain = Arc::new(chain());
        let (watcher, sink) = watcher(chain.clone(), vec![CAROL, ALICE, BOB]);

        let snapshot = watcher.poll_once().await.unwrap();

        assert_eq!(
            sink.lines(),
            vec![
                ReportLine::Height(7),
                ReportLine::AccountBalance { account: CAROL, balance: U256::ZERO },
                ReportLine::AccountBalance { account: ALICE, balance: U256::from(1_000u64) },
                ReportLine::AccountBalance { account: BOB, balance: U256::from(2_000u64) },
            ]
        );
        assert_eq!(snapshot.height, 7);
        assert_eq!(snapshot.balances.len(), 3);
        assert_eq!(chain.calls(), vec!["block_height", "balance", "balance", "balance"]);
    }

    #[tokio::test]
    async fn every_iteration_starts_with_height() {
        for accounts in [vec![ALICE], vec![BOB, ALICE], vec![ALICE, BOB, CAROL, ALICE]] {
            let (watcher, sink) = watcher(Arc::new(chain()), accounts.clone());
            watcher.poll_once().await.unwrap();

            let lines = sink.lines();
            assert_eq!(lines.len(), accounts.len() + 1);
            assert!(matches!(lines[0], ReportLine::Height(_)));
            let reported: Vec<Account> = lines[1..]
                .iter()
                .map(|line| match line {
                    ReportLine::AccountBalance { account, .. } => *account,
                    other => panic!("unexpected line {other:?}"),
                })
                .collect();
            assert_eq!(reported, accounts);
        }
    }

    #[tokio::test]
    async fn failure_on_kth_call_stops_the_loop() {
        // Iteration 1 makes calls 1..=3; the second balance of iteration 2 is call 6.
        let chain = Arc::new(
            chain().fail_on_call(6, ChainClientError::Transport("connection reset".into())),
        );
        let (watcher, sink) = watcher(chain.clone(), vec![ALICE, BOB]);

        tokio::time::pause();
        let err = watcher.run(CancellationToken::new()).await.unwrap_err();

        match err {
            WatcherError::Balance { account, source } => {
                assert_eq!(account, BOB);
                assert!(source.is_transient());
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(chain.call_count(), 6);
        // Iteration 2 reported its height and first balance before failing.
        assert_eq!(sink.lines().len(), 3 + 2);
    }

    #[tokio::test]
    async fn height_failure_emits_nothing() {
        let chain = Arc::new(chain().fail_on_call(1, ChainClientError::Transport("down".into())));
        let (watcher, sink) = watcher(chain.clone(), vec![ALICE]);

        let err = watcher.poll_once().await.unwrap_err();

        assert!(matches!(err, WatcherError::Height(_)));
        assert_eq!(chain.call_count(), 1);
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn unknown_account_is_surfaced() {
        let stranger = address!("00000000000000000000000000000000deadbeef");
        let (watcher, _sink) = watcher(Arc::new(chain()), vec![ALICE, stranger]);

        let err = watcher.poll_once().await.unwrap_err();

        match err {
            WatcherError::Balance { account, source } => {
                assert_eq!(account, stranger);
                assert_eq!(source, ChainClientError::UnknownAccount(stranger));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_between_iterations_stops_output() {
        let chain = Arc::new(chain());
        let (watcher, sink) = watcher(chain.clone(), vec![ALICE, BOB]);
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(watcher.run(shutdown.clone()));

        // Let two iterations complete, then cancel during the sleep.
        tokio::time::sleep(Duration::from_secs(7)).await;
        assert_eq!(sink.lines().len(), 2 * 3);
        shutdown.cancel();

        let result = tokio::time::timeout(Duration::from_secs(6), handle)
            .await
            .expect("watcher should stop within one interval")
            .unwrap();
        assert!(result.is_ok());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(sink.lines().len(), 2 * 3);
        assert_eq!(chain.call_count(), 2 * 3);
    }

    #[tokio::test]
    async fn cancelled_before_start_makes_no_calls() {
        let chain = Arc::new(chain());
        let (watcher, sink) = watcher(chain.clone(), vec![ALICE]);
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        watcher.run(shutdown).await.unwrap();

        assert_eq!(chain.call_count(), 0);
        assert!(sink.lines().is_empty());
    }
}
