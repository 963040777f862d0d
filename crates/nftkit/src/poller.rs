//! Polling loop
//!
//! The ledger has no push notifications, so every pending transaction is looked up once per
//! interval until its receipt shows up.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use nftkit_common::{Error, LedgerReader, Receipt, TransactionId};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Default poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Something waiting on a transaction receipt
#[async_trait]
pub trait ConfirmationTarget: Debug + Send + Sync {
    /// Name used in logs
    fn label(&self) -> &str;

    /// Transaction whose receipt is awaited, `None` when nothing is pending
    async fn awaiting_transaction(&self) -> Option<TransactionId>;

    /// Hand over the receipt of the awaited transaction
    async fn resolve(&self, id: &TransactionId, receipt: Receipt) -> Result<(), Error>;
}

/// Result of polling one target during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing awaited, the ledger was not queried
    Idle,
    /// Transaction known but not executed yet
    Pending,
    /// Ledger query failed, retried next tick
    QueryFailed,
    /// Receipt handed over to the target
    Resolved {
        /// Receipt success flag
        success: bool,
    },
    /// Target could not process the receipt
    ResolveFailed,
}

/// Periodic receipt poller
#[derive(Debug)]
pub struct PollingLoop {
    ledger: Arc<dyn LedgerReader>,
    targets: Vec<Arc<dyn ConfirmationTarget>>,
    interval: Duration,
}

impl PollingLoop {
    /// Create new [`PollingLoop`]
    ///
    /// A zero interval falls back to [`DEFAULT_POLL_INTERVAL`].
    pub fn new(ledger: Arc<dyn LedgerReader>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            tracing::warn!(
                "Zero poll interval, polling every {:?} instead",
                DEFAULT_POLL_INTERVAL
            );
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };

        Self {
            ledger,
            targets: Vec::new(),
            interval,
        }
    }

    /// Add a target checked on every tick
    pub fn register(&mut self, target: Arc<dyn ConfirmationTarget>) {
        self.targets.push(target);
    }

    /// Poll interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check every registered target once
    ///
    /// Targets are polled concurrently, the returned outcomes are in registration order.
    pub async fn tick(&self) -> Vec<PollOutcome> {
        join_all(
            self.targets
                .iter()
                .map(|target| self.poll_target(target.as_ref())),
        )
        .await
    }

    async fn poll_target(&self, target: &dyn ConfirmationTarget) -> PollOutcome {
        let Some(id) = target.awaiting_transaction().await else {
            return PollOutcome::Idle;
        };

        let transaction = match self.ledger.get_transaction(&id).await {
            Ok(transaction) => transaction,
            Err(err) => {
                tracing::warn!(
                    "Could not query {} transaction {}: {}",
                    target.label(),
                    id,
                    err
                );
                return PollOutcome::QueryFailed;
            }
        };

        let Some(receipt) = transaction.receipt else {
            tracing::trace!("{} transaction {} still pending", target.label(), id);
            return PollOutcome::Pending;
        };

        let success = receipt.success;

        match target.resolve(&id, receipt).await {
            Ok(()) => {
                tracing::info!(
                    "{} transaction {} resolved, success: {}",
                    target.label(),
                    id,
                    success
                );
                PollOutcome::Resolved { success }
            }
            Err(err) => {
                tracing::error!(
                    "Could not process receipt of {} transaction {}: {}",
                    target.label(),
                    id,
                    err
                );
                PollOutcome::ResolveFailed
            }
        }
    }

    /// Tick once per interval until `cancel` fires
    ///
    /// A tick always completes before the next one starts, intervals missed by a slow tick are
    /// skipped.
    pub async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    break;
                }
                _ = interval.tick() => {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            break;
                        }
                        _ = self.tick() => {}
                    }
                }
            }
        }

        tracing::debug!("Polling loop stopped");
    }

    /// Run the loop on a background task
    pub fn spawn(self) -> PollingHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(cancel.clone()));

        PollingHandle { cancel, task }
    }
}

/// Handle to a spawned [`PollingLoop`]
///
/// Polling stops when the handle is dropped.
#[derive(Debug)]
pub struct PollingHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollingHandle {
    /// Stop polling and wait for the loop to exit
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Err(err) = (&mut self.task).await {
            tracing::warn!("Polling task ended abnormally: {}", err);
        }
    }

    /// Whether the loop has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollingHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
