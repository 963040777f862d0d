//! Watch a transaction submitted outside of the workflows

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nftkit_common::{Error, Receipt, TransactionId};
use tokio::sync::{watch, Mutex};

use crate::poller::ConfirmationTarget;
use crate::tracker::TransactionTracker;

/// Tracks a single transaction until its receipt is observed
#[derive(Debug, Clone)]
pub struct TransactionWatch {
    inner: Arc<WatchInner>,
}

#[derive(Debug)]
struct WatchInner {
    label: String,
    tracker: Mutex<TransactionTracker>,
    receipt: watch::Sender<Option<Receipt>>,
}

impl TransactionWatch {
    /// Start watching `id`
    pub fn new<S: Into<String>>(label: S, id: TransactionId) -> Result<Self, Error> {
        let mut tracker = TransactionTracker::new();
        tracker.submit(id)?;

        let (receipt, _) = watch::channel(None);

        Ok(Self {
            inner: Arc::new(WatchInner {
                label: label.into(),
                tracker: Mutex::new(tracker),
                receipt,
            }),
        })
    }

    /// Receipt, once observed
    pub fn receipt(&self) -> Option<Receipt> {
        self.inner.receipt.borrow().clone()
    }

    /// Wait for the receipt
    pub async fn wait_for_receipt(&self, timeout: Duration) -> Result<Receipt, Error> {
        let mut receipt = self.inner.receipt.subscribe();

        tokio::time::timeout(timeout, async move {
            let observed = receipt
                .wait_for(Option::is_some)
                .await
                .map_err(|_| Error::Custom("transaction watch dropped".to_string()))?;
            observed.clone().ok_or(Error::NoPendingTransaction)
        })
        .await
        .map_err(|_| Error::Timeout)?
    }
}

#[async_trait]
impl ConfirmationTarget for TransactionWatch {
    fn label(&self) -> &str {
        &self.inner.label
    }

    async fn awaiting_transaction(&self) -> Option<TransactionId> {
        self.inner.tracker.lock().await.awaiting_id().cloned()
    }

    async fn resolve(&self, id: &TransactionId, receipt: Receipt) -> Result<(), Error> {
        let mut tracker = self.inner.tracker.lock().await;

        if tracker.awaiting_id() != Some(id) {
            return Err(Error::NoPendingTransaction);
        }

        tracker.observe(receipt.clone())?;
        self.inner.receipt.send_replace(Some(receipt));

        Ok(())
    }
}
