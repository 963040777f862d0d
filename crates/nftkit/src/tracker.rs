//! Transaction tracker
//!
//! Correlates the transaction a workflow submitted with the receipt the ledger eventually
//! returns for it.

use nftkit_common::{Error, Receipt, TransactionId};
use serde::{Deserialize, Serialize};

/// Snapshot of the transaction a workflow is waiting on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionHandle {
    /// Submitted transaction
    pub id: Option<TransactionId>,
    /// Last receipt observed for `id`
    pub last_receipt: Option<Receipt>,
    /// Receipt for `id` not observed yet
    pub awaiting_result: bool,
}

/// Tracks at most one in-flight transaction
///
/// `awaiting_result` is only ever true while `id` is set and no receipt has been observed.
#[derive(Debug, Default)]
pub struct TransactionTracker {
    handle: TransactionHandle,
}

impl TransactionTracker {
    /// Create new empty [`TransactionTracker`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly submitted transaction
    pub fn submit(&mut self, id: TransactionId) -> Result<(), Error> {
        if self.handle.awaiting_result {
            let pending = self
                .handle
                .id
                .clone()
                .ok_or(Error::NoPendingTransaction)?;
            return Err(Error::AlreadyAwaiting(pending));
        }

        self.handle = TransactionHandle {
            id: Some(id),
            last_receipt: None,
            awaiting_result: true,
        };

        Ok(())
    }

    /// Record the receipt of the awaited transaction
    pub fn observe(&mut self, receipt: Receipt) -> Result<(), Error> {
        if !self.handle.awaiting_result {
            return Err(Error::NoPendingTransaction);
        }

        self.handle.last_receipt = Some(receipt);
        self.handle.awaiting_result = false;

        Ok(())
    }

    /// Whether a receipt is still awaited
    pub fn is_awaiting(&self) -> bool {
        self.handle.awaiting_result
    }

    /// Id of the awaited transaction, if any
    pub fn awaiting_id(&self) -> Option<&TransactionId> {
        if self.handle.awaiting_result {
            self.handle.id.as_ref()
        } else {
            None
        }
    }

    /// Last submitted transaction
    pub fn current_id(&self) -> Option<&TransactionId> {
        self.handle.id.as_ref()
    }

    /// Receipt observed for the last submitted transaction
    pub fn last_receipt(&self) -> Option<&Receipt> {
        self.handle.last_receipt.as_ref()
    }

    /// Copy of the tracked handle
    pub fn handle(&self) -> TransactionHandle {
        self.handle.clone()
    }
}
