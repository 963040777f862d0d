//! Errors

use thiserror::Error;

use crate::state;
use crate::types::TransactionId;

/// nftkit Error
#[derive(Debug, Error)]
pub enum Error {
    /// An asset could not be stored, the whole mint attempt is aborted
    #[error("Asset upload failed: {0}")]
    UploadFailed(String),
    /// Ledger query failed, retried on the next poll
    #[error("Ledger query failed: {0}")]
    LedgerQuery(String),
    /// Ledger refused to accept a transaction submission
    #[error("Transaction submission failed: {0}")]
    SubmissionFailed(String),
    /// Receipt does not carry the expected event parameters
    #[error("Malformed receipt: {0}")]
    MalformedReceipt(String),
    /// A transaction is already awaiting its receipt on this tracker
    #[error("Transaction `{0}` is still awaiting its receipt")]
    AlreadyAwaiting(TransactionId),
    /// Receipt observed while no transaction is awaited
    #[error("No pending transaction")]
    NoPendingTransaction,
    /// Operation started before its preconditions hold
    #[error("Precondition not met: {0}")]
    PreconditionNotMet(String),
    /// Decoding not available for this receipt kind
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
    /// Auction duration cannot be expressed in blocks
    #[error("Invalid auction duration")]
    InvalidDuration,
    /// Price list does not match the token list
    #[error("Price list has {prices} entries for {tokens} tokens")]
    PriceListMismatch {
        /// Number of tokens
        tokens: usize,
        /// Number of prices
        prices: usize,
    },
    /// Operation timeout
    #[error("Operation timeout")]
    Timeout,
    /// Http transport error
    #[error("Http error: {0}")]
    HttpError(String),
    /// State machine error
    #[error(transparent)]
    StateTransition(#[from] state::Error),
    /// Serde Json error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Custom error
    #[error("`{0}`")]
    Custom(String),
}

impl Error {
    /// Whether the error is transient and the operation may be retried as is
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::LedgerQuery(_) | Self::HttpError(_) | Self::Timeout)
    }
}
