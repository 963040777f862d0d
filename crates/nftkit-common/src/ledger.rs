//! Collaborator traits
//!
//! The workflows only ever talk to the ledger and to the content store through these traits.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Error;
use crate::types::{Asset, AuctionRequest, LedgerTransaction, StoredAsset, TransactionId};

/// Read side of a ledger
#[async_trait]
pub trait LedgerReader: Debug + Send + Sync {
    /// Look up a transaction by id
    ///
    /// A transaction the ledger has accepted but not executed yet is returned without receipt.
    /// Errors are considered transient, the caller retries on its own schedule.
    async fn get_transaction(&self, id: &TransactionId) -> Result<LedgerTransaction, Error>;
}

/// Ledger client able to submit the mint and auction transactions
#[async_trait]
pub trait LedgerClient: LedgerReader {
    /// Submit a mint transaction, one token per content link
    async fn submit_mint(&self, content_links: Vec<String>) -> Result<TransactionId, Error>;

    /// Submit an auction start transaction
    async fn submit_auction(&self, request: AuctionRequest) -> Result<TransactionId, Error>;
}

/// Content addressed store holding the minted assets
#[async_trait]
pub trait ContentStore: Debug + Send + Sync {
    /// Store a single asset
    async fn store(&self, asset: &Asset) -> Result<StoredAsset, Error>;
}
