//! nftkit Fake Ledger
//!
//! Used for testing where transactions are confirmed after a configurable number of polls.
//!
//! The fake ledger mints sequential token ids, one per content link, and emits a `MintSuccess`
//! event for each of them exactly like the token contract does. Transient query failures,
//! on-ledger failures and rejected submissions can be injected through [`FakeLedgerConfig`].
//! The fake content store hands out `ipfs://` links and can be told to reject given assets.

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use error::Error;
use nftkit_common::decode::{MINT_SUCCESS_EVENT, TOKEN_ID_PARAM};
use nftkit_common::{
    Asset, AuctionRequest, ContentStore, Event, EventParam, LedgerClient, LedgerReader,
    LedgerTransaction, Receipt, StoredAsset, TransactionId,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::instrument;
use uuid::Uuid;

pub mod error;

/// Event emitted by the fake auction contract
pub const AUCTION_STARTED_EVENT: &str = "AuctionStarted";

const FAKE_RECIPIENT: &str = "0x0000000000000000000000000000000000000000";

/// Fake ledger behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FakeLedgerConfig {
    /// Queries answered with a pending transaction before the receipt shows up
    pub confirmation_polls: u32,
    /// Queries failing transiently before the transaction is even looked up
    pub transient_failures: u32,
    /// Outcome of mint transactions
    pub mint_succeeds: bool,
    /// Outcome of auction transactions
    pub auction_succeeds: bool,
    /// First token id handed out
    pub first_token_id: u64,
    /// Reject every submission
    pub reject_submissions: bool,
}

impl Default for FakeLedgerConfig {
    fn default() -> Self {
        Self {
            confirmation_polls: 1,
            transient_failures: 0,
            mint_succeeds: true,
            auction_succeeds: true,
            first_token_id: 1,
            reject_submissions: false,
        }
    }
}

#[derive(Debug, Clone)]
struct FakeTransaction {
    failures_left: u32,
    polls_left: u32,
    receipt: Receipt,
}

/// In memory ledger
#[derive(Debug)]
pub struct FakeLedger {
    config: FakeLedgerConfig,
    transactions: Mutex<HashMap<TransactionId, FakeTransaction>>,
    next_token_id: AtomicU64,
    queries: AtomicUsize,
    mints: Mutex<Vec<Vec<String>>>,
    auctions: Mutex<Vec<AuctionRequest>>,
}

impl Default for FakeLedger {
    fn default() -> Self {
        Self::new(FakeLedgerConfig::default())
    }
}

impl FakeLedger {
    /// Create new [`FakeLedger`]
    pub fn new(config: FakeLedgerConfig) -> Self {
        Self {
            next_token_id: AtomicU64::new(config.first_token_id),
            config,
            transactions: Mutex::new(HashMap::new()),
            queries: AtomicUsize::new(0),
            mints: Mutex::new(Vec::new()),
            auctions: Mutex::new(Vec::new()),
        }
    }

    /// Number of transaction queries served, failed ones included
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Content links of every accepted mint submission
    pub async fn submitted_mints(&self) -> Vec<Vec<String>> {
        self.mints.lock().await.clone()
    }

    /// Every accepted auction submission
    pub async fn submitted_auctions(&self) -> Vec<AuctionRequest> {
        self.auctions.lock().await.clone()
    }

    /// Replace the receipt a submitted transaction will resolve to
    pub async fn set_receipt(&self, id: &TransactionId, receipt: Receipt) -> Result<(), Error> {
        let mut transactions = self.transactions.lock().await;
        let transaction = transactions
            .get_mut(id)
            .ok_or_else(|| Error::UnknownTransaction(id.to_string()))?;
        transaction.receipt = receipt;
        Ok(())
    }

    async fn record(&self, receipt: Receipt) -> TransactionId {
        let id = TransactionId::new(Uuid::new_v4().simple().to_string());

        self.transactions.lock().await.insert(
            id.clone(),
            FakeTransaction {
                failures_left: self.config.transient_failures,
                polls_left: self.config.confirmation_polls,
                receipt,
            },
        );

        id
    }

    fn mint_receipt(&self, content_links: &[String]) -> Receipt {
        if !self.config.mint_succeeds {
            return Receipt::failure();
        }

        let events = content_links
            .iter()
            .map(|link| {
                let token_id = self.next_token_id.fetch_add(1, Ordering::SeqCst);
                Event::new(
                    MINT_SUCCESS_EVENT,
                    vec![
                        EventParam::new("recipient", "ByStr20", json!(FAKE_RECIPIENT)),
                        EventParam::new(
                            TOKEN_ID_PARAM,
                            "Uint256",
                            json!(token_id.to_string()),
                        ),
                        EventParam::new("token_uri", "String", json!(link)),
                    ],
                )
            })
            .collect();

        Receipt::success(events)
    }

    fn auction_receipt(&self, request: &AuctionRequest) -> Receipt {
        if !self.config.auction_succeeds {
            return Receipt::failure();
        }

        Receipt::success(vec![Event::new(
            AUCTION_STARTED_EVENT,
            vec![
                EventParam::new(
                    "collection_name",
                    "String",
                    json!(request.collection_name),
                ),
                EventParam::new(
                    "token_count",
                    "Uint32",
                    json!(request.token_ids.len().to_string()),
                ),
                EventParam::new(
                    "block_duration",
                    "BNum",
                    json!(request.block_duration.to_string()),
                ),
            ],
        )])
    }
}

#[async_trait]
impl LedgerReader for FakeLedger {
    async fn get_transaction(
        &self,
        id: &TransactionId,
    ) -> Result<LedgerTransaction, nftkit_common::Error> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let mut transactions = self.transactions.lock().await;
        let transaction = transactions
            .get_mut(id)
            .ok_or_else(|| Error::UnknownTransaction(id.to_string()))?;

        if transaction.failures_left > 0 {
            transaction.failures_left -= 1;
            return Err(Error::InjectedFailure.into());
        }

        if transaction.polls_left > 0 {
            transaction.polls_left -= 1;
            return Ok(LedgerTransaction::pending(id.clone()));
        }

        Ok(LedgerTransaction::resolved(
            id.clone(),
            transaction.receipt.clone(),
        ))
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    #[instrument(skip_all)]
    async fn submit_mint(
        &self,
        content_links: Vec<String>,
    ) -> Result<TransactionId, nftkit_common::Error> {
        if self.config.reject_submissions {
            return Err(Error::SubmissionRejected.into());
        }

        let receipt = self.mint_receipt(&content_links);
        let id = self.record(receipt).await;
        self.mints.lock().await.push(content_links);

        tracing::debug!("Fake mint transaction {}", id);

        Ok(id)
    }

    #[instrument(skip_all)]
    async fn submit_auction(
        &self,
        request: AuctionRequest,
    ) -> Result<TransactionId, nftkit_common::Error> {
        if self.config.reject_submissions {
            return Err(Error::SubmissionRejected.into());
        }

        let receipt = self.auction_receipt(&request);
        let id = self.record(receipt).await;
        self.auctions.lock().await.push(request);

        tracing::debug!("Fake auction transaction {}", id);

        Ok(id)
    }
}

/// In memory content store
#[derive(Debug, Default)]
pub struct FakeContentStore {
    rejected: HashSet<String>,
    stored: Mutex<Vec<(String, StoredAsset)>>,
    calls: AtomicUsize,
}

impl FakeContentStore {
    /// Create new [`FakeContentStore`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the asset named `name`
    pub fn rejecting<S: Into<String>>(mut self, name: S) -> Self {
        self.rejected.insert(name.into());
        self
    }

    /// Number of store calls, rejected ones included
    pub fn store_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Asset names and their stored links
    pub async fn stored(&self) -> Vec<(String, StoredAsset)> {
        self.stored.lock().await.clone()
    }
}

#[async_trait]
impl ContentStore for FakeContentStore {
    async fn store(&self, asset: &Asset) -> Result<StoredAsset, nftkit_common::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.rejected.contains(&asset.name) {
            return Err(Error::AssetRejected(asset.name.clone()).into());
        }

        let cid = Uuid::new_v4().simple().to_string();
        let stored = StoredAsset {
            url: format!("ipfs://{cid}/metadata.json"),
            cid,
        };

        self.stored
            .lock()
            .await
            .push((asset.name.clone(), stored.clone()));

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use nftkit_common::{ReceiptDecoder, TokenId};

    use super::*;

    #[tokio::test]
    async fn test_mint_confirms_after_configured_polls() {
        let ledger = FakeLedger::new(FakeLedgerConfig {
            confirmation_polls: 2,
            transient_failures: 1,
            first_token_id: 10,
            ..Default::default()
        });

        let id = ledger
            .submit_mint(vec!["ipfs://a".to_string(), "ipfs://b".to_string()])
            .await
            .expect("submitted");

        assert!(ledger.get_transaction(&id).await.is_err());
        for _ in 0..2 {
            let tx = ledger.get_transaction(&id).await.expect("pending");
            assert!(tx.receipt.is_none());
        }

        let tx = ledger.get_transaction(&id).await.expect("resolved");
        let receipt = tx.receipt.expect("receipt");
        assert_eq!(
            ReceiptDecoder::decode_minted_token_ids(&receipt).expect("token ids"),
            vec![TokenId::from(11), TokenId::from(10)]
        );
        assert_eq!(ledger.query_count(), 4);
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let ledger = FakeLedger::default();

        let result = ledger.get_transaction(&TransactionId::new("nope")).await;

        assert!(matches!(result, Err(nftkit_common::Error::LedgerQuery(_))));
    }

    #[tokio::test]
    async fn test_rejected_submission() {
        let ledger = FakeLedger::new(FakeLedgerConfig {
            reject_submissions: true,
            ..Default::default()
        });

        let result = ledger.submit_mint(vec!["ipfs://a".to_string()]).await;

        assert!(matches!(
            result,
            Err(nftkit_common::Error::SubmissionFailed(_))
        ));
        assert!(ledger.submitted_mints().await.is_empty());
    }

    #[tokio::test]
    async fn test_content_store_rejects_named_asset() {
        let store = FakeContentStore::new().rejecting("bad.png");

        let good = store
            .store(&Asset::new("good.png", "", vec![1, 2, 3], "image/png"))
            .await
            .expect("stored");
        let bad = store
            .store(&Asset::new("bad.png", "", vec![4], "image/png"))
            .await;

        assert!(good.url.starts_with("ipfs://"));
        assert!(matches!(bad, Err(nftkit_common::Error::UploadFailed(_))));
        assert_eq!(store.store_calls(), 2);
        assert_eq!(store.stored().await.len(), 1);
    }
}
