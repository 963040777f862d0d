//! Auction workflow
//!
//! Puts the tokens produced by a [`MintWorkflow`] up for auction.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nftkit_common::{
    AuctionEvent, AuctionRequest, AuctionState, CollectionId, Error, LedgerClient, MintState,
    Receipt, ReceiptDecoder, TransactionId,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::instrument;

use crate::mint::MintWorkflow;
use crate::poller::ConfirmationTarget;
use crate::pricing::PriceDistribution;
use crate::tracker::{TransactionHandle, TransactionTracker};

/// Default ledger block time factor
pub const DEFAULT_SECONDS_PER_BLOCK: u64 = 2;

/// Auction settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionSettings {
    /// Divisor turning the duration into a block count
    pub seconds_per_block: u64,
}

impl Default for AuctionSettings {
    fn default() -> Self {
        Self {
            seconds_per_block: DEFAULT_SECONDS_PER_BLOCK,
        }
    }
}

/// Auction length in blocks, `hours * 60 / seconds_per_block`
pub fn auction_block_count(duration_hours: u64, seconds_per_block: u64) -> Result<u64, Error> {
    if seconds_per_block == 0 {
        return Err(Error::InvalidDuration);
    }

    duration_hours
        .checked_mul(60)
        .map(|minutes| minutes / seconds_per_block)
        .ok_or(Error::InvalidDuration)
}

/// Auction workflow
///
/// Cheap to clone, clones share the same state.
#[derive(Debug, Clone)]
pub struct AuctionWorkflow {
    inner: Arc<AuctionInner>,
}

#[derive(Debug)]
struct AuctionInner {
    ledger: Arc<dyn LedgerClient>,
    mint: MintWorkflow,
    settings: AuctionSettings,
    state: watch::Sender<AuctionState>,
    progress: Mutex<AuctionProgress>,
}

#[derive(Debug, Default)]
struct AuctionProgress {
    tracker: TransactionTracker,
    request: Option<AuctionRequest>,
    collection_id: Option<CollectionId>,
}

impl AuctionWorkflow {
    /// Create new [`AuctionWorkflow`] over the tokens of `mint`
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        mint: MintWorkflow,
        settings: AuctionSettings,
    ) -> Self {
        let (state, _) = watch::channel(AuctionState::default());

        Self {
            inner: Arc::new(AuctionInner {
                ledger,
                mint,
                settings,
                state,
                progress: Mutex::new(AuctionProgress::default()),
            }),
        }
    }

    /// Current state
    pub fn state(&self) -> AuctionState {
        *self.inner.state.borrow()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<AuctionState> {
        self.inner.state.subscribe()
    }

    /// Collection id of the started auction, when it could be decoded
    pub async fn collection_id(&self) -> Option<CollectionId> {
        self.inner.progress.lock().await.collection_id.clone()
    }

    /// Last submitted auction request
    pub async fn request(&self) -> Option<AuctionRequest> {
        self.inner.progress.lock().await.request.clone()
    }

    /// Auction transaction being tracked
    pub async fn transaction(&self) -> TransactionHandle {
        self.inner.progress.lock().await.tracker.handle()
    }

    fn transition(&self, event: AuctionEvent) -> Result<AuctionState, Error> {
        let mut result = Ok(AuctionState::default());

        self.inner
            .state
            .send_if_modified(|state| match state.transition(event) {
                Ok(next) => {
                    tracing::debug!("Auction state {} -> {}", state, next);
                    *state = next;
                    result = Ok(next);
                    true
                }
                Err(err) => {
                    result = Err(err);
                    false
                }
            });

        Ok(result?)
    }

    /// Submit the auction start transaction for every minted token
    ///
    /// Requires a completed mint with at least one token id. Nothing is submitted when a
    /// precondition does not hold.
    #[instrument(skip(self, pricing))]
    pub async fn start(
        &self,
        collection_name: &str,
        duration_hours: u64,
        pricing: &dyn PriceDistribution,
    ) -> Result<TransactionId, Error> {
        let state = self.state();
        if !matches!(state, AuctionState::NotStarted | AuctionState::Failed) {
            return Err(Error::PreconditionNotMet(format!("auction is {state}")));
        }

        let mint_state = self.inner.mint.state();
        if mint_state != MintState::Completed {
            return Err(Error::PreconditionNotMet(format!(
                "mint is {mint_state}, expected {}",
                MintState::Completed
            )));
        }

        let token_ids = self.inner.mint.token_ids().await;
        if token_ids.is_empty() {
            return Err(Error::PreconditionNotMet(
                "mint produced no token ids".to_string(),
            ));
        }

        let block_duration =
            auction_block_count(duration_hours, self.inner.settings.seconds_per_block)?;

        let prices = pricing.prices(&token_ids);
        if prices.len() != token_ids.len() {
            return Err(Error::PriceListMismatch {
                tokens: token_ids.len(),
                prices: prices.len(),
            });
        }

        self.transition(AuctionEvent::Start)?;

        let request = AuctionRequest {
            collection_name: collection_name.to_string(),
            token_ids,
            prices,
            block_duration,
        };

        {
            let mut progress = self.inner.progress.lock().await;
            progress.collection_id = None;
            progress.request = Some(request.clone());
        }

        let id = match self.inner.ledger.submit_auction(request).await {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!("Auction submission failed: {}", err);
                self.transition(AuctionEvent::Abort)?;
                return Err(match err {
                    Error::SubmissionFailed(_) => err,
                    other => Error::SubmissionFailed(other.to_string()),
                });
            }
        };

        tracing::info!(
            "Auction transaction {} submitted for {} blocks",
            id,
            block_duration
        );

        self.transition(AuctionEvent::Submitted)?;
        self.inner
            .progress
            .lock()
            .await
            .tracker
            .submit(id.clone())?;

        Ok(id)
    }

    /// Wait until the current attempt completes or fails
    pub async fn wait_for_completion(&self, timeout: Duration) -> Result<AuctionState, Error> {
        let mut state = self.subscribe();

        tokio::time::timeout(timeout, async move {
            let terminal = state
                .wait_for(AuctionState::is_terminal)
                .await
                .map_err(|_| Error::Custom("auction workflow dropped".to_string()))?;
            Ok(*terminal)
        })
        .await
        .map_err(|_| Error::Timeout)?
    }
}

#[async_trait]
impl ConfirmationTarget for AuctionWorkflow {
    fn label(&self) -> &str {
        "auction"
    }

    async fn awaiting_transaction(&self) -> Option<TransactionId> {
        self.inner.progress.lock().await.tracker.awaiting_id().cloned()
    }

    async fn resolve(&self, id: &TransactionId, receipt: Receipt) -> Result<(), Error> {
        let mut progress = self.inner.progress.lock().await;

        if progress.tracker.awaiting_id() != Some(id) {
            return Err(Error::NoPendingTransaction);
        }

        let decoded = receipt
            .success
            .then(|| ReceiptDecoder::decode_collection_id(&receipt));

        progress.tracker.observe(receipt)?;

        match decoded {
            None => {
                tracing::info!("Auction transaction {} failed on ledger", id);
                self.transition(AuctionEvent::Rejected)?;
                Ok(())
            }
            Some(Ok(collection_id)) => {
                progress.collection_id = Some(collection_id);
                self.transition(AuctionEvent::Confirmed)?;
                Ok(())
            }
            Some(Err(Error::NotImplemented(what))) => {
                tracing::debug!("Collection id unavailable: {} not implemented", what);
                self.transition(AuctionEvent::Confirmed)?;
                Ok(())
            }
            Some(Err(err)) => {
                self.transition(AuctionEvent::Abort)?;
                Err(err)
            }
        }
    }
}
