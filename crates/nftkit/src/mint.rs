//! Mint workflow
//!
//! Stores the assets, submits the mint transaction and derives the minted token ids once the
//! receipt shows up.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use nftkit_common::{
    Asset, ContentStore, Error, LedgerClient, MintEvent, MintState, Receipt, ReceiptDecoder,
    TokenId, TransactionId,
};
use tokio::sync::{watch, Mutex};
use tracing::instrument;

use crate::poller::ConfirmationTarget;
use crate::tracker::{TransactionHandle, TransactionTracker};

/// Mint workflow
///
/// Cheap to clone, clones share the same state.
#[derive(Debug, Clone)]
pub struct MintWorkflow {
    inner: Arc<MintInner>,
}

#[derive(Debug)]
struct MintInner {
    ledger: Arc<dyn LedgerClient>,
    store: Arc<dyn ContentStore>,
    state: watch::Sender<MintState>,
    progress: Mutex<MintProgress>,
}

#[derive(Debug, Default)]
struct MintProgress {
    tracker: TransactionTracker,
    token_ids: Vec<TokenId>,
}

impl MintWorkflow {
    /// Create new [`MintWorkflow`]
    pub fn new(ledger: Arc<dyn LedgerClient>, store: Arc<dyn ContentStore>) -> Self {
        let (state, _) = watch::channel(MintState::default());

        Self {
            inner: Arc::new(MintInner {
                ledger,
                store,
                state,
                progress: Mutex::new(MintProgress::default()),
            }),
        }
    }

    /// Current state
    pub fn state(&self) -> MintState {
        *self.inner.state.borrow()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<MintState> {
        self.inner.state.subscribe()
    }

    /// Token ids derived from the last successful mint
    pub async fn token_ids(&self) -> Vec<TokenId> {
        self.inner.progress.lock().await.token_ids.clone()
    }

    /// Mint transaction being tracked
    pub async fn transaction(&self) -> TransactionHandle {
        self.inner.progress.lock().await.tracker.handle()
    }

    fn transition(&self, event: MintEvent) -> Result<MintState, Error> {
        let mut result = Ok(MintState::default());

        self.inner
            .state
            .send_if_modified(|state| match state.transition(event) {
                Ok(next) => {
                    tracing::debug!("Mint state {} -> {}", state, next);
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

    /// Store `assets` and submit the mint transaction
    ///
    /// Allowed while the workflow has not been started or after a failed attempt. Returns the
    /// id of the submitted transaction; its receipt is picked up by the polling loop.
    #[instrument(skip(self, assets), fields(assets = assets.len()))]
    pub async fn start(&self, assets: Vec<Asset>) -> Result<TransactionId, Error> {
        let state = self.state();
        if !matches!(state, MintState::NotInitiated | MintState::Failed) {
            return Err(Error::PreconditionNotMet(format!("mint is {state}")));
        }

        if assets.is_empty() {
            return Err(Error::PreconditionNotMet("no assets to mint".to_string()));
        }

        self.transition(MintEvent::Start)?;
        self.inner.progress.lock().await.token_ids.clear();

        let stored = match try_join_all(assets.iter().map(|asset| self.inner.store.store(asset)))
            .await
        {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!("Asset upload failed, aborting mint: {}", err);
                self.transition(MintEvent::Abort)?;
                return Err(match err {
                    Error::UploadFailed(_) => err,
                    other => Error::UploadFailed(other.to_string()),
                });
            }
        };

        self.transition(MintEvent::Uploaded)?;
        self.transition(MintEvent::Submitting)?;

        let content_links: Vec<String> = stored.into_iter().map(|asset| asset.url).collect();

        let id = match self.inner.ledger.submit_mint(content_links).await {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!("Mint submission failed: {}", err);
                self.transition(MintEvent::Abort)?;
                return Err(match err {
                    Error::SubmissionFailed(_) => err,
                    other => Error::SubmissionFailed(other.to_string()),
                });
            }
        };

        tracing::info!("Mint transaction {} submitted", id);

        self.transition(MintEvent::Submitted)?;
        self.inner
            .progress
            .lock()
            .await
            .tracker
            .submit(id.clone())?;

        Ok(id)
    }

    /// Wait until the current attempt completes or fails
    pub async fn wait_for_completion(&self, timeout: Duration) -> Result<MintState, Error> {
        let mut state = self.subscribe();

        tokio::time::timeout(timeout, async move {
            let terminal = state
                .wait_for(MintState::is_terminal)
                .await
                .map_err(|_| Error::Custom("mint workflow dropped".to_string()))?;
            Ok(*terminal)
        })
        .await
        .map_err(|_| Error::Timeout)?
    }
}

#[async_trait]
impl ConfirmationTarget for MintWorkflow {
    fn label(&self) -> &str {
        "mint"
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
            .then(|| ReceiptDecoder::decode_minted_token_ids(&receipt));

        progress.tracker.observe(receipt)?;

        match decoded {
            None => {
                tracing::info!("Mint transaction {} failed on ledger", id);
                self.transition(MintEvent::Rejected)?;
                Ok(())
            }
            Some(Ok(token_ids)) => {
                tracing::info!("Minted {} tokens in {}", token_ids.len(), id);
                progress.token_ids = token_ids;
                self.transition(MintEvent::Confirmed)?;
                Ok(())
            }
            Some(Err(err)) => {
                self.transition(MintEvent::Abort)?;
                Err(err)
            }
        }
    }
}
