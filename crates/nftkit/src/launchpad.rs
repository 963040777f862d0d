//! Launchpad
//!
//! Wires a mint workflow, the auction workflow over its tokens and the polling loop observing
//! both.

use std::sync::Arc;
use std::time::Duration;

use nftkit_common::{ContentStore, LedgerClient, LedgerReader};
use serde::{Deserialize, Serialize};

use crate::auction::{AuctionSettings, AuctionWorkflow};
use crate::mint::MintWorkflow;
use crate::poller::{PollingHandle, PollingLoop, DEFAULT_POLL_INTERVAL};

/// Launchpad settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchpadSettings {
    /// Interval between two ledger polls
    pub poll_interval: Duration,
    /// Auction settings
    pub auction: AuctionSettings,
}

impl Default for LaunchpadSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            auction: AuctionSettings::default(),
        }
    }
}

/// Mint and auction of one collection
#[derive(Debug, Clone)]
pub struct Launchpad {
    reader: Arc<dyn LedgerReader>,
    mint: MintWorkflow,
    auction: AuctionWorkflow,
    settings: LaunchpadSettings,
}

impl Launchpad {
    /// Create new [`Launchpad`]
    pub fn new<L>(ledger: Arc<L>, store: Arc<dyn ContentStore>, settings: LaunchpadSettings) -> Self
    where
        L: LedgerClient + 'static,
    {
        let client: Arc<dyn LedgerClient> = ledger.clone();
        let mint = MintWorkflow::new(client.clone(), store);
        let auction = AuctionWorkflow::new(client, mint.clone(), settings.auction);

        Self {
            reader: ledger,
            mint,
            auction,
            settings,
        }
    }

    /// Mint workflow
    pub fn mint(&self) -> &MintWorkflow {
        &self.mint
    }

    /// Auction workflow
    pub fn auction(&self) -> &AuctionWorkflow {
        &self.auction
    }

    /// Polling loop observing both workflows
    pub fn poller(&self) -> PollingLoop {
        let mut poller = PollingLoop::new(self.reader.clone(), self.settings.poll_interval);
        poller.register(Arc::new(self.mint.clone()));
        poller.register(Arc::new(self.auction.clone()));
        poller
    }

    /// Spawn the polling loop, polling stops when the handle is dropped
    pub fn start_polling(&self) -> PollingHandle {
        let poller = self.poller();
        tracing::debug!("Polling ledger every {:?}", poller.interval());
        poller.spawn()
    }
}
