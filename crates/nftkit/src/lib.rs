//! Mint and auction launch workflows
//!
//! A collection launch is two dependent ledger transactions: minting one token per stored asset,
//! then starting an auction over the minted tokens. The workflows in this crate submit those
//! transactions and a [`PollingLoop`] follows them to their receipts.
//!
//! ```text
//! MintWorkflow ──submit──▶ Ledger ◀──poll── PollingLoop ──resolve──▶ MintWorkflow / AuctionWorkflow
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod auction;
#[cfg(feature = "jsonrpc")]
pub mod client;
pub mod launchpad;
pub mod mint;
pub mod poller;
pub mod pricing;
pub mod tracker;
pub mod watcher;

pub use auction::{auction_block_count, AuctionSettings, AuctionWorkflow};
#[cfg(feature = "jsonrpc")]
pub use client::JsonRpcLedger;
pub use launchpad::{Launchpad, LaunchpadSettings};
pub use mint::MintWorkflow;
pub use nftkit_common::{self as common, *};
pub use poller::{ConfirmationTarget, PollOutcome, PollingHandle, PollingLoop};
pub use pricing::{FlatPrice, PriceDistribution, PriceSchedule};
pub use tracker::{TransactionHandle, TransactionTracker};
pub use watcher::TransactionWatch;
