//! nftkit shared types and functions.
//!
//! This crate is the base foundation to build things that can interact with nftkit and its
//! internal crates.
//!
//! This is meant to contain the shared types, traits and common functions that are used across
//! the internal crates: receipts and their decoding, the mint and auction state machines, the
//! error taxonomy and the collaborator traits for the ledger and the content store.

pub mod decode;
pub mod error;
pub mod ledger;
pub mod state;
pub mod types;

pub use decode::ReceiptDecoder;
pub use error::Error;
pub use ledger::{ContentStore, LedgerClient, LedgerReader};
pub use state::{AuctionEvent, AuctionState, MintEvent, MintState};
pub use types::{
    Amount, Asset, AuctionRequest, CollectionId, Event, EventParam, LedgerTransaction, Receipt,
    StoredAsset, TokenId, TransactionId,
};
