//! State transition rules
//!
//! The mint and auction workflows each drive one of the machines below. Every change of state
//! goes through `transition`, which rejects events that are not valid from the current state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// State transition Error
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid mint transition
    #[error("Invalid mint transition: {1:?} from {0}")]
    InvalidMintTransition(MintState, MintEvent),
    /// Invalid auction transition
    #[error("Invalid auction transition: {1:?} from {0}")]
    InvalidAuctionTransition(AuctionState, AuctionEvent),
    /// Unknown state string
    #[error("Unknown state `{0}`")]
    UnknownState(String),
}

/// Mint state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MintState {
    /// Nothing started yet
    #[default]
    NotInitiated,
    /// Assets are being stored
    Uploading,
    /// All assets stored
    Uploaded,
    /// Mint transaction is being submitted
    VerifyingTransaction,
    /// Mint transaction submitted, waiting for its receipt
    AwaitingConfirmation,
    /// Tokens minted
    Completed,
    /// Attempt failed, may be started again
    Failed,
}

/// Events accepted by the mint state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MintEvent {
    /// Begin a mint attempt
    Start,
    /// Every asset was stored
    Uploaded,
    /// Mint transaction submission begins
    Submitting,
    /// Mint transaction accepted by the ledger
    Submitted,
    /// Successful receipt observed
    Confirmed,
    /// Failed receipt observed
    Rejected,
    /// Attempt aborted before a usable outcome
    Abort,
}

impl MintState {
    /// Apply `event` and return the resulting state
    ///
    /// Valid transitions:
    /// - NotInitiated, Failed -> Uploading
    /// - Uploading -> Uploaded
    /// - Uploaded -> VerifyingTransaction
    /// - VerifyingTransaction -> AwaitingConfirmation
    /// - AwaitingConfirmation -> Completed, Failed
    /// - any in-flight state -> Failed on abort
    pub fn transition(self, event: MintEvent) -> Result<MintState, Error> {
        use MintEvent as E;
        use MintState as S;

        let next = match (self, event) {
            (S::NotInitiated | S::Failed, E::Start) => S::Uploading,
            (S::Uploading, E::Uploaded) => S::Uploaded,
            (S::Uploaded, E::Submitting) => S::VerifyingTransaction,
            (S::VerifyingTransaction, E::Submitted) => S::AwaitingConfirmation,
            (S::AwaitingConfirmation, E::Confirmed) => S::Completed,
            (S::AwaitingConfirmation, E::Rejected) => S::Failed,
            (
                S::Uploading | S::Uploaded | S::VerifyingTransaction | S::AwaitingConfirmation,
                E::Abort,
            ) => S::Failed,
            _ => return Err(Error::InvalidMintTransition(self, event)),
        };

        Ok(next)
    }

    /// Whether the current attempt is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Human readable status line
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::NotInitiated => "Ready to mint",
            Self::Uploading => "Uploading to content store",
            Self::Uploaded => "Files uploaded to content store",
            Self::VerifyingTransaction => "Verifying minting transaction",
            Self::AwaitingConfirmation => "Waiting for transaction completion",
            Self::Completed => "Minting successful",
            Self::Failed => "Minting failed",
        }
    }
}

impl fmt::Display for MintState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotInitiated => write!(f, "NOT_INITIATED"),
            Self::Uploading => write!(f, "UPLOADING"),
            Self::Uploaded => write!(f, "UPLOADED"),
            Self::VerifyingTransaction => write!(f, "VERIFYING_TRANSACTION"),
            Self::AwaitingConfirmation => write!(f, "AWAITING_CONFIRMATION"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for MintState {
    type Err = Error;

    fn from_str(state: &str) -> Result<Self, Self::Err> {
        match state {
            "NOT_INITIATED" => Ok(Self::NotInitiated),
            "UPLOADING" => Ok(Self::Uploading),
            "UPLOADED" => Ok(Self::Uploaded),
            "VERIFYING_TRANSACTION" => Ok(Self::VerifyingTransaction),
            "AWAITING_CONFIRMATION" => Ok(Self::AwaitingConfirmation),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            _ => Err(Error::UnknownState(state.to_string())),
        }
    }
}

/// Auction state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuctionState {
    /// Auction not requested yet
    #[default]
    NotStarted,
    /// Auction transaction is being submitted
    VerifyingTransaction,
    /// Auction transaction submitted, waiting for its receipt
    AwaitingConfirmation,
    /// Auction started
    Completed,
    /// Attempt failed, may be started again
    Failed,
}

/// Events accepted by the auction state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuctionEvent {
    /// Begin submitting the auction transaction
    Start,
    /// Auction transaction accepted by the ledger
    Submitted,
    /// Successful receipt observed
    Confirmed,
    /// Failed receipt observed
    Rejected,
    /// Attempt aborted before a usable outcome
    Abort,
}

impl AuctionState {
    /// Apply `event` and return the resulting state
    ///
    /// Valid transitions:
    /// - NotStarted, Failed -> VerifyingTransaction
    /// - VerifyingTransaction -> AwaitingConfirmation
    /// - AwaitingConfirmation -> Completed, Failed
    /// - any in-flight state -> Failed on abort
    pub fn transition(self, event: AuctionEvent) -> Result<AuctionState, Error> {
        use AuctionEvent as E;
        use AuctionState as S;

        let next = match (self, event) {
            (S::NotStarted | S::Failed, E::Start) => S::VerifyingTransaction,
            (S::VerifyingTransaction, E::Submitted) => S::AwaitingConfirmation,
            (S::AwaitingConfirmation, E::Confirmed) => S::Completed,
            (S::AwaitingConfirmation, E::Rejected) => S::Failed,
            (S::VerifyingTransaction | S::AwaitingConfirmation, E::Abort) => S::Failed,
            _ => return Err(Error::InvalidAuctionTransition(self, event)),
        };

        Ok(next)
    }

    /// Whether the current attempt is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Human readable status line
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::NotStarted => "Auction not started",
            Self::VerifyingTransaction => "Verifying auction transaction",
            Self::AwaitingConfirmation => "Waiting for transaction completion",
            Self::Completed => "Auction started",
            Self::Failed => "Auction failed",
        }
    }
}

impl fmt::Display for AuctionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NOT_STARTED"),
            Self::VerifyingTransaction => write!(f, "VERIFYING_TRANSACTION"),
            Self::AwaitingConfirmation => write!(f, "AWAITING_CONFIRMATION"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for AuctionState {
    type Err = Error;

    fn from_str(state: &str) -> Result<Self, Self::Err> {
        match state {
            "NOT_STARTED" => Ok(Self::NotStarted),
            "VERIFYING_TRANSACTION" => Ok(Self::VerifyingTransaction),
            "AWAITING_CONFIRMATION" => Ok(Self::AwaitingConfirmation),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            _ => Err(Error::UnknownState(state.to_string())),
        }
    }
}
