//! Fake Ledger Error

use thiserror::Error;

/// Fake Ledger Error
#[derive(Debug, Error)]
pub enum Error {
    /// Transaction never submitted to this ledger
    #[error("Unknown transaction `{0}`")]
    UnknownTransaction(String),
    /// Configured query failure
    #[error("Injected transient failure")]
    InjectedFailure,
    /// Configured submission rejection
    #[error("Submission rejected")]
    SubmissionRejected,
    /// Configured asset rejection
    #[error("Asset `{0}` rejected")]
    AssetRejected(String),
}

impl From<Error> for nftkit_common::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::UnknownTransaction(_) | Error::InjectedFailure => Self::LedgerQuery(e.to_string()),
            Error::SubmissionRejected => Self::SubmissionFailed(e.to_string()),
            Error::AssetRejected(_) => Self::UploadFailed(e.to_string()),
        }
    }
}
