//! Error types for baseline verification.

use regress_suite::BaselineError;
use thiserror::Error;

/// Errors that abort a verification run.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The live suite and the baseline describe a different number of queries.
    #[error("Live suite has {live} queries but the baseline has {baseline}")]
    LengthMismatch { live: usize, baseline: usize },

    /// The baseline could not be loaded.
    #[error(transparent)]
    Baseline(#[from] BaselineError),

    /// A streamed record could not be fetched in full.
    #[error("Smoke check failed for record {id} of query {query:?}: {reason}")]
    Smoke { query: String, id: u64, reason: String },

    /// The tolerance percentage is not usable.
    #[error("Invalid tolerance: {0}")]
    InvalidTolerance(String),

    /// Verification failed.
    #[error("Verification failed: {failed} of {total} queries did not match the baseline")]
    VerificationFailed { failed: usize, total: usize },
}
