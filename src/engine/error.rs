//! Engine-level errors.

use std::time::Duration;
use thiserror::Error;

use crate::ledger::types::LedgerError;

/// Errors surfaced by [`crate::engine::Engine::execute`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The retry budget was zero; nothing was submitted.
    #[error("No submission attempts made (max_retries is 0)")]
    NoAttempts,

    /// Every attempt failed with a retryable error.
    #[error("Submission failed after {attempts} attempts: {source}")]
    RetriesExhausted { attempts: u32, source: LedgerError },

    /// An attempt failed with an error that retrying cannot fix.
    #[error("Submission attempt {attempt} failed permanently: {source}")]
    NonRetryable { attempt: u32, source: LedgerError },

    /// The ledger client could not be opened.
    #[error("Failed to open ledger client: {0}")]
    Connect(LedgerError),

    /// A status query failed permanently while waiting for confirmation.
    #[error("Status query failed: {0}")]
    StatusQuery(LedgerError),

    /// Submission succeeded but produced no signature to track.
    #[error("Submitted transaction carries no signatures to confirm")]
    NoSignatures,

    /// The confirmation target was not observed in time.
    #[error("Transaction not confirmed after {:.1} seconds", .elapsed.as_secs_f64())]
    ConfirmationTimeout { elapsed: Duration },
}

impl EngineError {
    /// The underlying ledger error, if any.
    pub fn ledger_error(&self) -> Option<&LedgerError> {
        match self {
            EngineError::RetriesExhausted { source, .. }
            | EngineError::NonRetryable { source, .. } => Some(source),
            EngineError::Connect(e) | EngineError::StatusQuery(e) => Some(e),
            _ => None,
        }
    }
}
