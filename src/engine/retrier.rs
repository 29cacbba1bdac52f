//! Bounded submission retries.
//!
//! # Responsibilities
//! - Attempt submission up to `max_retries` times, strictly in sequence
//! - Stop at the first success and read the produced signatures
//! - Stop early on errors that retrying cannot fix
//! - Surface the last error once the budget is spent

use tokio::time::sleep;

use crate::engine::error::EngineError;
use crate::ledger::client::LedgerClient;
use crate::ledger::transaction::Transaction;
use crate::ledger::types::{LedgerError, Signature, SubmitOptions, SubmitResponse};
use crate::ledger::wallet::Keypair;
use crate::observability::SubmissionObserver;
use crate::resilience::backoff::BackoffConfig;

/// Outcome of one attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// The ledger accepted the transaction.
    Submitted { signature: String },
    /// The attempt raised an error.
    Failed { error: LedgerError },
}

/// Record of one submission attempt. Lives only as long as the invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionAttempt {
    /// Zero-based attempt index.
    pub index: u32,
    /// What happened.
    pub outcome: AttemptOutcome,
}

/// A successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submitted {
    /// Raw ledger response of the winning attempt.
    pub response: SubmitResponse,
    /// Signatures read from the transaction's slots after submission.
    pub signatures: Vec<Signature>,
    /// Every attempt made, the last one being the success.
    pub attempts: Vec<SubmissionAttempt>,
}

/// Submit `tx` with at most `max_retries` attempts.
///
/// Preflight is always skipped. Without `backoff` attempts run back to back.
pub async fn submit_with_retries(
    client: &dyn LedgerClient,
    tx: &mut Transaction,
    signers: &[Keypair],
    max_retries: u32,
    backoff: Option<BackoffConfig>,
    observer: &dyn SubmissionObserver,
) -> Result<Submitted, EngineError> {
    if max_retries == 0 {
        return Err(EngineError::NoAttempts);
    }

    let options = SubmitOptions {
        skip_preflight: true,
        preflight_commitment: None,
    };
    let mut attempts = Vec::new();
    let mut last_error = None;

    for attempt in 0..max_retries {
        if attempt > 0 {
            if let Some(backoff) = backoff {
                sleep(backoff.delay_for(attempt)).await;
            }
        }

        match client.submit(tx, signers, &options).await {
            Ok(response) => {
                let signatures = tx.signatures();
                observer.submitted(attempt, signatures.first());
                attempts.push(SubmissionAttempt {
                    index: attempt,
                    outcome: AttemptOutcome::Submitted {
                        signature: response.signature.clone(),
                    },
                });
                return Ok(Submitted {
                    response,
                    signatures,
                    attempts,
                });
            }
            Err(error) => {
                observer.attempt_failed(attempt, max_retries, &error);
                attempts.push(SubmissionAttempt {
                    index: attempt,
                    outcome: AttemptOutcome::Failed {
                        error: error.clone(),
                    },
                });

                if !error.is_retryable() {
                    observer.submission_failed(attempt + 1, &error);
                    return Err(EngineError::NonRetryable {
                        attempt,
                        source: error,
                    });
                }
                last_error = Some(error);
            }
        }
    }

    match last_error {
        Some(source) => {
            observer.submission_failed(max_retries, &source);
            Err(EngineError::RetriesExhausted {
                attempts: max_retries,
                source,
            })
        }
        None => Err(EngineError::NoAttempts),
    }
}
