//! Engine event observer.

use std::time::Duration;

use crate::ledger::types::{LedgerError, Signature, SignatureStatus};
use crate::observability::metrics;

/// Receives engine lifecycle events.
///
/// Injected into [`crate::engine::Engine`]; every method has a no-op default so
/// implementations only override what they care about.
pub trait SubmissionObserver: Send + Sync {
    /// A submission attempt failed. `attempt` is zero-based.
    fn attempt_failed(&self, _attempt: u32, _max_retries: u32, _error: &LedgerError) {}

    /// A submission attempt succeeded.
    fn submitted(&self, _attempt: u32, _signature: Option<&Signature>) {}

    /// Submission gave up.
    fn submission_failed(&self, _attempts: u32, _error: &LedgerError) {}

    /// A poll saw no status, or a status below target.
    fn status_pending(&self, _elapsed: Duration, _status: Option<&SignatureStatus>) {}

    /// A status query failed.
    fn status_query_failed(&self, _elapsed: Duration, _error: &LedgerError) {}

    /// The confirmation target was observed.
    fn confirmed(&self, _elapsed: Duration, _status: &SignatureStatus) {}

    /// The confirmation deadline passed.
    fn timed_out(&self, _elapsed: Duration) {}
}

/// Default observer: structured logs plus metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SubmissionObserver for TracingObserver {
    fn attempt_failed(&self, attempt: u32, max_retries: u32, error: &LedgerError) {
        metrics::record_attempt("failed");
        tracing::warn!(
            attempt,
            max_retries,
            error = %error,
            retryable = error.is_retryable(),
            "Failed submission attempt"
        );
    }

    fn submitted(&self, attempt: u32, signature: Option<&Signature>) {
        metrics::record_attempt("submitted");
        metrics::record_submission("submitted");
        match signature {
            Some(sig) => tracing::info!(attempt, signature = %sig, "Transaction submitted"),
            None => tracing::info!(attempt, "Transaction submitted"),
        }
    }

    fn submission_failed(&self, attempts: u32, error: &LedgerError) {
        metrics::record_submission("failed");
        tracing::error!(attempts, error = %error, "Transaction submission failed");
    }

    fn status_pending(&self, elapsed: Duration, status: Option<&SignatureStatus>) {
        match status {
            Some(s) => tracing::debug!(
                elapsed_secs = elapsed.as_secs_f64(),
                confirmations = ?s.confirmations,
                confirmation_status = ?s.confirmation_status,
                "Waiting for confirmations"
            ),
            None => tracing::debug!(
                elapsed_secs = elapsed.as_secs_f64(),
                "Transaction not yet seen by ledger"
            ),
        }
    }

    fn status_query_failed(&self, elapsed: Duration, error: &LedgerError) {
        tracing::warn!(
            elapsed_secs = elapsed.as_secs_f64(),
            error = %error,
            "Status query failed"
        );
    }

    fn confirmed(&self, elapsed: Duration, status: &SignatureStatus) {
        metrics::record_confirmation("confirmed", elapsed);
        tracing::info!(
            elapsed_secs = elapsed.as_secs_f64(),
            confirmation_status = ?status.confirmation_status,
            "Took {} seconds to confirm transaction",
            elapsed.as_secs()
        );
    }

    fn timed_out(&self, elapsed: Duration) {
        metrics::record_confirmation("timed_out", elapsed);
        tracing::warn!(
            elapsed_secs = elapsed.as_secs_f64(),
            "Transaction not confirmed before deadline"
        );
    }
}
