//! Confirmation polling.
//!
//! # Responsibilities
//! - Poll signature statuses at a fixed cadence after submission
//! - Stop once the first signature reaches the requested level
//! - Stop at the deadline without ever sleeping past it
//!
//! # Design Decisions
//! - Only the first signature gates the loop; it identifies the transaction
//! - A missing status means "not indexed yet", never an error
//! - Retryable query failures are absorbed until the deadline

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

use crate::engine::error::EngineError;
use crate::ledger::client::LedgerClient;
use crate::ledger::types::{Signature, SignatureStatus};
use crate::observability::SubmissionObserver;

/// Cadence used when the configured interval is zero.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Deadline offset used when `max_timeout` does not fit the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// When to consider a transaction confirmed and how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Total wait budget.
    pub max_timeout: Duration,
    /// Delay before each status query. Zero means [`DEFAULT_POLL_INTERVAL`].
    pub poll_interval: Duration,
    /// Confirmation count accepted when `finalized` is false.
    pub target: u64,
    /// Require finality.
    pub finalized: bool,
}

/// Result of the confirmation phase.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// Polling was not requested.
    Skipped,
    /// The requested level was observed.
    Confirmed {
        elapsed: Duration,
        status: SignatureStatus,
    },
    /// The deadline passed first.
    TimedOut {
        elapsed: Duration,
        last_status: Option<SignatureStatus>,
    },
}

impl Confirmation {
    /// Whether the requested level was observed.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Confirmation::Confirmed { .. })
    }

    /// Whether the deadline passed first.
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Confirmation::TimedOut { .. })
    }
}

/// Wait until the first of `signatures` reaches the level described by `settings`.
pub async fn wait_for_confirmation(
    client: &dyn LedgerClient,
    signatures: &[Signature],
    settings: &PollSettings,
    observer: &dyn SubmissionObserver,
) -> Result<Confirmation, EngineError> {
    if signatures.is_empty() {
        return Err(EngineError::NoSignatures);
    }

    let start = Instant::now();
    let deadline = start
        .checked_add(settings.max_timeout)
        .unwrap_or_else(|| start + FAR_FUTURE);
    let interval = if settings.poll_interval.is_zero() {
        DEFAULT_POLL_INTERVAL
    } else {
        settings.poll_interval
    };
    let mut last_status = None;

    loop {
        let now = Instant::now();
        if now >= deadline {
            let elapsed = now.duration_since(start);
            observer.timed_out(elapsed);
            return Ok(Confirmation::TimedOut {
                elapsed,
                last_status,
            });
        }

        let wake = now
            .checked_add(interval)
            .map_or(deadline, |next| next.min(deadline));
        sleep_until(wake).await;
        let elapsed = start.elapsed();

        let statuses = match client.query_statuses(signatures).await {
            Ok(statuses) => statuses,
            Err(error) if error.is_retryable() => {
                observer.status_query_failed(elapsed, &error);
                continue;
            }
            Err(error) => return Err(EngineError::StatusQuery(error)),
        };

        match statuses.into_iter().next().flatten() {
            Some(status) if status.satisfies(settings.target, settings.finalized) => {
                observer.confirmed(elapsed, &status);
                return Ok(Confirmation::Confirmed { elapsed, status });
            }
            Some(status) => {
                observer.status_pending(elapsed, Some(&status));
                last_status = Some(status);
            }
            None => observer.status_pending(elapsed, None),
        }
    }
}
