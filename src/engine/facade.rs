//! Engine facade: submit, optionally confirm, return the raw response.
//!
//! # Responsibilities
//! - Open a ledger client for the duration of one invocation
//! - Normalize signers, run the retrier, then the poller
//! - Release the client on every exit path, including cancellation
//! - Apply the configured timeout policy

use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::engine::error::EngineError;
use crate::engine::options::{ExecuteOptions, TimeoutPolicy};
use crate::engine::poller::{wait_for_confirmation, Confirmation, PollSettings};
use crate::engine::retrier::{submit_with_retries, SubmissionAttempt};
use crate::ledger::client::{LedgerClient, LedgerConnector};
use crate::ledger::transaction::Transaction;
use crate::ledger::types::{Signature, SubmitResponse};
use crate::ledger::wallet::{normalize_signers, Seeded};
use crate::observability::{SubmissionObserver, TracingObserver};

/// Everything one successful invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    /// Raw ledger response, untouched.
    pub response: SubmitResponse,
    /// Signatures produced by the winning attempt.
    pub signatures: Vec<Signature>,
    /// All attempts made.
    pub attempts: Vec<SubmissionAttempt>,
    /// Confirmation phase result.
    pub confirmation: Confirmation,
}

impl ExecutionOutcome {
    /// Whether the transaction was submitted and the requested level observed.
    pub fn is_confirmed(&self) -> bool {
        self.confirmation.is_confirmed()
    }
}

/// Submit-retry-confirm engine.
///
/// Holds no per-invocation state; one engine can serve many concurrent calls.
pub struct Engine<C> {
    connector: C,
    observer: Arc<dyn SubmissionObserver>,
}

impl<C: LedgerConnector> Engine<C> {
    /// Create an engine that logs through [`TracingObserver`].
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the observer.
    pub fn with_observer(mut self, observer: Arc<dyn SubmissionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Submit `tx` to `endpoint` and optionally wait for confirmation.
    ///
    /// On success the transaction's signature slots are filled.
    pub async fn execute<S>(
        &self,
        endpoint: &str,
        tx: &mut Transaction,
        signers: &[S],
        options: &ExecuteOptions,
    ) -> Result<ExecutionOutcome, EngineError>
    where
        S: Seeded + Sync,
    {
        let span = tracing::info_span!(
            "execute",
            operation_id = %Uuid::new_v4(),
            endpoint = %endpoint,
        );

        async move {
            let client = self
                .connector
                .connect(endpoint)
                .await
                .map_err(EngineError::Connect)?;
            let lease = ClientLease::new(client);

            let result = self.run(lease.client(), tx, signers, options).await;
            lease.release().await;
            result
        }
        .instrument(span)
        .await
    }

    async fn run<S>(
        &self,
        client: &dyn LedgerClient,
        tx: &mut Transaction,
        signers: &[S],
        options: &ExecuteOptions,
    ) -> Result<ExecutionOutcome, EngineError>
    where
        S: Seeded + Sync,
    {
        let observer = self.observer.as_ref();
        let signers = normalize_signers(signers);

        let submitted = submit_with_retries(
            client,
            tx,
            &signers,
            options.max_retries,
            options.backoff,
            observer,
        )
        .await?;

        let confirmation = if options.skip_confirmation {
            Confirmation::Skipped
        } else {
            let settings = PollSettings {
                max_timeout: options.max_timeout,
                poll_interval: options.poll_interval,
                target: options.target,
                finalized: options.finalized,
            };
            wait_for_confirmation(client, &submitted.signatures, &settings, observer).await?
        };

        if let Confirmation::TimedOut { elapsed, .. } = &confirmation {
            if options.on_timeout == TimeoutPolicy::Fail {
                return Err(EngineError::ConfirmationTimeout { elapsed: *elapsed });
            }
        }

        Ok(ExecutionOutcome {
            response: submitted.response,
            signatures: submitted.signatures,
            attempts: submitted.attempts,
            confirmation,
        })
    }
}

/// Owns the client for one invocation.
///
/// `release` closes it in place. If the invocation future is dropped first,
/// the close runs on a spawned task instead.
struct ClientLease {
    client: Arc<dyn LedgerClient>,
    released: bool,
}

impl ClientLease {
    fn new(client: Box<dyn LedgerClient>) -> Self {
        Self {
            client: Arc::from(client),
            released: false,
        }
    }

    fn client(&self) -> &dyn LedgerClient {
        self.client.as_ref()
    }

    async fn release(mut self) {
        self.released = true;
        self.client.close().await;
    }
}

impl Drop for ClientLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let client = self.client.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!("Invocation dropped before completion, releasing ledger client");
                handle.spawn(async move { client.close().await });
            }
            Err(_) => tracing::warn!("No runtime to release ledger client on"),
        }
    }
}
