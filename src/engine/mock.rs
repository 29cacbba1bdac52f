//! Scripted in-memory ledger used by engine unit tests.

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::ledger::client::LedgerClient;
use crate::ledger::transaction::{legacy_message_for, Transaction};
use crate::ledger::types::{
    ConfirmationLevel, LedgerError, LedgerResult, Signature, SignatureStatus, SubmitOptions,
    SubmitResponse,
};
use crate::ledger::wallet::Keypair;
use crate::observability::SubmissionObserver;

/// Unsigned one-signer transaction and its signer.
pub fn tx_fixture() -> (Transaction, Vec<Keypair>) {
    let payer = Keypair::from_seed(&[42u8; 32]);
    let message = legacy_message_for(&[payer.pubkey()], b"transfer").unwrap();
    let tx = Transaction::from_message(message).unwrap();
    (tx, vec![payer])
}

pub fn status(confirmations: Option<u64>, level: ConfirmationLevel) -> Option<SignatureStatus> {
    Some(SignatureStatus {
        confirmations,
        confirmation_status: Some(level),
        err: None,
    })
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SubmissionObserver for NoopObserver {}

/// One event seen by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    AttemptFailed { attempt: u32, error: LedgerError },
    Submitted { attempt: u32, signature: Option<Signature> },
    SubmissionFailed { attempts: u32 },
    Pending { elapsed: Duration },
    QueryFailed { elapsed: Duration },
    Confirmed { elapsed: Duration },
    TimedOut { elapsed: Duration },
}

/// Observer that keeps every event in order.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Observed>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Observed> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Observed) {
        self.events.lock().unwrap().push(event);
    }
}

impl SubmissionObserver for RecordingObserver {
    fn attempt_failed(&self, attempt: u32, _max_retries: u32, error: &LedgerError) {
        self.push(Observed::AttemptFailed {
            attempt,
            error: error.clone(),
        });
    }

    fn submitted(&self, attempt: u32, signature: Option<&Signature>) {
        self.push(Observed::Submitted {
            attempt,
            signature: signature.copied(),
        });
    }

    fn submission_failed(&self, attempts: u32, _error: &LedgerError) {
        self.push(Observed::SubmissionFailed { attempts });
    }

    fn status_pending(&self, elapsed: Duration, _status: Option<&SignatureStatus>) {
        self.push(Observed::Pending { elapsed });
    }

    fn status_query_failed(&self, elapsed: Duration, _error: &LedgerError) {
        self.push(Observed::QueryFailed { elapsed });
    }

    fn confirmed(&self, elapsed: Duration, _status: &SignatureStatus) {
        self.push(Observed::Confirmed { elapsed });
    }

    fn timed_out(&self, elapsed: Duration) {
        self.push(Observed::TimedOut { elapsed });
    }
}

/// Ledger whose responses are scripted per call. The last entry repeats once
/// a script runs out.
#[derive(Default)]
pub struct MockLedger {
    submits: Mutex<Vec<Result<(), LedgerError>>>,
    statuses: Mutex<Vec<LedgerResult<Vec<Option<SignatureStatus>>>>>,
    submit_calls: AtomicU32,
    query_times: Mutex<Vec<Instant>>,
    closed: AtomicBool,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submits(self, script: Vec<Result<(), LedgerError>>) -> Self {
        *self.submits.lock().unwrap() = script;
        self
    }

    pub fn with_statuses(self, script: Vec<LedgerResult<Vec<Option<SignatureStatus>>>>) -> Self {
        *self.statuses.lock().unwrap() = script;
        self
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn query_times(&self) -> Vec<Instant> {
        self.query_times.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

fn next<T: Clone>(script: &Mutex<Vec<T>>, fallback: T) -> T {
    let mut script = script.lock().unwrap();
    match script.len() {
        0 => fallback,
        1 => script[0].clone(),
        _ => script.remove(0),
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn submit(
        &self,
        tx: &mut Transaction,
        signers: &[Keypair],
        _options: &SubmitOptions,
    ) -> LedgerResult<SubmitResponse> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.submits, Ok(()))?;
        tx.sign(signers)?;
        let signature = tx.signatures()[0].to_string();
        Ok(SubmitResponse {
            raw: json!({ "jsonrpc": "2.0", "id": 1, "result": signature }),
            signature,
        })
    }

    async fn query_statuses(
        &self,
        signatures: &[Signature],
    ) -> LedgerResult<Vec<Option<SignatureStatus>>> {
        self.query_times.lock().unwrap().push(Instant::now());
        next(&self.statuses, Ok(vec![None; signatures.len()]))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
