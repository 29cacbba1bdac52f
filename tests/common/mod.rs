//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Instant;

use tx_submitter::ledger::transaction::legacy_message_for;
use tx_submitter::ledger::{
    ConfirmationLevel, Keypair, LedgerClient, LedgerConnector, LedgerError, LedgerResult,
    Signature, SignatureStatus, SubmitOptions, SubmitResponse, Transaction,
};
use tx_submitter::observability::SubmissionObserver;

/// Unsigned transaction requiring the signer derived from `seed`.
pub fn transaction_for(seed: u8) -> (Transaction, Keypair) {
    let payer = Keypair::from_seed(&[seed; 32]);
    let message = legacy_message_for(&[payer.pubkey()], b"memo").unwrap();
    let tx = Transaction::from_message(message).unwrap();
    (tx, payer)
}

pub fn status(confirmations: Option<u64>, level: ConfirmationLevel) -> Option<SignatureStatus> {
    Some(SignatureStatus {
        confirmations,
        confirmation_status: Some(level),
        err: None,
    })
}

// ---------------------------------------------------------------------------
// JSON-RPC HTTP backend
// ---------------------------------------------------------------------------

/// Handle to a running mock JSON-RPC endpoint.
pub struct RpcBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl RpcBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request bodies received so far.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a programmable JSON-RPC backend on an ephemeral port.
///
/// `handler` receives each parsed request body and returns the HTTP status and
/// raw response body.
pub async fn start_rpc_backend<F>(handler: F) -> RpcBackend
where
    F: Fn(&Value) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let handler = Arc::new(handler);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let Some(body) = read_body(&mut socket).await else {
                            return;
                        };
                        recorded.lock().unwrap().push(body.clone());

                        let (status, response) = handler(&body);
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    RpcBackend { addr, requests }
}

/// Read one HTTP request and parse its body as JSON.
async fn read_body(socket: &mut TcpStream) -> Option<Value> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    serde_json::from_slice(&buf[header_end..header_end + content_length]).ok()
}

pub fn rpc_result(request: &Value, result: Value) -> String {
    json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }).to_string()
}

pub fn rpc_error(request: &Value, code: i64, message: &str) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": request["id"],
        "error": { "code": code, "message": message },
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// Scripted in-memory ledger
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Script {
    submits: Mutex<VecDeque<LedgerResult<()>>>,
    statuses: Mutex<VecDeque<LedgerResult<Vec<Option<SignatureStatus>>>>>,
    submit_times: Mutex<Vec<Instant>>,
    query_times: Mutex<Vec<Instant>>,
    opened: AtomicU32,
    closed: AtomicU32,
}

/// In-memory ledger driven by queued responses.
///
/// Submissions succeed and statuses stay pending once their queues drain.
#[derive(Clone, Default)]
pub struct ScriptedLedger {
    script: Arc<Script>,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_submit(&self, result: LedgerResult<()>) -> &Self {
        self.script.submits.lock().unwrap().push_back(result);
        self
    }

    pub fn push_status(&self, result: LedgerResult<Vec<Option<SignatureStatus>>>) -> &Self {
        self.script.statuses.lock().unwrap().push_back(result);
        self
    }

    pub fn submit_times(&self) -> Vec<Instant> {
        self.script.submit_times.lock().unwrap().clone()
    }

    pub fn query_times(&self) -> Vec<Instant> {
        self.script.query_times.lock().unwrap().clone()
    }

    pub fn opened(&self) -> u32 {
        self.script.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> u32 {
        self.script.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn submit(
        &self,
        tx: &mut Transaction,
        signers: &[Keypair],
        _options: &SubmitOptions,
    ) -> LedgerResult<SubmitResponse> {
        self.script.submit_times.lock().unwrap().push(Instant::now());
        let next = self.script.submits.lock().unwrap().pop_front();
        next.unwrap_or(Ok(()))?;

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
        self.script.query_times.lock().unwrap().push(Instant::now());
        let next = self.script.statuses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(vec![None; signatures.len()]))
    }

    async fn close(&self) {
        self.script.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerConnector for ScriptedLedger {
    async fn connect(&self, endpoint: &str) -> LedgerResult<Box<dyn LedgerClient>> {
        if !endpoint.starts_with("http") {
            return Err(LedgerError::InvalidEndpoint(endpoint.to_string()));
        }
        self.script.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.clone()))
    }
}

// ---------------------------------------------------------------------------
// Recording observer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    AttemptFailed(u32),
    Submitted(u32),
    SubmissionFailed(u32),
    Confirmed(Duration),
    TimedOut(Duration),
}

/// Keeps the engine's milestone events in order.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl SubmissionObserver for RecordingObserver {
    fn attempt_failed(&self, attempt: u32, _max_retries: u32, _error: &LedgerError) {
        self.events.lock().unwrap().push(Event::AttemptFailed(attempt));
    }

    fn submitted(&self, attempt: u32, _signature: Option<&Signature>) {
        self.events.lock().unwrap().push(Event::Submitted(attempt));
    }

    fn submission_failed(&self, attempts: u32, _error: &LedgerError) {
        self.events.lock().unwrap().push(Event::SubmissionFailed(attempts));
    }

    fn confirmed(&self, elapsed: Duration, _status: &SignatureStatus) {
        self.events.lock().unwrap().push(Event::Confirmed(elapsed));
    }

    fn timed_out(&self, elapsed: Duration) {
        self.events.lock().unwrap().push(Event::TimedOut(elapsed));
    }
}
