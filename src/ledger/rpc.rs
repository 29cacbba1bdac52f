//! JSON-RPC ledger client over HTTP.
//!
//! # Responsibilities
//! - Encode and broadcast signed transactions via `sendTransaction`
//! - Query confirmation state via `getSignatureStatuses`
//! - Translate HTTP and JSON-RPC failures into tagged [`LedgerError`]s

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::ledger::client::{LedgerClient, LedgerConnector};
use crate::ledger::transaction::Transaction;
use crate::ledger::types::{
    ConfirmationLevel, LedgerError, LedgerResult, Signature, SignatureStatus, SubmitOptions,
    SubmitResponse,
};
use crate::ledger::wallet::Keypair;
use crate::observability::metrics;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON-RPC client bound to one endpoint.
pub struct RpcLedgerClient {
    /// HTTP client; owns the connection pool for this endpoint.
    client: reqwest::Client,
    /// Parsed endpoint URL.
    endpoint: url::Url,
    /// Request ID counter.
    next_id: AtomicU64,
    /// Set once the open-clients gauge has been decremented.
    released: AtomicBool,
}

impl RpcLedgerClient {
    /// Create a client for `endpoint`.
    ///
    /// # Arguments
    /// * `endpoint` - http(s) URL of the JSON-RPC endpoint
    /// * `request_timeout` - deadline for each HTTP request
    pub fn new(endpoint: &str, request_timeout: Duration) -> LedgerResult<Self> {
        let endpoint: url::Url = endpoint
            .parse()
            .map_err(|e| LedgerError::InvalidEndpoint(format!("'{}': {}", endpoint, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(LedgerError::InvalidEndpoint(format!(
                "unsupported scheme '{}'",
                endpoint.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| LedgerError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            next_id: AtomicU64::new(1),
            released: AtomicBool::new(false),
        })
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    /// Decrement the open-clients gauge, at most once per client.
    fn release(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            metrics::record_client_closed();
            tracing::debug!(endpoint = %self.endpoint, "Ledger client released");
        }
    }

    /// Issue one JSON-RPC call. Returns the full envelope and its `result` member.
    async fn call(&self, method: &str, params: Value) -> LedgerResult<(Value, Value)> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(method, e))?;

        let status = response.status();
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LedgerError::Transport(format!("{} returned HTTP {}", method, status)));
        }
        if !status.is_success() {
            return Err(LedgerError::Rejected {
                code: i64::from(status.as_u16()),
                message: format!("{} returned HTTP {}", method, status),
            });
        }

        let envelope: Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                LedgerError::Serialization(format!("{} response is not JSON: {}", method, e))
            } else {
                transport_error(method, e)
            }
        })?;

        if let Some(error) = envelope.get("error").filter(|e| !e.is_null()) {
            let parsed: JsonRpcError = serde_json::from_value(error.clone()).map_err(|e| {
                LedgerError::Serialization(format!("{} returned malformed error: {}", method, e))
            })?;
            return Err(LedgerError::from_rpc(parsed.code, parsed.message));
        }

        let result = envelope.get("result").cloned().ok_or_else(|| {
            LedgerError::Serialization(format!("{} returned neither result nor error", method))
        })?;

        Ok((envelope, result))
    }
}

fn transport_error(method: &str, e: reqwest::Error) -> LedgerError {
    if e.is_timeout() {
        LedgerError::Transport(format!("{} timed out: {}", method, e))
    } else {
        LedgerError::Transport(format!("{} failed: {}", method, e))
    }
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    /// JSON-RPC error code.
    code: i64,
    /// Human-readable message.
    message: String,
}

/// `sendTransaction` configuration object.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendConfig {
    encoding: &'static str,
    skip_preflight: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    preflight_commitment: Option<ConfirmationLevel>,
}

/// `getSignatureStatuses` result payload.
#[derive(Debug, Deserialize)]
struct StatusesResult {
    value: Vec<Option<SignatureStatus>>,
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn submit(
        &self,
        tx: &mut Transaction,
        signers: &[Keypair],
        options: &SubmitOptions,
    ) -> LedgerResult<SubmitResponse> {
        tx.sign(signers)?;
        let encoded = BASE64_STANDARD.encode(tx.serialize()?);

        let config = SendConfig {
            encoding: "base64",
            skip_preflight: options.skip_preflight,
            preflight_commitment: options.preflight_commitment,
        };
        let (raw, result) = self.call("sendTransaction", json!([encoded, config])).await?;

        let signature = result.as_str().map(str::to_owned).ok_or_else(|| {
            LedgerError::Serialization(format!("sendTransaction result is not a string: {}", result))
        })?;

        if let Some(expected) = tx.signatures().first() {
            if expected.to_string() != signature {
                tracing::warn!(
                    expected = %expected,
                    returned = %signature,
                    "Ledger returned a different signature than the one signed"
                );
            }
        }

        Ok(SubmitResponse { raw, signature })
    }

    async fn query_statuses(
        &self,
        signatures: &[Signature],
    ) -> LedgerResult<Vec<Option<SignatureStatus>>> {
        let encoded: Vec<String> = signatures.iter().map(ToString::to_string).collect();
        let (_, result) = self
            .call(
                "getSignatureStatuses",
                json!([encoded, { "searchTransactionHistory": false }]),
            )
            .await?;

        let parsed: StatusesResult = serde_json::from_value(result).map_err(|e| {
            LedgerError::Serialization(format!("Malformed getSignatureStatuses result: {}", e))
        })?;

        if parsed.value.len() != signatures.len() {
            return Err(LedgerError::Serialization(format!(
                "Requested {} statuses, received {}",
                signatures.len(),
                parsed.value.len()
            )));
        }
        Ok(parsed.value)
    }

    async fn close(&self) {
        self.release();
    }
}

impl Drop for RpcLedgerClient {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for RpcLedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcLedgerClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

/// Opens a fresh [`RpcLedgerClient`] per invocation.
#[derive(Debug, Clone)]
pub struct RpcConnector {
    request_timeout: Duration,
}

impl RpcConnector {
    /// Create a connector with the given per-request timeout.
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

impl Default for RpcConnector {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl LedgerConnector for RpcConnector {
    async fn connect(&self, endpoint: &str) -> LedgerResult<Box<dyn LedgerClient>> {
        let client = RpcLedgerClient::new(endpoint, self.request_timeout)?;
        metrics::record_client_opened();
        tracing::debug!(endpoint = %client.endpoint(), "Ledger client opened");
        Ok(Box::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_endpoint() {
        let err = RpcLedgerClient::new("not a url", DEFAULT_REQUEST_TIMEOUT).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidEndpoint(_)));

        let err = RpcLedgerClient::new("ftp://example.com", DEFAULT_REQUEST_TIMEOUT).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_send_config_shape() {
        let config = SendConfig {
            encoding: "base64",
            skip_preflight: true,
            preflight_commitment: None,
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value, json!({ "encoding": "base64", "skipPreflight": true }));

        let config = SendConfig {
            encoding: "base64",
            skip_preflight: false,
            preflight_commitment: Some(ConfirmationLevel::Confirmed),
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["preflightCommitment"], "confirmed");
    }

    #[tokio::test]
    async fn test_connect_unreachable_endpoint_is_lazy() {
        // Connecting does no I/O; failures surface on the first call.
        let connector = RpcConnector::new(Duration::from_millis(200));
        let client = connector.connect("http://127.0.0.1:1").await.unwrap();
        let err = client.query_statuses(&[Signature([1u8; 64])]).await.unwrap_err();
        assert!(err.is_retryable());
        client.close().await;
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let client = RpcLedgerClient::new("http://127.0.0.1:8899", DEFAULT_REQUEST_TIMEOUT).unwrap();
        assert!(!client.released.load(Ordering::Acquire));

        client.close().await;
        assert!(client.released.load(Ordering::Acquire));

        // a second close, and the drop after it, leave the flag set
        client.close().await;
        assert!(client.released.load(Ordering::Acquire));
    }
}
