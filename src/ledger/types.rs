//! Ledger-facing types and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an ed25519 public key.
pub const PUBKEY_LEN: usize = 32;

/// Length of an ed25519 signature.
pub const SIGNATURE_LEN: usize = 64;

/// Public key of an account, displayed as base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pubkey(pub [u8; PUBKEY_LEN]);

impl Pubkey {
    /// Raw key bytes.
    pub fn to_bytes(&self) -> [u8; PUBKEY_LEN] {
        self.0
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self)
    }
}

impl FromStr for Pubkey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_base58::<PUBKEY_LEN>(s).map(Self)
    }
}

/// Transaction signature. The first signature of a transaction identifies it on the ledger.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; SIGNATURE_LEN]);

impl Signature {
    /// Raw signature bytes.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

impl FromStr for Signature {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_base58::<SIGNATURE_LEN>(s).map(Self)
    }
}

impl From<ed25519_dalek::Signature> for Signature {
    fn from(sig: ed25519_dalek::Signature) -> Self {
        Self(sig.to_bytes())
    }
}

fn decode_base58<const N: usize>(s: &str) -> Result<[u8; N], LedgerError> {
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|e| LedgerError::Serialization(format!("invalid base58 '{}': {}", s, e)))?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        LedgerError::Serialization(format!("expected {} bytes, decoded {}", N, len))
    })
}

/// Commitment level the ledger reports for an observed signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationLevel {
    /// Seen by the node, not yet voted on.
    Processed,
    /// Voted on by a supermajority.
    Confirmed,
    /// Rooted; irreversible.
    Finalized,
}

/// Status of one signature as reported by `getSignatureStatuses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    /// Number of blocks built on top of the one holding the transaction.
    /// `None` once the block is rooted.
    pub confirmations: Option<u64>,
    /// Commitment level, if the node reports one.
    #[serde(default)]
    pub confirmation_status: Option<ConfirmationLevel>,
    /// Execution error recorded by the ledger, passed through untouched.
    #[serde(default)]
    pub err: Option<serde_json::Value>,
}

impl SignatureStatus {
    /// Whether the ledger reports this signature as finalized.
    pub fn is_finalized(&self) -> bool {
        self.confirmation_status == Some(ConfirmationLevel::Finalized)
    }

    /// Whether this status meets the requested confirmation target.
    ///
    /// With `require_finalized` only finality counts; otherwise either finality or
    /// `confirmations >= target` does.
    pub fn satisfies(&self, target: u64, require_finalized: bool) -> bool {
        if self.is_finalized() {
            return true;
        }
        if require_finalized {
            return false;
        }
        self.confirmations.is_some_and(|c| c >= target)
    }
}

/// Options forwarded with each submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Skip the node-side simulation before broadcasting.
    pub skip_preflight: bool,
    /// Commitment used for preflight when it runs.
    pub preflight_commitment: Option<ConfirmationLevel>,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            skip_preflight: true,
            preflight_commitment: None,
        }
    }
}

/// Raw result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitResponse {
    /// JSON-RPC envelope exactly as returned by the endpoint.
    pub raw: serde_json::Value,
    /// Signature string the ledger echoed back.
    pub signature: String,
}

/// Coarse classification of a ledger error, used to decide retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Network-level failure; the request may not have arrived.
    Network,
    /// The node refused the transaction.
    Rejection,
    /// Bytes on either side of the wire could not be encoded or decoded.
    Serialization,
    /// Local signing or configuration problem.
    Local,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Connection failed, timed out, or the endpoint answered with 429/5xx.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The node is temporarily unable to serve the request.
    #[error("Node unavailable ({code}): {message}")]
    Unavailable { code: i64, message: String },

    /// The node rejected the request.
    #[error("Rejected by ledger ({code}): {message}")]
    Rejected { code: i64, message: String },

    /// Request or response could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Signer set does not match the transaction.
    #[error("Signing error: {0}")]
    Signing(String),

    /// Endpoint address is not a usable URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl LedgerError {
    /// Classify this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            LedgerError::Transport(_) | LedgerError::Unavailable { .. } => ErrorClass::Network,
            LedgerError::Rejected { .. } => ErrorClass::Rejection,
            LedgerError::Serialization(_) => ErrorClass::Serialization,
            LedgerError::Signing(_) | LedgerError::InvalidEndpoint(_) => ErrorClass::Local,
        }
    }

    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Network
    }

    /// Map a JSON-RPC error object onto a tagged error.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            // node behind, slot skipped, min context slot not reached, internal
            -32004 | -32005 | -32014 | -32016 | -32603 => {
                LedgerError::Unavailable { code, message }
            }
            _ => LedgerError::Rejected { code, message },
        }
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
