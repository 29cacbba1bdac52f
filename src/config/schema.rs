//! Configuration schema definitions.
//!
//! All sections are optional in the file; omitted fields fall back to the
//! engine defaults.

use serde::{Deserialize, Serialize};

use crate::engine::options::TimeoutPolicy;

/// Root configuration for the submitter.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Ledger endpoint settings.
    pub ledger: LedgerConfig,

    /// Submission retry settings.
    pub submit: SubmitConfig,

    /// Confirmation polling settings.
    pub confirmation: ConfirmationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ledger endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8899".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Submission retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SubmitConfig {
    /// Maximum submission attempts.
    pub max_retries: u32,

    /// Sleep between attempts.
    pub backoff_enabled: bool,

    /// First backoff delay in milliseconds.
    pub base_delay_ms: u64,

    /// Backoff ceiling in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_enabled: false,
            base_delay_ms: 100,
            max_delay_ms: 2_000,
        }
    }
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Return right after submission.
    pub skip: bool,

    /// Polling deadline in seconds.
    pub max_timeout_secs: u64,

    /// Confirmation count accepted when `finalized` is false.
    pub target: u64,

    /// Require finality.
    pub finalized: bool,

    /// Delay between status polls in milliseconds.
    pub poll_interval_ms: u64,

    /// Timeout handling ("report" or "fail").
    pub on_timeout: TimeoutPolicy,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            skip: false,
            max_timeout_secs: 60,
            target: 20,
            finalized: true,
            poll_interval_ms: 1_000,
            on_timeout: TimeoutPolicy::Report,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
