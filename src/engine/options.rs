//! Per-invocation execution options.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::schema::EngineConfig;
use crate::engine::poller::DEFAULT_POLL_INTERVAL;
use crate::resilience::backoff::BackoffConfig;

/// What to do when the confirmation deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// Return the submission result with a `TimedOut` confirmation.
    #[default]
    Report,
    /// Fail the invocation with `EngineError::ConfirmationTimeout`.
    Fail,
}

/// Options for one `Engine::execute` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteOptions {
    /// Submission attempts before giving up.
    pub max_retries: u32,
    /// Return right after submission without polling.
    pub skip_confirmation: bool,
    /// Polling deadline.
    pub max_timeout: Duration,
    /// Confirmation count accepted when finality is not required.
    pub target: u64,
    /// Require finality rather than a confirmation count.
    pub finalized: bool,
    /// Delay between status polls.
    pub poll_interval: Duration,
    /// Timeout handling.
    pub on_timeout: TimeoutPolicy,
    /// Delay between submission attempts; `None` retries immediately.
    pub backoff: Option<BackoffConfig>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            skip_confirmation: false,
            max_timeout: Duration::from_secs(60),
            target: 20,
            finalized: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
            on_timeout: TimeoutPolicy::Report,
            backoff: None,
        }
    }
}

impl ExecuteOptions {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_skip_confirmation(mut self, skip: bool) -> Self {
        self.skip_confirmation = skip;
        self
    }

    pub fn with_max_timeout(mut self, max_timeout: Duration) -> Self {
        self.max_timeout = max_timeout;
        self
    }

    pub fn with_target(mut self, target: u64) -> Self {
        self.target = target;
        self
    }

    pub fn with_finalized(mut self, finalized: bool) -> Self {
        self.finalized = finalized;
        self
    }

    /// Set the polling cadence. A zero interval falls back to the default.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = if poll_interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            poll_interval
        };
        self
    }

    pub fn with_timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.on_timeout = policy;
        self
    }

    pub fn with_backoff(mut self, backoff: Option<BackoffConfig>) -> Self {
        self.backoff = backoff;
        self
    }
}

impl From<&EngineConfig> for ExecuteOptions {
    fn from(config: &EngineConfig) -> Self {
        let backoff = config.submit.backoff_enabled.then_some(BackoffConfig {
            base_ms: config.submit.base_delay_ms,
            max_ms: config.submit.max_delay_ms,
        });

        Self {
            max_retries: config.submit.max_retries,
            skip_confirmation: config.confirmation.skip,
            max_timeout: Duration::from_secs(config.confirmation.max_timeout_secs),
            target: config.confirmation.target,
            finalized: config.confirmation.finalized,
            poll_interval: Duration::from_millis(config.confirmation.poll_interval_ms),
            on_timeout: config.confirmation.on_timeout,
            backoff,
        }
    }
}
