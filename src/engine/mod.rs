//! Submit-retry-confirm engine.
//!
//! # Data Flow
//! ```text
//! caller
//!     → facade.rs (open client, normalize signers)
//!     → retrier.rs (bounded sequential submission attempts)
//!     → poller.rs (fixed-cadence status polling until target or deadline)
//!     → facade.rs (close client, apply timeout policy)
//!     → ExecutionOutcome back to caller
//! ```
//!
//! # Design Decisions
//! - One logical task per invocation; no shared mutable state between invocations
//! - Submission strictly precedes polling
//! - Timeout is a distinct outcome, not a silent success

pub mod error;
pub mod facade;
pub mod options;
pub mod poller;
pub mod retrier;

#[cfg(test)]
pub(crate) mod mock;

pub use error::EngineError;
pub use facade::{Engine, ExecutionOutcome};
pub use options::{ExecuteOptions, TimeoutPolicy};
pub use poller::{wait_for_confirmation, Confirmation, PollSettings};
pub use retrier::{submit_with_retries, AttemptOutcome, SubmissionAttempt, Submitted};
