//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Submission attempt fails with a retryable error:
//!     → engine retrier checks the attempt budget
//!     → backoff.rs (optional delay: exponential + jitter)
//!     → next attempt
//! ```
//!
//! # Design Decisions
//! - Only network-class errors are retried
//! - Backoff is opt-in; by default attempts run back to back
//! - Delay doubles per retry up to a ceiling, with up to 10% jitter

pub mod backoff;

pub use backoff::{calculate_backoff, BackoffConfig};
