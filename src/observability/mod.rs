//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine events (attempt failed, submitted, confirmed, timed out):
//!     → observer.rs (SubmissionObserver injected into the engine)
//!         → logging.rs (structured tracing events)
//!         → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log output (stdout via tracing-subscriber)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The engine never logs directly; it reports to an injected observer
//! - Operation ID span wraps each invocation for correlation
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
pub mod observer;

pub use observer::{SubmissionObserver, TracingObserver};
