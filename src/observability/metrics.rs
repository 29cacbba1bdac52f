//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tx_submit_attempts_total` (counter): attempts by outcome
//! - `tx_submissions_total` (counter): finished submissions by result
//! - `tx_confirmations_total` (counter): confirmation waits by result
//! - `tx_confirmation_seconds` (histogram): time until the target was observed
//! - `ledger_clients_open` (gauge): clients currently held by invocations

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one submission attempt.
pub fn record_attempt(outcome: &'static str) {
    counter!("tx_submit_attempts_total", "outcome" => outcome).increment(1);
}

/// Record the end of a submission loop.
pub fn record_submission(result: &'static str) {
    counter!("tx_submissions_total", "result" => result).increment(1);
}

/// Record the end of a confirmation wait.
pub fn record_confirmation(result: &'static str, elapsed: Duration) {
    counter!("tx_confirmations_total", "result" => result).increment(1);
    if result == "confirmed" {
        histogram!("tx_confirmation_seconds").record(elapsed.as_secs_f64());
    }
}

/// A ledger client was opened.
pub fn record_client_opened() {
    gauge!("ledger_clients_open").increment(1.0);
}

/// A ledger client was released.
pub fn record_client_closed() {
    gauge!("ledger_clients_open").decrement(1.0);
}
