//! Transaction submission engine for Solana-style ledgers.
//!
//! Submits a caller-built transaction with bounded retries, then optionally
//! polls signature statuses until a confirmation target or a deadline.

pub mod config;
pub mod engine;
pub mod ledger;
pub mod observability;
pub mod resilience;

pub use config::schema::EngineConfig;
pub use engine::{Confirmation, Engine, EngineError, ExecuteOptions, ExecutionOutcome, TimeoutPolicy};
pub use ledger::{Keypair, LedgerClient, LedgerConnector, LedgerError, RpcConnector, Transaction};
