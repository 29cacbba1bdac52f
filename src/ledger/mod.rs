//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Caller-built message
//!     → transaction.rs (required signers, signature slots, wire encoding)
//!     → wallet.rs (keypairs, signer-set normalization)
//!     → client.rs (adapter traits: submit, query statuses, close)
//!     → rpc.rs (JSON-RPC over HTTP)
//! ```
//!
//! # Security Constraints
//! - Secret seeds never leave `Keypair`
//! - Never log secrets; signatures and public keys only
//! - Every RPC call has a request timeout

pub mod client;
pub mod rpc;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{LedgerClient, LedgerConnector};
pub use rpc::{RpcConnector, RpcLedgerClient};
pub use transaction::Transaction;
pub use types::{
    ConfirmationLevel, ErrorClass, LedgerError, LedgerResult, Pubkey, Signature, SignatureStatus,
    SubmitOptions, SubmitResponse,
};
pub use wallet::{normalize_signers, Keypair, Seeded};
