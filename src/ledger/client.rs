//! Ledger client adapter boundary.
//!
//! # Responsibilities
//! - Define the two remote operations the engine consumes
//! - Define how a client is opened for one invocation and released afterwards
//!
//! # Design Decisions
//! - No retry logic here; callers decide what to do with errors
//! - A client is owned by exactly one invocation and never shared

use async_trait::async_trait;

use crate::ledger::transaction::Transaction;
use crate::ledger::types::{LedgerResult, Signature, SignatureStatus, SubmitOptions, SubmitResponse};
use crate::ledger::wallet::Keypair;

/// Connected handle to one ledger endpoint.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Sign `tx` with `signers` and broadcast it.
    ///
    /// On success the transaction's signature slots are filled.
    async fn submit(
        &self,
        tx: &mut Transaction,
        signers: &[Keypair],
        options: &SubmitOptions,
    ) -> LedgerResult<SubmitResponse>;

    /// Look up the status of each signature; `None` where the ledger has not seen it.
    async fn query_statuses(
        &self,
        signatures: &[Signature],
    ) -> LedgerResult<Vec<Option<SignatureStatus>>>;

    /// Release network resources held by this client.
    async fn close(&self) {}
}

/// Opens clients for an endpoint.
#[async_trait]
pub trait LedgerConnector: Send + Sync {
    /// Open a client scoped to a single invocation.
    async fn connect(&self, endpoint: &str) -> LedgerResult<Box<dyn LedgerClient>>;
}
