//! Async client traits the reconciliation engine consumes.
//!
//! The engine never touches vault internals; it talks to the ledger through
//! [`Ledger`] and reads finalized transactions through [`TransactionSource`].
//! The in-memory [`crate::Vault`] implements both; a chain-backed client
//! would implement the same pair.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pswap_core::{
    commit, Address, Amount, CommitmentId, OwnerHash, PoolResult, TransactionRecord, TxId,
};

/// An opened commitment: the `(amount, token, owner_hash)` triple whose hash
/// is the commitment id. Callers re-supply the triple because the ledger
/// stores only the id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentClaim {
    pub amount: Amount,
    pub token: Address,
    pub owner_hash: OwnerHash,
}

impl CommitmentClaim {
    /// The content-addressed id of this claim.
    pub fn id(&self) -> CommitmentId {
        commit(self.amount, self.token, self.owner_hash)
    }
}

/// Authoritative commitment ledger.
///
/// Holding a `Ledger` handle is the operator capability: `atomic_update` has
/// no separate authentication and must only be reachable through the engine.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Whether `id` is currently in the Active state.
    async fn is_commitment_active(&self, id: CommitmentId) -> PoolResult<bool>;

    /// Escrow `claim.amount` of `claim.token` from `from` and activate the
    /// commitment. Fails with `DuplicateCommitment` while the id is Active.
    async fn deposit(&self, from: Address, claim: CommitmentClaim) -> PoolResult<TxId>;

    /// Atomically spend `consumed` and activate `created`. Everything is
    /// validated before any mutation; no intermediate state is observable.
    async fn atomic_update(
        &self,
        consumed: &[CommitmentId],
        created: &[CommitmentClaim],
    ) -> PoolResult<TxId>;

    /// Spend the given claims (all sharing one token and the owner hash of
    /// `secret`) and release their total from custody to `to`.
    async fn withdraw(
        &self,
        claims: &[CommitmentClaim],
        secret: &[u8],
        to: Address,
    ) -> PoolResult<TxId>;

    /// Per-token sums over all Active commitments. Ground truth for cache
    /// reconciliation.
    async fn active_totals(&self) -> PoolResult<HashMap<Address, Amount>>;
}

/// Read access to finalized transactions and their emitted logs.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn transaction_record(&self, tx_id: TxId) -> PoolResult<Option<TransactionRecord>>;
}
