//! Keyed commitment state table with guarded transitions.
//!
//! Each commitment id maps to one of three states:
//!
//! - `Unknown` (absent from the table): never seen.
//! - `Active`: deposited or created by a swap, spendable exactly once.
//! - `Spent`: consumed; terminal for that object.
//!
//! Content addressing makes one edge case observable: after a commitment is
//! spent, activating the structurally identical triple produces the same id
//! again, and the table accepts it as a fresh `Active` entry. Only an id that
//! is currently `Active` rejects re-activation.

use std::collections::HashMap;

use pswap_core::{CommitmentId, PoolError, PoolResult};

/// Recorded state of a known commitment id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitmentState {
    Active,
    Spent,
}

/// The ledger's commitment table. Absence means `Unknown`.
#[derive(Default)]
pub struct StateTable {
    entries: HashMap<CommitmentId, CommitmentState>,
}

impl StateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// State of `id`, or `None` when it was never activated.
    pub fn status(&self, id: CommitmentId) -> Option<CommitmentState> {
        self.entries.get(&id).copied()
    }

    pub fn is_active(&self, id: CommitmentId) -> bool {
        self.status(id) == Some(CommitmentState::Active)
    }

    /// Check that `id` may transition to `Active` without mutating.
    pub fn can_activate(&self, id: CommitmentId) -> PoolResult<()> {
        match self.status(id) {
            Some(CommitmentState::Active) => Err(PoolError::DuplicateCommitment(id)),
            _ => Ok(()),
        }
    }

    /// Check that `id` may transition to `Spent` without mutating.
    pub fn can_spend(&self, id: CommitmentId) -> PoolResult<()> {
        match self.status(id) {
            None => Err(PoolError::CommitmentNotFound(id)),
            Some(CommitmentState::Spent) => Err(PoolError::CommitmentSpent(id)),
            Some(CommitmentState::Active) => Ok(()),
        }
    }

    /// Transition `id` to `Active`.
    pub fn activate(&mut self, id: CommitmentId) -> PoolResult<()> {
        self.can_activate(id)?;
        self.entries.insert(id, CommitmentState::Active);
        Ok(())
    }

    /// Transition `id` to `Spent`.
    pub fn spend(&mut self, id: CommitmentId) -> PoolResult<()> {
        self.can_spend(id)?;
        self.entries.insert(id, CommitmentState::Spent);
        Ok(())
    }
}
