//! pswap-vault
//!
//! The commitment ledger state machine for the privacy-swap pool: a keyed
//! state table with guarded transitions, the async [`Ledger`] and
//! [`TransactionSource`] client traits, and an in-memory [`Vault`] that
//! implements both while tracking custody and emitted event logs.

pub mod ledger;
pub mod state;
pub mod vault;

pub use ledger::{CommitmentClaim, Ledger, TransactionSource};
pub use state::{CommitmentState, StateTable};
pub use vault::Vault;
