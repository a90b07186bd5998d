//! pswap-core
//!
//! Shared building blocks for the privacy-swap pool: the commitment codec,
//! address/hash newtypes, ledger event schemas, and the error taxonomy used by
//! every crate in the workspace.
//!
//! A commitment is a content-addressed claim on pooled funds:
//! `id = keccak256(amount ‖ token ‖ owner_hash)`. The ledger stores nothing
//! beyond an existence flag per id, so callers must re-supply the
//! `(amount, token, owner_hash)` triple and re-hash it to prove membership.

pub mod codec;
pub mod error;
pub mod events;
pub mod types;

pub use codec::{commit, derive_owner_hash};
pub use error::{PoolError, PoolResult};
pub use events::{DepositEvent, EventKind, EventLog, TransactionRecord, WithdrawEvent};
pub use types::{Address, Amount, CommitmentId, OwnerHash, TokenMetadata, TxId};

/// Fixed-point decimals used by the price-oracle rate convention.
pub const RATE_DECIMALS: u32 = 8;

/// One unit in the oracle's fixed-point convention.
pub const RATE_ONE: u128 = 10u128.pow(RATE_DECIMALS);
