//! Error taxonomy for the privacy-swap pool.
//!
//! Every reconciliation job yields exactly one terminal outcome: success or a
//! single typed error from this enum. Verification failures abort before any
//! mutation; a [`PoolError::CacheUnavailable`] after a successful ledger
//! submission leaves the ledger authoritative and the cache stale until a
//! reconciliation pass repairs it.

use thiserror::Error;

use crate::events::EventKind;
use crate::types::{Address, Amount, CommitmentId, TxId};

/// Result alias used across the workspace.
pub type PoolResult<T> = Result<T, PoolError>;

/// Aggregated error type for ledger, engine, and cache operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Malformed caller input (bad hex, length mismatch, arithmetic overflow).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The referenced transaction does not exist on the ledger.
    #[error("transaction not found: {0}")]
    TransactionNotFound(TxId),

    /// The transaction exists but carries no decodable event of this kind.
    #[error("no {0} event found in transaction logs")]
    EventNotFound(EventKind),

    /// A commitment with this id is already active.
    #[error("commitment exists: {0}")]
    DuplicateCommitment(CommitmentId),

    /// The commitment id is unknown to the ledger.
    #[error("commitment not found: {0}")]
    CommitmentNotFound(CommitmentId),

    /// The commitment was already consumed.
    #[error("commitment spent: {0}")]
    CommitmentSpent(CommitmentId),

    /// A swap input candidate failed verification.
    #[error("invalid swap input commitment: {0}")]
    CommitmentInvalid(CommitmentId),

    /// Verified swap inputs sum to less than the requested input amount.
    #[error("insufficient commitment total: verified {actual}, requested {requested}")]
    InsufficientInput { actual: Amount, requested: Amount },

    /// The priced output falls below the caller's minimum.
    #[error("swap would yield {amount_out}, below minimum {minimum_out}")]
    SlippageExceeded {
        amount_out: Amount,
        minimum_out: Amount,
    },

    /// The cached balance cannot cover the requested movement. Signals
    /// divergence from ledger truth, not a user error.
    #[error("cached balance underflow for {token}: have {available}, need {requested}")]
    InsufficientCachedBalance {
        token: Address,
        available: Amount,
        requested: Amount,
    },

    /// The revealed secret does not hash to the claimed owner hash.
    #[error("unauthorized: owner secret does not match owner hash")]
    Unauthorized,

    /// The off-chain cache could not be reached or updated.
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    /// A ledger command was submitted but did not complete.
    #[error("ledger submission failed: {0}")]
    LedgerSubmissionFailed(String),
}

impl PoolError {
    /// Stable machine-readable code for API responses and logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            PoolError::InvalidInput(_) => "INVALID_INPUT",
            PoolError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            PoolError::EventNotFound(_) => "EVENT_NOT_FOUND",
            PoolError::DuplicateCommitment(_) => "DUPLICATE_COMMITMENT",
            PoolError::CommitmentNotFound(_) => "COMMITMENT_NOT_FOUND",
            PoolError::CommitmentSpent(_) => "COMMITMENT_SPENT",
            PoolError::CommitmentInvalid(_) => "COMMITMENT_INVALID",
            PoolError::InsufficientInput { .. } => "INSUFFICIENT_INPUT",
            PoolError::SlippageExceeded { .. } => "SLIPPAGE_EXCEEDED",
            PoolError::InsufficientCachedBalance { .. } => "INSUFFICIENT_CACHED_BALANCE",
            PoolError::Unauthorized => "UNAUTHORIZED",
            PoolError::CacheUnavailable(_) => "CACHE_UNAVAILABLE",
            PoolError::LedgerSubmissionFailed(_) => "LEDGER_SUBMISSION_FAILED",
        }
    }

    /// HTTP status the rail service should map this error to.
    pub fn suggested_status_code(&self) -> u16 {
        match self {
            PoolError::InvalidInput(_)
            | PoolError::DuplicateCommitment(_)
            | PoolError::CommitmentInvalid(_)
            | PoolError::InsufficientInput { .. }
            | PoolError::SlippageExceeded { .. } => 400,
            PoolError::Unauthorized => 401,
            PoolError::TransactionNotFound(_)
            | PoolError::EventNotFound(_)
            | PoolError::CommitmentNotFound(_) => 404,
            PoolError::CommitmentSpent(_) => 409,
            PoolError::InsufficientCachedBalance { .. } => 409,
            PoolError::CacheUnavailable(_) | PoolError::LedgerSubmissionFailed(_) => 502,
        }
    }
}
