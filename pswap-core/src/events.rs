//! Ledger-emitted event schemas and transaction records.
//!
//! Events are immutable facts produced by the vault contract; the off-chain
//! engine only ever reads them back out of a finalized transaction's logs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Address, Amount, CommitmentId, OwnerHash, TxId};

/// The event kinds the engine knows how to decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Deposit,
    Withdraw,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Deposit => f.write_str("Deposit"),
            EventKind::Withdraw => f.write_str("Withdraw"),
        }
    }
}

/// Emitted when a deposit escrows funds and activates a commitment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    /// Depositing account.
    pub from: Address,
    /// Token escrowed into custody.
    pub token: Address,
    /// Amount escrowed, smallest unit.
    pub amount: Amount,
    /// Owner hash bound into the commitment.
    pub owner_hash: OwnerHash,
    /// The activated commitment id.
    pub commitment_id: CommitmentId,
}

/// Emitted when a withdrawal spends commitments and releases custody.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawEvent {
    /// Recipient of the released funds.
    pub to: Address,
    /// Token released from custody.
    pub token: Address,
    /// Total amount released, smallest unit.
    pub amount: Amount,
    /// Owner hash shared by the spent commitments.
    pub owner_hash: OwnerHash,
}

/// One log entry in a transaction record.
///
/// Transactions can carry logs from other contracts; anything the engine
/// cannot decode is preserved as [`EventLog::Other`] and skipped during
/// event resolution.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventLog {
    Deposit(DepositEvent),
    Withdraw(WithdrawEvent),
    Other {
        /// Raw topic of the undecodable log.
        topic: String,
    },
}

impl EventLog {
    /// The kind of this log, if it is one the engine decodes.
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            EventLog::Deposit(_) => Some(EventKind::Deposit),
            EventLog::Withdraw(_) => Some(EventKind::Withdraw),
            EventLog::Other { .. } => None,
        }
    }
}

/// A finalized ledger transaction and its emitted logs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction identifier.
    pub tx_id: TxId,
    /// Block in which the transaction finalized.
    pub block_number: u64,
    /// Emitted logs, in emission order.
    pub logs: Vec<EventLog>,
}
