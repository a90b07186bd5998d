//! Event resolution from finalized transactions.
//!
//! A job starts from a transaction id, fetches its record, and extracts the
//! one event it expects. Records can interleave logs from other contracts;
//! the first log of the requested kind wins, and multiple same-kind events in
//! one transaction are unsupported.

use pswap_core::{
    DepositEvent, EventKind, EventLog, PoolError, PoolResult, TransactionRecord, TxId,
    WithdrawEvent,
};
use pswap_vault::TransactionSource;

async fn fetch_record(
    source: &dyn TransactionSource,
    tx_id: TxId,
) -> PoolResult<TransactionRecord> {
    source
        .transaction_record(tx_id)
        .await?
        .ok_or(PoolError::TransactionNotFound(tx_id))
}

/// Resolve the deposit event emitted by `tx_id`.
pub async fn resolve_deposit(
    source: &dyn TransactionSource,
    tx_id: TxId,
) -> PoolResult<DepositEvent> {
    let record = fetch_record(source, tx_id).await?;
    record
        .logs
        .iter()
        .find_map(|log| match log {
            EventLog::Deposit(event) => Some(event.clone()),
            _ => None,
        })
        .ok_or(PoolError::EventNotFound(EventKind::Deposit))
}

/// Resolve the withdrawal event emitted by `tx_id`.
pub async fn resolve_withdraw(
    source: &dyn TransactionSource,
    tx_id: TxId,
) -> PoolResult<WithdrawEvent> {
    let record = fetch_record(source, tx_id).await?;
    record
        .logs
        .iter()
        .find_map(|log| match log {
            EventLog::Withdraw(event) => Some(event.clone()),
            _ => None,
        })
        .ok_or(PoolError::EventNotFound(EventKind::Withdraw))
}
