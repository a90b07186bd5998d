//! In-memory vault: the authoritative ledger plus transaction log.
//!
//! Plays the role of the on-chain pool contract. Custody moves only on
//! deposit, withdraw, and operator funding; `atomic_update` reshuffles claims
//! against existing custody. Every mutation validates completely before
//! touching state, so a failed call leaves the vault exactly as it was.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::info;

use pswap_core::{
    derive_owner_hash, Address, Amount, CommitmentId, DepositEvent, EventLog, PoolError,
    PoolResult, TransactionRecord, TxId, WithdrawEvent,
};

use crate::ledger::{CommitmentClaim, Ledger, TransactionSource};
use crate::state::StateTable;

#[derive(Default)]
struct VaultInner {
    table: StateTable,
    /// Triples of currently Active commitments, for custody reconciliation.
    open_claims: HashMap<CommitmentId, CommitmentClaim>,
    /// Escrowed token balances held by the pool.
    custody: HashMap<Address, Amount>,
    /// Amounts released to recipients, keyed by (recipient, token).
    released: HashMap<(Address, Address), Amount>,
    records: HashMap<TxId, TransactionRecord>,
    seq: u64,
}

impl VaultInner {
    fn next_record(&mut self, logs: Vec<EventLog>) -> TxId {
        self.seq += 1;
        let mut raw = [0u8; 32];
        raw[24..].copy_from_slice(&self.seq.to_be_bytes());
        let tx_id = TxId(raw);
        self.records.insert(
            tx_id,
            TransactionRecord {
                tx_id,
                block_number: self.seq,
                logs,
            },
        );
        tx_id
    }

    fn add_custody(&mut self, token: Address, amount: Amount) -> PoolResult<()> {
        let slot = self.custody.entry(token).or_insert(0);
        *slot = slot
            .checked_add(amount)
            .ok_or_else(|| PoolError::InvalidInput("custody balance overflow".into()))?;
        Ok(())
    }

    fn sub_custody(&mut self, token: Address, amount: Amount) -> PoolResult<()> {
        let slot = self.custody.entry(token).or_insert(0);
        *slot = slot.checked_sub(amount).ok_or_else(|| {
            PoolError::LedgerSubmissionFailed(format!("custody underflow for token {}", token))
        })?;
        Ok(())
    }
}

/// In-memory commitment ledger.
#[derive(Default)]
pub struct Vault {
    inner: RwLock<VaultInner>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed pool liquidity in `token` without creating a commitment. Used by
    /// the operator to back swap outputs in a token nobody has deposited yet.
    pub fn fund(&self, token: Address, amount: Amount) -> PoolResult<()> {
        let mut inner = self.inner.write().unwrap();
        inner.add_custody(token, amount)?;
        info!(token = %token, amount, "vault funded");
        Ok(())
    }

    /// Current escrowed balance of `token`.
    pub fn custody(&self, token: Address) -> Amount {
        let inner = self.inner.read().unwrap();
        inner.custody.get(&token).copied().unwrap_or(0)
    }

    /// Total released to `to` in `token` across all withdrawals.
    pub fn released(&self, to: Address, token: Address) -> Amount {
        let inner = self.inner.read().unwrap();
        inner.released.get(&(to, token)).copied().unwrap_or(0)
    }

    /// Sum of Active commitment amounts in `token`.
    pub fn active_total(&self, token: Address) -> Amount {
        let inner = self.inner.read().unwrap();
        inner
            .open_claims
            .values()
            .filter(|claim| claim.token == token)
            .fold(0, |total, claim| total.saturating_add(claim.amount))
    }

    /// Whether custody covers the Active total for every token.
    pub fn conservation_holds(&self) -> bool {
        let inner = self.inner.read().unwrap();
        let mut totals: HashMap<Address, Amount> = HashMap::new();
        for claim in inner.open_claims.values() {
            let slot = totals.entry(claim.token).or_insert(0);
            *slot = slot.saturating_add(claim.amount);
        }
        totals
            .iter()
            .all(|(token, total)| inner.custody.get(token).copied().unwrap_or(0) >= *total)
    }
}

#[async_trait]
impl Ledger for Vault {
    async fn is_commitment_active(&self, id: CommitmentId) -> PoolResult<bool> {
        let inner = self.inner.read().unwrap();
        Ok(inner.table.is_active(id))
    }

    async fn deposit(&self, from: Address, claim: CommitmentClaim) -> PoolResult<TxId> {
        if claim.amount == 0 {
            return Err(PoolError::InvalidInput(
                "deposit amount must be positive".into(),
            ));
        }
        let id = claim.id();

        let mut inner = self.inner.write().unwrap();
        inner.table.can_activate(id)?;
        inner.add_custody(claim.token, claim.amount)?;
        inner.table.activate(id)?;
        inner.open_claims.insert(id, claim);

        let tx_id = inner.next_record(vec![EventLog::Deposit(DepositEvent {
            from,
            token: claim.token,
            amount: claim.amount,
            owner_hash: claim.owner_hash,
            commitment_id: id,
        })]);
        info!(commitment = %id, token = %claim.token, amount = claim.amount, "deposit accepted");
        Ok(tx_id)
    }

    async fn atomic_update(
        &self,
        consumed: &[CommitmentId],
        created: &[CommitmentClaim],
    ) -> PoolResult<TxId> {
        let mut inner = self.inner.write().unwrap();

        let mut seen = HashSet::new();
        for id in consumed {
            if !seen.insert(*id) {
                return Err(PoolError::InvalidInput(format!(
                    "duplicate consumed commitment {}",
                    id
                )));
            }
            inner.table.can_spend(*id)?;
        }
        let mut created_ids = Vec::with_capacity(created.len());
        for claim in created {
            let id = claim.id();
            if created_ids.contains(&id) {
                return Err(PoolError::InvalidInput(format!(
                    "duplicate created commitment {}",
                    id
                )));
            }
            inner.table.can_activate(id)?;
            created_ids.push(id);
        }

        for id in consumed {
            inner.table.spend(*id)?;
            inner.open_claims.remove(id);
        }
        for (claim, id) in created.iter().zip(created_ids.iter()) {
            inner.table.activate(*id)?;
            inner.open_claims.insert(*id, *claim);
        }

        let tx_id = inner.next_record(Vec::new());
        info!(
            consumed = consumed.len(),
            created = created.len(),
            "atomic update applied"
        );
        Ok(tx_id)
    }

    async fn withdraw(
        &self,
        claims: &[CommitmentClaim],
        secret: &[u8],
        to: Address,
    ) -> PoolResult<TxId> {
        let first = claims
            .first()
            .ok_or_else(|| PoolError::InvalidInput("withdrawal needs at least one claim".into()))?;
        let token = first.token;
        let expected = derive_owner_hash(secret);

        let mut inner = self.inner.write().unwrap();

        let mut total: Amount = 0;
        let mut seen = HashSet::new();
        for claim in claims {
            if claim.token != token {
                return Err(PoolError::InvalidInput(
                    "withdrawal claims must share one token".into(),
                ));
            }
            if claim.owner_hash != expected {
                return Err(PoolError::Unauthorized);
            }
            let id = claim.id();
            if !seen.insert(id) {
                return Err(PoolError::InvalidInput(format!(
                    "duplicate withdrawal claim {}",
                    id
                )));
            }
            inner.table.can_spend(id)?;
            total = total
                .checked_add(claim.amount)
                .ok_or_else(|| PoolError::InvalidInput("withdrawal total overflow".into()))?;
        }
        if inner.custody.get(&token).copied().unwrap_or(0) < total {
            return Err(PoolError::LedgerSubmissionFailed(format!(
                "custody underflow for token {}",
                token
            )));
        }
        let released = inner.released.get(&(to, token)).copied().unwrap_or(0);
        let released = released
            .checked_add(total)
            .ok_or_else(|| PoolError::InvalidInput("released total overflow".into()))?;

        for id in seen.iter() {
            inner.table.spend(*id)?;
            inner.open_claims.remove(id);
        }
        inner.sub_custody(token, total)?;
        inner.released.insert((to, token), released);

        let tx_id = inner.next_record(vec![EventLog::Withdraw(WithdrawEvent {
            to,
            token,
            amount: total,
            owner_hash: expected,
        })]);
        info!(to = %to, token = %token, amount = total, "withdrawal released");
        Ok(tx_id)
    }

    async fn active_totals(&self) -> PoolResult<HashMap<Address, Amount>> {
        let inner = self.inner.read().unwrap();
        // Tokens the pool has ever held custody in are reported even at zero,
        // so reconciliation overwrites stale cache entries.
        let mut totals: HashMap<Address, Amount> =
            inner.custody.keys().map(|token| (*token, 0)).collect();
        for claim in inner.open_claims.values() {
            let slot = totals.entry(claim.token).or_insert(0);
            *slot = slot.saturating_add(claim.amount);
        }
        Ok(totals)
    }
}

#[async_trait]
impl TransactionSource for Vault {
    async fn transaction_record(&self, tx_id: TxId) -> PoolResult<Option<TransactionRecord>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.records.get(&tx_id).cloned())
    }
}
