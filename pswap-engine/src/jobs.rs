//! Reconciliation jobs: the engine's public entrypoints.
//!
//! Each job yields exactly one terminal outcome per invocation: a processed
//! summary, an already-processed no-op, or a single typed error. A job never
//! reports partial success.

use std::sync::Arc;

use tracing::info;

use pswap_core::{Address, Amount, PoolResult, TxId};
use pswap_vault::{Ledger, TransactionSource};

use crate::balance::BalanceAggregator;
use crate::cache::Cache;
use crate::dedup::DedupStore;
use crate::display::TokenRegistry;
use crate::events::{resolve_deposit, resolve_withdraw};
use crate::locks::TokenLockMap;
use crate::oracle::PriceOracle;
use crate::swap::{settle_swap, SwapOutcome, SwapRequest};

/// Terminal outcome of a job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// The job applied its effects; carries a human-readable summary.
    Processed(String),
    /// The job's idempotency key was already marked; nothing was applied.
    AlreadyProcessed,
}

/// The reconciliation engine: ledger client, cache, oracle, and per-token
/// serialization wired together.
pub struct Engine {
    ledger: Arc<dyn Ledger>,
    source: Arc<dyn TransactionSource>,
    oracle: Arc<dyn PriceOracle>,
    balances: BalanceAggregator,
    dedup: DedupStore,
    locks: TokenLockMap,
    registry: TokenRegistry,
}

impl Engine {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        source: Arc<dyn TransactionSource>,
        oracle: Arc<dyn PriceOracle>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            ledger,
            source,
            oracle,
            balances: BalanceAggregator::new(cache.clone()),
            dedup: DedupStore::new(cache),
            locks: TokenLockMap::new(),
            registry: TokenRegistry::new(),
        }
    }

    /// Token metadata registry used for job summaries.
    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// Cached balance for `token`.
    pub async fn balance(&self, token: Address) -> PoolResult<Amount> {
        self.balances.balance(token).await
    }

    /// Ingest a finalized deposit transaction into the cache. Keyed on the
    /// commitment id; replays are no-ops.
    pub async fn process_deposit(&self, tx_id: TxId) -> PoolResult<JobOutcome> {
        let event = resolve_deposit(self.source.as_ref(), tx_id).await?;
        let key = event.commitment_id.to_hex();

        let _guard = self.locks.acquire(event.token).await;
        if self.dedup.already_processed(&key).await? {
            info!(commitment = %event.commitment_id, "deposit already processed");
            return Ok(JobOutcome::AlreadyProcessed);
        }

        self.balances.on_deposit(event.token, event.amount).await?;
        self.dedup.mark(&key).await?;

        let summary = format!(
            "deposited {} from {}",
            self.registry.describe(event.token, event.amount),
            event.from
        );
        info!(commitment = %event.commitment_id, "deposit processed");
        Ok(JobOutcome::Processed(summary))
    }

    /// Ingest a finalized withdrawal transaction into the cache. Keyed on the
    /// transaction id; replays are no-ops.
    pub async fn process_withdraw(&self, tx_id: TxId) -> PoolResult<JobOutcome> {
        let event = resolve_withdraw(self.source.as_ref(), tx_id).await?;
        let key = tx_id.to_hex();

        let _guard = self.locks.acquire(event.token).await;
        if self.dedup.already_processed(&key).await? {
            info!(tx = %tx_id, "withdrawal already processed");
            return Ok(JobOutcome::AlreadyProcessed);
        }

        self.balances.on_withdraw(event.token, event.amount).await?;
        self.dedup.mark(&key).await?;

        let summary = format!(
            "withdrew {} to {}",
            self.registry.describe(event.token, event.amount),
            event.to
        );
        info!(tx = %tx_id, "withdrawal processed");
        Ok(JobOutcome::Processed(summary))
    }

    /// Verify, price, submit, and account a swap.
    pub async fn process_swap(&self, request: &SwapRequest) -> PoolResult<JobOutcome> {
        let _guards = self
            .locks
            .acquire_pair(request.token_in, request.token_out)
            .await;

        let outcome = settle_swap(self.ledger.as_ref(), self.oracle.as_ref(), request).await?;
        self.balances
            .on_swap(
                request.token_in,
                request.amount_in,
                request.token_out,
                outcome.amount_out,
            )
            .await?;
        for id in &outcome.spent {
            self.dedup.mark(&id.to_hex()).await?;
        }

        Ok(JobOutcome::Processed(self.swap_summary(request, &outcome)))
    }

    /// Overwrite cached balances from ledger truth. Returns how many tokens
    /// were rewritten.
    pub async fn reconcile(&self) -> PoolResult<usize> {
        self.balances.reconcile(self.ledger.as_ref()).await
    }

    fn swap_summary(&self, request: &SwapRequest, outcome: &SwapOutcome) -> String {
        let mut summary = format!(
            "swapped {} for {}",
            self.registry.describe(request.token_in, request.amount_in),
            self.registry.describe(request.token_out, outcome.amount_out),
        );
        if outcome.change > 0 {
            summary.push_str(&format!(
                ", change {}",
                self.registry.describe(request.token_in, outcome.change)
            ));
        }
        summary
    }
}
