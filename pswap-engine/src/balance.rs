//! Cached per-token balance aggregation.
//!
//! Balances live in the cache under `balance:<lowercase token hex>` and are
//! advisory: they track the sum of Active commitments per token but may
//! transiently diverge from the ledger. Divergence is surfaced as
//! `InsufficientCachedBalance` and repaired by [`BalanceAggregator::reconcile`],
//! never assumed to self-heal.

use std::sync::Arc;

use tracing::{debug, info};

use pswap_core::{Address, Amount, PoolError, PoolResult};
use pswap_vault::Ledger;

use crate::cache::Cache;

const BALANCE_PREFIX: &str = "balance:";

#[derive(Clone)]
pub struct BalanceAggregator {
    cache: Arc<dyn Cache>,
}

impl BalanceAggregator {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    fn key(token: Address) -> String {
        format!("{}{}", BALANCE_PREFIX, token.to_hex())
    }

    /// Cached balance for `token`; missing entries read as zero.
    pub async fn balance(&self, token: Address) -> PoolResult<Amount> {
        match self.cache.get(&Self::key(token)).await? {
            Some(value) => value.parse().map_err(|_| {
                PoolError::CacheUnavailable(format!("non-numeric balance for token {}", token))
            }),
            None => Ok(0),
        }
    }

    pub async fn on_deposit(&self, token: Address, amount: Amount) -> PoolResult<Amount> {
        let next = self.cache.increment_by(&Self::key(token), amount).await?;
        debug!(token = %token, amount, balance = next, "cached balance incremented");
        Ok(next)
    }

    /// Decrement the cached balance; fails before mutating when the cache
    /// cannot cover `amount`, which signals divergence from the ledger.
    pub async fn on_withdraw(&self, token: Address, amount: Amount) -> PoolResult<Amount> {
        let available = self.balance(token).await?;
        if available < amount {
            return Err(PoolError::InsufficientCachedBalance {
                token,
                available,
                requested: amount,
            });
        }
        let next = self.cache.decrement_by(&Self::key(token), amount).await?;
        debug!(token = %token, amount, balance = next, "cached balance decremented");
        Ok(next)
    }

    /// Apply a settled swap: `net_in` leaves the input token's pool total,
    /// `amount_out` joins the output token's.
    pub async fn on_swap(
        &self,
        token_in: Address,
        net_in: Amount,
        token_out: Address,
        amount_out: Amount,
    ) -> PoolResult<()> {
        self.on_withdraw(token_in, net_in).await?;
        self.on_deposit(token_out, amount_out).await?;
        Ok(())
    }

    /// Overwrite every cached balance with the ledger's Active-commitment
    /// totals.
    pub async fn reconcile(&self, ledger: &dyn Ledger) -> PoolResult<usize> {
        let totals = ledger.active_totals().await?;
        for (token, total) in &totals {
            self.cache
                .set(&Self::key(*token), &total.to_string())
                .await?;
        }
        info!(tokens = totals.len(), "balance cache reconciled");
        Ok(totals.len())
    }
}
