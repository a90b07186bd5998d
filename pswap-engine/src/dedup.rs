//! Idempotency marks for reconciliation jobs.
//!
//! Deposit jobs key on the commitment id, withdrawal jobs on the transaction
//! id, swap settlement on each consumed commitment id. A mark is written only
//! after the mutation it guards has been applied, so a crash between the two
//! replays the job rather than dropping it.

use std::sync::Arc;

use tracing::warn;

use pswap_core::PoolResult;

use crate::cache::Cache;

const PROCESSED_PREFIX: &str = "processed:";

/// Processed-marker store on top of the cache.
#[derive(Clone)]
pub struct DedupStore {
    cache: Arc<dyn Cache>,
}

impl DedupStore {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    fn key(id: &str) -> String {
        format!("{}{}", PROCESSED_PREFIX, id)
    }

    /// Whether `id` already carries a processed mark.
    pub async fn already_processed(&self, id: &str) -> PoolResult<bool> {
        Ok(self.cache.get(&Self::key(id)).await?.is_some())
    }

    /// Mark `id` processed. Returns whether this call was the first writer;
    /// a lost race means another worker applied the same job concurrently.
    pub async fn mark(&self, id: &str) -> PoolResult<bool> {
        let first = self.cache.set_if_absent(&Self::key(id), "1").await?;
        if !first {
            warn!(id, "processed mark already present");
        }
        Ok(first)
    }
}
