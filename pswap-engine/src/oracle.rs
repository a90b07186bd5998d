//! Price oracle interface.
//!
//! Rates are 8-decimal fixed point: a rate of `1600 * RATE_ONE` means one
//! unit of the input token prices at 1600 units of the output token. Pricing
//! is single-direction; the reverse pair must be configured separately if it
//! is needed at all.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use pswap_core::{Address, PoolError, PoolResult};

#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Latest rate for converting `token_in` into `token_out`.
    async fn latest_price(&self, token_in: Address, token_out: Address) -> PoolResult<u128>;
}

/// Table-driven oracle for tests and local runs.
#[derive(Default)]
pub struct FixedPriceOracle {
    rates: RwLock<HashMap<(Address, Address), u128>>,
}

impl FixedPriceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rate(&self, token_in: Address, token_out: Address, rate: u128) {
        let mut rates = self.rates.write().unwrap();
        rates.insert((token_in, token_out), rate);
    }
}

#[async_trait]
impl PriceOracle for FixedPriceOracle {
    async fn latest_price(&self, token_in: Address, token_out: Address) -> PoolResult<u128> {
        let rates = self.rates.read().unwrap();
        rates.get(&(token_in, token_out)).copied().ok_or_else(|| {
            PoolError::InvalidInput(format!(
                "no price configured for pair {} -> {}",
                token_in, token_out
            ))
        })
    }
}
