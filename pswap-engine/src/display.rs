//! Best-effort amount formatting for job summaries.
//!
//! Token metadata is cosmetic only. A token missing from the registry falls
//! back to the raw smallest-unit amount and the address; a lookup failure
//! never fails the job that wanted the pretty line.

use std::collections::HashMap;
use std::sync::RwLock;

use pswap_core::{Address, Amount, TokenMetadata};

/// Registry of known token metadata.
#[derive(Default)]
pub struct TokenRegistry {
    tokens: RwLock<HashMap<Address, TokenMetadata>>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, metadata: TokenMetadata) {
        let mut tokens = self.tokens.write().unwrap();
        tokens.insert(metadata.address, metadata);
    }

    /// Human-readable `amount` of `token`, e.g. `"1.5 WETH"` or the raw
    /// fallback `"1500000000000000000 (token 0x…)"`.
    pub fn describe(&self, token: Address, amount: Amount) -> String {
        let tokens = self.tokens.read().unwrap();
        match tokens.get(&token) {
            Some(meta) => format!("{} {}", format_units(amount, meta.decimals), meta.symbol),
            None => format!("{} (token {})", amount, token),
        }
    }
}

/// Render a smallest-unit amount with `decimals` places, trailing zeros
/// trimmed.
pub fn format_units(amount: Amount, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let scale = 10u128.pow(decimals as u32);
    let whole = amount / scale;
    let frac = amount % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
