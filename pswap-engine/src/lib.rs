//! pswap-engine
//!
//! Off-chain reconciliation for the privacy-swap pool. The engine ingests
//! finalized ledger transactions, keeps an advisory balance cache consistent
//! with the authoritative commitment ledger, enforces idempotency across
//! replays, and settles swaps through a single atomic ledger submission.

pub mod balance;
pub mod cache;
pub mod dedup;
pub mod display;
pub mod events;
pub mod jobs;
pub mod locks;
pub mod oracle;
pub mod swap;

pub use balance::BalanceAggregator;
pub use cache::{Cache, MemoryCache};
pub use dedup::DedupStore;
pub use display::TokenRegistry;
pub use jobs::{Engine, JobOutcome};
pub use oracle::{FixedPriceOracle, PriceOracle};
pub use swap::{SwapOutcome, SwapRequest};
