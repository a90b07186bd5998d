//! Swap settlement.
//!
//! A swap consumes Active input commitments in one token and atomically
//! creates an output commitment in another, plus a change commitment when the
//! inputs overshoot the requested amount. All verification happens before the
//! single ledger submission; a failure anywhere leaves every input Active.

use serde::{Deserialize, Serialize};
use tracing::info;

use pswap_core::{Address, Amount, CommitmentId, OwnerHash, PoolError, PoolResult, TxId, RATE_ONE};
use pswap_vault::{CommitmentClaim, Ledger};

use crate::oracle::PriceOracle;

/// A fully specified swap: opened inputs plus the desired outcome.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Input commitments, opened. Verified in order; all must be in
    /// `token_in`.
    pub inputs: Vec<CommitmentClaim>,
    pub token_in: Address,
    pub token_out: Address,
    /// Requested input amount; inputs must cover at least this much.
    pub amount_in: Amount,
    /// Slippage floor on the priced output.
    pub minimum_out: Amount,
    /// Owner hash for the output commitment.
    pub output_owner_hash: OwnerHash,
    /// Owner hash for the change commitment, if change exists.
    pub change_owner_hash: OwnerHash,
}

/// Result of a settled swap.
#[derive(Clone, Debug)]
pub struct SwapOutcome {
    pub tx_id: TxId,
    pub amount_out: Amount,
    pub output_commitment: CommitmentId,
    pub change: Amount,
    pub change_commitment: Option<CommitmentId>,
    pub spent: Vec<CommitmentId>,
}

/// Verify, price, and submit a swap.
pub async fn settle_swap(
    ledger: &dyn Ledger,
    oracle: &dyn PriceOracle,
    request: &SwapRequest,
) -> PoolResult<SwapOutcome> {
    if request.amount_in == 0 {
        return Err(PoolError::InvalidInput("swap amount must be positive".into()));
    }
    if request.inputs.is_empty() {
        return Err(PoolError::InvalidInput("swap needs at least one input".into()));
    }

    // Verify candidates in order; the first invalid one aborts.
    let mut spent = Vec::with_capacity(request.inputs.len());
    let mut actual: Amount = 0;
    for input in &request.inputs {
        let id = input.id();
        if input.token != request.token_in {
            return Err(PoolError::CommitmentInvalid(id));
        }
        if !ledger.is_commitment_active(id).await? {
            return Err(PoolError::CommitmentInvalid(id));
        }
        actual = actual
            .checked_add(input.amount)
            .ok_or_else(|| PoolError::InvalidInput("swap input total overflow".into()))?;
        spent.push(id);
    }

    if actual < request.amount_in {
        return Err(PoolError::InsufficientInput {
            actual,
            requested: request.amount_in,
        });
    }

    let rate = oracle
        .latest_price(request.token_in, request.token_out)
        .await?;
    let amount_out = request
        .amount_in
        .checked_mul(rate)
        .ok_or_else(|| PoolError::InvalidInput("swap output overflow".into()))?
        / RATE_ONE;
    if amount_out < request.minimum_out {
        return Err(PoolError::SlippageExceeded {
            amount_out,
            minimum_out: request.minimum_out,
        });
    }

    let change = actual - request.amount_in;
    let output = CommitmentClaim {
        amount: amount_out,
        token: request.token_out,
        owner_hash: request.output_owner_hash,
    };
    let mut created = vec![output];
    let change_commitment = (change > 0).then(|| {
        let change_claim = CommitmentClaim {
            amount: change,
            token: request.token_in,
            owner_hash: request.change_owner_hash,
        };
        created.push(change_claim);
        change_claim.id()
    });

    let tx_id = ledger.atomic_update(&spent, &created).await?;
    info!(
        tx = %tx_id,
        amount_in = request.amount_in,
        amount_out,
        change,
        inputs = spent.len(),
        "swap settled"
    );

    Ok(SwapOutcome {
        tx_id,
        amount_out,
        output_commitment: output.id(),
        change,
        change_commitment,
        spent,
    })
}
