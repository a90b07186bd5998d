//! Full reconciliation flows against the in-memory vault: deposit and
//! withdrawal ingestion, swap settlement, idempotent replays, and cache
//! repair after divergence.

use std::sync::Arc;

use pswap_core::{derive_owner_hash, Address, Amount, PoolError, TokenMetadata, RATE_ONE};
use pswap_engine::{Engine, FixedPriceOracle, JobOutcome, MemoryCache, SwapRequest};
use pswap_vault::{CommitmentClaim, Ledger, Vault};

const SECRET: &[u8] = b"holder-secret-1";
const OUT_SECRET: &[u8] = b"holder-secret-out";

fn token_x() -> Address {
    Address([0x11; 20])
}

fn token_y() -> Address {
    Address([0x22; 20])
}

fn alice() -> Address {
    Address([0xa1; 20])
}

fn claim(amount: Amount, token: Address, secret: &[u8]) -> CommitmentClaim {
    CommitmentClaim {
        amount,
        token,
        owner_hash: derive_owner_hash(secret),
    }
}

struct Harness {
    vault: Arc<Vault>,
    oracle: Arc<FixedPriceOracle>,
    engine: Engine,
}

fn harness() -> Harness {
    let vault = Arc::new(Vault::new());
    let oracle = Arc::new(FixedPriceOracle::new());
    let engine = Engine::new(
        vault.clone(),
        vault.clone(),
        oracle.clone(),
        Arc::new(MemoryCache::new()),
    );
    Harness {
        vault,
        oracle,
        engine,
    }
}

fn swap_request(inputs: Vec<CommitmentClaim>, amount_in: Amount, minimum_out: Amount) -> SwapRequest {
    SwapRequest {
        inputs,
        token_in: token_x(),
        token_out: token_y(),
        amount_in,
        minimum_out,
        output_owner_hash: derive_owner_hash(OUT_SECRET),
        change_owner_hash: derive_owner_hash(SECRET),
    }
}

#[tokio::test]
async fn deposit_ingestion_is_idempotent() {
    let h = harness();
    let c = claim(10, token_x(), SECRET);
    let tx_id = h.vault.deposit(alice(), c).await.unwrap();

    let first = h.engine.process_deposit(tx_id).await.unwrap();
    assert!(matches!(first, JobOutcome::Processed(_)));
    assert_eq!(h.engine.balance(token_x()).await.unwrap(), 10);

    // Replaying the same transaction increments nothing.
    let second = h.engine.process_deposit(tx_id).await.unwrap();
    assert_eq!(second, JobOutcome::AlreadyProcessed);
    assert_eq!(h.engine.balance(token_x()).await.unwrap(), 10);
}

#[tokio::test]
async fn job_summary_uses_registered_metadata() {
    let h = harness();
    h.engine.registry().register(TokenMetadata {
        address: token_x(),
        symbol: "WETH".into(),
        decimals: 2,
    });

    let c = claim(250, token_x(), SECRET);
    let tx = h.vault.deposit(alice(), c).await.unwrap();
    let JobOutcome::Processed(summary) = h.engine.process_deposit(tx).await.unwrap() else {
        panic!("deposit should process");
    };
    assert!(summary.contains("2.5 WETH"), "summary was {}", summary);
}

#[tokio::test]
async fn duplicate_ledger_deposit_is_rejected() {
    let h = harness();
    let c = claim(10, token_x(), SECRET);
    h.vault.deposit(alice(), c).await.unwrap();

    let err = h.vault.deposit(alice(), c).await.unwrap_err();
    assert!(matches!(err, PoolError::DuplicateCommitment(id) if id == c.id()));
}

#[tokio::test]
async fn withdraw_flow_and_double_spend() {
    let h = harness();
    let recipient = Address([0xbb; 20]);
    let c = claim(5, token_x(), SECRET);
    let deposit_tx = h.vault.deposit(alice(), c).await.unwrap();
    h.engine.process_deposit(deposit_tx).await.unwrap();

    let withdraw_tx = h.vault.withdraw(&[c], SECRET, recipient).await.unwrap();
    let outcome = h.engine.process_withdraw(withdraw_tx).await.unwrap();
    assert!(matches!(outcome, JobOutcome::Processed(_)));
    assert_eq!(h.engine.balance(token_x()).await.unwrap(), 0);
    assert_eq!(h.vault.released(recipient, token_x()), 5);

    // Replaying the same withdrawal transaction is a no-op.
    let replay = h.engine.process_withdraw(withdraw_tx).await.unwrap();
    assert_eq!(replay, JobOutcome::AlreadyProcessed);
    assert_eq!(h.vault.released(recipient, token_x()), 5);

    // Citing the spent commitment again fails on the ledger.
    let err = h.vault.withdraw(&[c], SECRET, recipient).await.unwrap_err();
    assert!(matches!(err, PoolError::CommitmentSpent(id) if id == c.id()));
}

#[tokio::test]
async fn swap_settles_with_change() {
    let h = harness();
    h.oracle.set_rate(token_x(), token_y(), 1600 * RATE_ONE);
    h.vault.fund(token_y(), 1_000_000).unwrap();

    let a = claim(60, token_x(), SECRET);
    let b = claim(40, token_x(), b"holder-secret-2");
    for input in [a, b] {
        let tx = h.vault.deposit(alice(), input).await.unwrap();
        h.engine.process_deposit(tx).await.unwrap();
    }

    let request = swap_request(vec![a, b], 80, 120_000);
    let outcome = h.engine.process_swap(&request).await.unwrap();
    let JobOutcome::Processed(summary) = outcome else {
        panic!("swap should settle");
    };
    assert!(summary.contains("swapped"));

    // 80 in at a rate of 1600 yields 128000 out; 20 comes back as change.
    let out_claim = claim(128_000, token_y(), OUT_SECRET);
    let change_claim = claim(20, token_x(), SECRET);
    assert!(h.vault.is_commitment_active(out_claim.id()).await.unwrap());
    assert!(h
        .vault
        .is_commitment_active(change_claim.id())
        .await
        .unwrap());
    assert!(!h.vault.is_commitment_active(a.id()).await.unwrap());
    assert!(!h.vault.is_commitment_active(b.id()).await.unwrap());

    assert_eq!(h.engine.balance(token_x()).await.unwrap(), 20);
    assert_eq!(h.engine.balance(token_y()).await.unwrap(), 128_000);
}

#[tokio::test]
async fn swap_without_change_creates_no_change_commitment() {
    let h = harness();
    h.oracle.set_rate(token_x(), token_y(), RATE_ONE / 2);
    h.vault.fund(token_y(), 1_000).unwrap();

    let input = claim(100, token_x(), SECRET);
    let tx = h.vault.deposit(alice(), input).await.unwrap();
    h.engine.process_deposit(tx).await.unwrap();

    let request = swap_request(vec![input], 100, 0);
    h.engine.process_swap(&request).await.unwrap();

    let change_claim = claim(0, token_x(), SECRET);
    assert!(!h
        .vault
        .is_commitment_active(change_claim.id())
        .await
        .unwrap());
    assert_eq!(h.engine.balance(token_y()).await.unwrap(), 50);
}

#[tokio::test]
async fn swap_rejects_short_inputs_before_submission() {
    let h = harness();
    h.oracle.set_rate(token_x(), token_y(), 1600 * RATE_ONE);

    let input = claim(60, token_x(), SECRET);
    let tx = h.vault.deposit(alice(), input).await.unwrap();
    h.engine.process_deposit(tx).await.unwrap();

    let request = swap_request(vec![input], 80, 0);
    let err = h.engine.process_swap(&request).await.unwrap_err();
    assert!(matches!(
        err,
        PoolError::InsufficientInput {
            actual: 60,
            requested: 80
        }
    ));

    // Nothing was submitted or accounted.
    assert!(h.vault.is_commitment_active(input.id()).await.unwrap());
    assert_eq!(h.engine.balance(token_x()).await.unwrap(), 60);
    assert_eq!(h.engine.balance(token_y()).await.unwrap(), 0);
}

#[tokio::test]
async fn swap_aborts_on_first_invalid_input() {
    let h = harness();
    h.oracle.set_rate(token_x(), token_y(), 1600 * RATE_ONE);

    let good = claim(50, token_x(), SECRET);
    let tx = h.vault.deposit(alice(), good).await.unwrap();
    h.engine.process_deposit(tx).await.unwrap();

    // Never deposited, so not Active.
    let phantom = claim(50, token_x(), b"holder-secret-2");
    let request = swap_request(vec![phantom, good], 80, 0);
    let err = h.engine.process_swap(&request).await.unwrap_err();
    assert!(matches!(err, PoolError::CommitmentInvalid(id) if id == phantom.id()));
    assert!(h.vault.is_commitment_active(good.id()).await.unwrap());
}

#[tokio::test]
async fn swap_rejects_wrong_token_input() {
    let h = harness();
    let wrong = claim(50, token_y(), SECRET);
    let tx = h.vault.deposit(alice(), wrong).await.unwrap();
    h.engine.process_deposit(tx).await.unwrap();

    let request = swap_request(vec![wrong], 50, 0);
    let err = h.engine.process_swap(&request).await.unwrap_err();
    assert!(matches!(err, PoolError::CommitmentInvalid(id) if id == wrong.id()));
}

#[tokio::test]
async fn swap_honors_slippage_floor() {
    let h = harness();
    h.oracle.set_rate(token_x(), token_y(), 1600 * RATE_ONE);

    let input = claim(80, token_x(), SECRET);
    let tx = h.vault.deposit(alice(), input).await.unwrap();
    h.engine.process_deposit(tx).await.unwrap();

    let request = swap_request(vec![input], 80, 128_001);
    let err = h.engine.process_swap(&request).await.unwrap_err();
    assert!(matches!(
        err,
        PoolError::SlippageExceeded {
            amount_out: 128_000,
            minimum_out: 128_001
        }
    ));
    assert!(h.vault.is_commitment_active(input.id()).await.unwrap());
}

#[tokio::test]
async fn failed_submission_leaves_inputs_active() {
    let h = harness();
    h.oracle.set_rate(token_x(), token_y(), 1600 * RATE_ONE);

    let input = claim(80, token_x(), SECRET);
    let tx = h.vault.deposit(alice(), input).await.unwrap();
    h.engine.process_deposit(tx).await.unwrap();

    // Pre-activate the exact output triple so the atomic update collides.
    let output = claim(128_000, token_y(), OUT_SECRET);
    h.vault.deposit(alice(), output).await.unwrap();

    let request = swap_request(vec![input], 80, 0);
    let err = h.engine.process_swap(&request).await.unwrap_err();
    assert!(matches!(err, PoolError::DuplicateCommitment(id) if id == output.id()));

    // All-or-nothing: the input survives and the cache saw no swap.
    assert!(h.vault.is_commitment_active(input.id()).await.unwrap());
    assert_eq!(h.engine.balance(token_x()).await.unwrap(), 80);
}

#[tokio::test]
async fn divergent_cache_is_repaired_by_reconcile() {
    let h = harness();
    let recipient = Address([0xbb; 20]);
    let c = claim(5, token_x(), SECRET);
    h.vault.deposit(alice(), c).await.unwrap();
    // Deposit ingestion was skipped, so the cache lags the ledger.

    let withdraw_tx = h.vault.withdraw(&[c], SECRET, recipient).await.unwrap();
    let err = h.engine.process_withdraw(withdraw_tx).await.unwrap_err();
    assert!(matches!(
        err,
        PoolError::InsufficientCachedBalance {
            available: 0,
            requested: 5,
            ..
        }
    ));

    h.engine.reconcile().await.unwrap();
    assert_eq!(
        h.engine.balance(token_x()).await.unwrap(),
        h.vault.active_total(token_x())
    );
}

#[tokio::test]
async fn value_is_conserved_across_the_full_flow() {
    let h = harness();
    h.oracle.set_rate(token_x(), token_y(), 2 * RATE_ONE);
    h.vault.fund(token_y(), 10_000).unwrap();

    let input = claim(100, token_x(), SECRET);
    let tx = h.vault.deposit(alice(), input).await.unwrap();
    h.engine.process_deposit(tx).await.unwrap();

    let request = swap_request(vec![input], 100, 0);
    h.engine.process_swap(&request).await.unwrap();
    assert!(h.vault.conservation_holds());

    let out_claim = claim(200, token_y(), OUT_SECRET);
    let withdraw_tx = h
        .vault
        .withdraw(&[out_claim], OUT_SECRET, alice())
        .await
        .unwrap();
    h.engine.process_withdraw(withdraw_tx).await.unwrap();

    assert!(h.vault.conservation_holds());
    assert_eq!(h.vault.active_total(token_x()), 0);
    assert_eq!(h.vault.active_total(token_y()), 0);
    assert_eq!(h.vault.released(alice(), token_y()), 200);
    assert_eq!(h.engine.balance(token_x()).await.unwrap(), 0);
    assert_eq!(h.engine.balance(token_y()).await.unwrap(), 0);
}
