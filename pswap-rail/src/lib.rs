//! pswap-rail library
//!
//! Axum-based HTTP service for the privacy-swap pool.
//!
//! # Features
//! - Deposit and withdrawal ingestion jobs keyed by transaction id
//! - Swap settlement against the commitment ledger
//! - Cached per-token pool balances with on-demand reconciliation
//! - In-memory ledger, cache, and oracle for local deployments

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use pswap_core::{Address, Amount, OwnerHash, PoolError, TokenMetadata, TxId};
use pswap_engine::{Engine, FixedPriceOracle, JobOutcome, MemoryCache, SwapRequest};
use pswap_vault::{CommitmentClaim, Ledger, Vault};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub vault: Arc<Vault>,
    pub oracle: Arc<FixedPriceOracle>,
}

impl AppState {
    /// Wire up a fully in-memory deployment: vault ledger, memory cache, and
    /// a table-driven oracle.
    pub fn in_memory() -> Self {
        let vault = Arc::new(Vault::new());
        let oracle = Arc::new(FixedPriceOracle::new());
        let engine = Arc::new(Engine::new(
            vault.clone(),
            vault.clone(),
            oracle.clone(),
            Arc::new(MemoryCache::new()),
        ));
        Self {
            engine,
            vault,
            oracle,
        }
    }
}

/// Build the router.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/pool/info", get(info))
        .route("/pool/balances/:token", get(get_balance))
        .route("/pool/tokens", post(register_token))
        .route("/jobs/deposit", post(deposit_job))
        .route("/jobs/withdraw", post(withdraw_job))
        .route("/jobs/swap", post(swap_job))
        .route("/jobs/reconcile", post(reconcile_job))
        .route("/oracle/rate", post(set_rate))
        .route("/ledger/deposit", post(ledger_deposit))
        .route("/ledger/withdraw", post(ledger_withdraw))
        .route("/ledger/fund", post(ledger_fund))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "pswap-rail"
    }))
}

/// Pool info endpoint.
async fn info() -> impl IntoResponse {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "features": {
            "deposits": true,
            "withdrawals": true,
            "swaps": true,
            "reconciliation": true
        }
    }))
}

/// Job response: exactly one terminal outcome per invocation.
#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub completed: bool,
    pub result: Option<String>,
    pub error: Option<String>,
    pub error_code: Option<String>,
}

impl JobResponse {
    fn from_outcome(outcome: Result<JobOutcome, PoolError>) -> Self {
        match outcome {
            Ok(JobOutcome::Processed(summary)) => JobResponse {
                completed: true,
                result: Some(summary),
                error: None,
                error_code: None,
            },
            Ok(JobOutcome::AlreadyProcessed) => JobResponse {
                completed: true,
                result: Some("already processed".into()),
                error: None,
                error_code: None,
            },
            Err(e) => JobResponse {
                completed: false,
                result: None,
                error: Some(e.to_string()),
                error_code: Some(e.error_code().to_string()),
            },
        }
    }
}

/// Transaction-keyed job request.
#[derive(Debug, Deserialize)]
pub struct TransactionJobRequest {
    pub tx_id: TxId,
}

/// Ingest a finalized deposit transaction.
async fn deposit_job(
    State(state): State<AppState>,
    Json(req): Json<TransactionJobRequest>,
) -> Json<JobResponse> {
    Json(JobResponse::from_outcome(
        state.engine.process_deposit(req.tx_id).await,
    ))
}

/// Ingest a finalized withdrawal transaction.
async fn withdraw_job(
    State(state): State<AppState>,
    Json(req): Json<TransactionJobRequest>,
) -> Json<JobResponse> {
    Json(JobResponse::from_outcome(
        state.engine.process_withdraw(req.tx_id).await,
    ))
}

/// Settle a swap.
async fn swap_job(
    State(state): State<AppState>,
    Json(req): Json<SwapRequest>,
) -> Json<JobResponse> {
    Json(JobResponse::from_outcome(
        state.engine.process_swap(&req).await,
    ))
}

/// Reconcile response.
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub completed: bool,
    pub tokens: Option<usize>,
    pub error: Option<String>,
    pub error_code: Option<String>,
}

/// Overwrite cached balances from ledger truth.
async fn reconcile_job(State(state): State<AppState>) -> Json<ReconcileResponse> {
    match state.engine.reconcile().await {
        Ok(tokens) => Json(ReconcileResponse {
            completed: true,
            tokens: Some(tokens),
            error: None,
            error_code: None,
        }),
        Err(e) => Json(ReconcileResponse {
            completed: false,
            tokens: None,
            error: Some(e.to_string()),
            error_code: Some(e.error_code().to_string()),
        }),
    }
}

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub token: Address,
    pub cached_balance: String,
    pub active_total: String,
}

/// Cached and ledger balances for one token.
async fn get_balance(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let token: Address = token.parse()?;
    let cached = state.engine.balance(token).await?;
    Ok(Json(BalanceResponse {
        token,
        cached_balance: cached.to_string(),
        active_total: state.vault.active_total(token).to_string(),
    }))
}

/// Register token metadata so job summaries can format amounts with the
/// token's symbol and decimals.
async fn register_token(
    State(state): State<AppState>,
    Json(metadata): Json<TokenMetadata>,
) -> StatusCode {
    state.engine.registry().register(metadata);
    StatusCode::NO_CONTENT
}

/// Oracle rate request.
#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub token_in: Address,
    pub token_out: Address,
    /// 8-decimal fixed-point rate.
    pub rate: u128,
}

/// Configure a single-direction rate on the in-memory oracle.
async fn set_rate(State(state): State<AppState>, Json(req): Json<RateRequest>) -> StatusCode {
    state.oracle.set_rate(req.token_in, req.token_out, req.rate);
    StatusCode::NO_CONTENT
}

/// Ledger submission response.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub completed: bool,
    pub tx_id: Option<TxId>,
    pub error: Option<String>,
    pub error_code: Option<String>,
}

impl SubmitResponse {
    fn from_result(result: Result<TxId, PoolError>) -> Self {
        match result {
            Ok(tx_id) => SubmitResponse {
                completed: true,
                tx_id: Some(tx_id),
                error: None,
                error_code: None,
            },
            Err(e) => SubmitResponse {
                completed: false,
                tx_id: None,
                error: Some(e.to_string()),
                error_code: Some(e.error_code().to_string()),
            },
        }
    }
}

/// Deposit submission request.
#[derive(Debug, Deserialize)]
pub struct LedgerDepositRequest {
    pub from: Address,
    pub token: Address,
    pub amount: Amount,
    pub owner_hash: OwnerHash,
}

/// Submit a deposit to the in-memory ledger.
async fn ledger_deposit(
    State(state): State<AppState>,
    Json(req): Json<LedgerDepositRequest>,
) -> Json<SubmitResponse> {
    let claim = CommitmentClaim {
        amount: req.amount,
        token: req.token,
        owner_hash: req.owner_hash,
    };
    Json(SubmitResponse::from_result(
        state.vault.deposit(req.from, claim).await,
    ))
}

/// Withdrawal submission request.
#[derive(Debug, Deserialize)]
pub struct LedgerWithdrawRequest {
    pub claims: Vec<CommitmentClaim>,
    /// Owner secret; its hash must match every claim's owner hash.
    pub secret: String,
    pub to: Address,
}

/// Submit a withdrawal to the in-memory ledger.
async fn ledger_withdraw(
    State(state): State<AppState>,
    Json(req): Json<LedgerWithdrawRequest>,
) -> Json<SubmitResponse> {
    Json(SubmitResponse::from_result(
        state
            .vault
            .withdraw(&req.claims, req.secret.as_bytes(), req.to)
            .await,
    ))
}

/// Liquidity funding request.
#[derive(Debug, Deserialize)]
pub struct FundRequest {
    pub token: Address,
    pub amount: Amount,
}

/// Seed pool liquidity without creating a commitment.
async fn ledger_fund(
    State(state): State<AppState>,
    Json(req): Json<FundRequest>,
) -> Result<StatusCode, ApiError> {
    state.vault.fund(req.token, req.amount)?;
    Ok(StatusCode::NO_CONTENT)
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({
            "error": self.message,
            "error_code": self.code,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<PoolError> for ApiError {
    fn from(err: PoolError) -> Self {
        let status = match err.suggested_status_code() {
            400 => StatusCode::BAD_REQUEST,
            401 => StatusCode::UNAUTHORIZED,
            404 => StatusCode::NOT_FOUND,
            409 => StatusCode::CONFLICT,
            502 => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError {
            status,
            code: err.error_code(),
            message: err.to_string(),
        }
    }
}
