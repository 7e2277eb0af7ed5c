//! Wallet handlers: open, detail, transaction history.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    CreateWalletResponse, PaginationParams, TransactionDto, TransactionListResponse,
    WalletResponse, paginate,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, MarketError};

/// `POST /wallets` — Open a new empty wallet.
#[utoipa::path(
    post,
    path = "/api/v1/wallets",
    tag = "Wallets",
    summary = "Open a wallet",
    description = "Creates an empty wallet for an advertiser or publisher. All balances start at zero.",
    responses(
        (status = 201, description = "Wallet opened", body = CreateWalletResponse),
    )
)]
pub async fn create_wallet(State(state): State<AppState>) -> impl IntoResponse {
    let wallet_id = state.market_service.open_wallet().await;
    (
        StatusCode::CREATED,
        Json(CreateWalletResponse {
            wallet_id,
            created_at: Utc::now(),
        }),
    )
}

/// `GET /wallets/:id` — Wallet balances and counters.
///
/// # Errors
///
/// Returns [`MarketError::WalletNotFound`] if the wallet does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/wallets/{id}",
    tag = "Wallets",
    summary = "Get wallet detail",
    description = "Returns the wallet's balance, aggregate counters, and available refund credit.",
    params(
        ("id" = uuid::Uuid, Path, description = "Wallet UUID"),
    ),
    responses(
        (status = 200, description = "Wallet detail", body = WalletResponse),
        (status = 404, description = "Wallet not found", body = ErrorResponse),
    )
)]
pub async fn get_wallet(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let wallet_id = crate::domain::WalletId::from_uuid(id);
    let wallet = state.market_service.wallet_snapshot(wallet_id).await?;
    Ok(Json(WalletResponse::from(&wallet)))
}

/// `GET /wallets/:id/transactions` — Paginated ledger history.
///
/// # Errors
///
/// Returns [`MarketError::WalletNotFound`] if the wallet does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/wallets/{id}/transactions",
    tag = "Wallets",
    summary = "List wallet transactions",
    description = "Returns the wallet's append-only transaction log, oldest first.",
    params(
        ("id" = uuid::Uuid, Path, description = "Wallet UUID"),
        PaginationParams,
    ),
    responses(
        (status = 200, description = "Paginated transaction list", body = TransactionListResponse),
        (status = 404, description = "Wallet not found", body = ErrorResponse),
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, MarketError> {
    let wallet_id = crate::domain::WalletId::from_uuid(id);
    let wallet = state.market_service.wallet_snapshot(wallet_id).await?;

    let total = u32::try_from(wallet.transactions().len()).unwrap_or(u32::MAX);
    let (pagination, start, take) = paginate(&params, total);
    let data: Vec<TransactionDto> = wallet
        .transactions()
        .iter()
        .skip(start)
        .take(take)
        .map(TransactionDto::from)
        .collect();

    Ok(Json(TransactionListResponse { data, pagination }))
}

/// Wallet routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wallets", post(create_wallet))
        .route("/wallets/{id}", get(get_wallet))
        .route("/wallets/{id}/transactions", get(list_transactions))
}
