//! Ad handlers: create, list, detail, and the reassignment pool.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    AdDetailResponse, AdListResponse, AdSummaryDto, AvailableAdDto, CreateAdRequest,
    CreateAdResponse, PaginationParams, paginate,
};
use crate::app_state::AppState;
use crate::domain::money::Amount;
use crate::error::{ErrorResponse, MarketError};

/// `POST /ads` — Submit an ad with its payment amount.
///
/// # Errors
///
/// Returns [`MarketError::WalletNotFound`] for an unknown advertiser
/// wallet.
#[utoipa::path(
    post,
    path = "/api/v1/ads",
    tag = "Ads",
    summary = "Create an ad",
    description = "Registers an advertiser's creative with the payment amount captured at submission. The amount is immutable and seeds every later refund.",
    request_body = CreateAdRequest,
    responses(
        (status = 201, description = "Ad created", body = CreateAdResponse),
        (status = 404, description = "Advertiser wallet not found", body = ErrorResponse),
    )
)]
pub async fn create_ad(
    State(state): State<AppState>,
    Json(req): Json<CreateAdRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let ad_id = state
        .market_service
        .create_ad(
            req.advertiser_wallet,
            req.creative_url.clone(),
            Amount::from_cents(req.payment_amount_cents),
        )
        .await?;

    let response = CreateAdResponse {
        ad_id,
        advertiser_wallet: req.advertiser_wallet,
        creative_url: req.creative_url,
        payment_amount_cents: req.payment_amount_cents,
        created_at: Utc::now(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /ads` — List all ads with pagination.
#[utoipa::path(
    get,
    path = "/api/v1/ads",
    tag = "Ads",
    summary = "List ads",
    description = "Returns a paginated list of all ads.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated ad list", body = AdListResponse),
    )
)]
pub async fn list_ads(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let summaries = state.market_service.list_ads().await;

    let total = u32::try_from(summaries.len()).unwrap_or(u32::MAX);
    let (pagination, start, take) = paginate(&params, total);
    let data: Vec<AdSummaryDto> = summaries
        .into_iter()
        .skip(start)
        .take(take)
        .map(AdSummaryDto::from)
        .collect();

    Json(AdListResponse { data, pagination })
}

/// `GET /ads/available` — The zero-cost reassignment pool.
#[utoipa::path(
    get,
    path = "/api/v1/ads/available",
    tag = "Ads",
    summary = "List reassignable ads",
    description = "Returns rejected ads any website may pick up at no cost. The original payment already covered them.",
    responses(
        (status = 200, description = "Reassignment pool", body = Vec<AvailableAdDto>),
    )
)]
pub async fn list_available_ads(State(state): State<AppState>) -> impl IntoResponse {
    let pool: Vec<AvailableAdDto> = state
        .market_service
        .list_available_ads()
        .await
        .into_iter()
        .map(AvailableAdDto::from)
        .collect();
    Json(pool)
}

/// `GET /ads/:id` — Full ad detail including all placements.
///
/// # Errors
///
/// Returns [`MarketError::AdNotFound`] if the ad does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/ads/{id}",
    tag = "Ads",
    summary = "Get ad detail",
    description = "Returns the ad with every placement and its live rejection countdown.",
    params(
        ("id" = uuid::Uuid, Path, description = "Ad UUID"),
    ),
    responses(
        (status = 200, description = "Ad detail", body = AdDetailResponse),
        (status = 404, description = "Ad not found", body = ErrorResponse),
    )
)]
pub async fn get_ad(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let ad_id = crate::domain::AdId::from_uuid(id);
    let ad = state.market_service.ad_detail(ad_id).await?;
    Ok(Json(AdDetailResponse::from_ad(&ad, Utc::now())))
}

/// Ad routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ads", post(create_ad).get(list_ads))
        .route("/ads/available", get(list_available_ads))
        .route("/ads/{id}", get(get_ad))
}
