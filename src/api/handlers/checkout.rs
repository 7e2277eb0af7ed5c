//! Checkout handlers: allocation preview, commit, payment confirmation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    CheckoutCommitResponse, CheckoutPreviewResponse, CheckoutRequest, PaymentConfirmResponse,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, MarketError};

/// `POST /checkout/preview` — Dry-run the refund allocation.
///
/// # Errors
///
/// Returns [`MarketError::InvalidRequest`] for an empty or duplicated
/// cart, or not-found errors for unknown ids.
#[utoipa::path(
    post,
    path = "/api/v1/checkout/preview",
    tag = "Checkout",
    summary = "Preview the refund allocation",
    description = "Computes how the advertiser's refund credit would spread across the cart, cheapest category first. Read-only; nothing is reserved or spent.",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Allocation preview", body = CheckoutPreviewResponse),
        (status = 400, description = "Invalid cart", body = ErrorResponse),
        (status = 404, description = "Ad or category not found", body = ErrorResponse),
    )
)]
pub async fn preview(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let outcome = state
        .market_service
        .preview_checkout(req.ad_id, &req.category_ids)
        .await?;
    Ok(Json(CheckoutPreviewResponse::from(&outcome)))
}

/// `POST /checkout/commit` — Commit the cart.
///
/// # Errors
///
/// Returns [`MarketError::FullyBooked`] listing every category that
/// filled up since the preview, [`MarketError::InsufficientBalance`]
/// when a concurrent commit spent the credit first, or
/// [`MarketError::GatewayUnavailable`] when payment initiation fails.
/// All failures leave wallets and slots untouched.
#[utoipa::path(
    post,
    path = "/api/v1/checkout/commit",
    tag = "Checkout",
    summary = "Commit a checkout",
    description = "Re-checks capacity, consumes refund credit, initiates the gateway payment for any remainder, and creates the pending placements.",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Checkout committed", body = CheckoutCommitResponse),
        (status = 400, description = "Invalid cart", body = ErrorResponse),
        (status = 404, description = "Ad or category not found", body = ErrorResponse),
        (status = 422, description = "Categories filled up or credit already spent", body = ErrorResponse),
        (status = 502, description = "Payment gateway unavailable", body = ErrorResponse),
    )
)]
pub async fn commit(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let commit = state
        .market_service
        .commit_checkout(req.ad_id, &req.category_ids)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CheckoutCommitResponse::from_commit(&commit, Utc::now())),
    ))
}

/// `POST /payments/:id/confirm` — Gateway confirmation callback.
///
/// # Errors
///
/// Returns [`MarketError::PaymentNotFound`] for an unknown or
/// already-confirmed payment reference.
#[utoipa::path(
    post,
    path = "/api/v1/payments/{id}/confirm",
    tag = "Checkout",
    summary = "Confirm a gateway payment",
    description = "Marks the payment's placements paid and credits their publishers. Each payment reference confirms exactly once.",
    params(
        ("id" = String, Path, description = "Gateway payment reference"),
    ),
    responses(
        (status = 200, description = "Payment confirmed", body = PaymentConfirmResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse),
    )
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    let ad_id = state.market_service.confirm_payment(&payment_id).await?;
    Ok(Json(PaymentConfirmResponse { ad_id, payment_id }))
}

/// Checkout routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/checkout/preview", post(preview))
        .route("/checkout/commit", post(commit))
        .route("/payments/{id}/confirm", post(confirm_payment))
}
