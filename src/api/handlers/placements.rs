//! Placement lifecycle handlers: assign, approve, reject, confirm.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{AssignRequest, RejectRequest, SelectionDto};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, MarketError};

/// `POST /ads/:id/selections` — Assign an ad to a category.
///
/// # Errors
///
/// Returns [`MarketError::FullyBooked`] when the category has no free
/// slot, or [`MarketError`] for invalid ids and pool misuse.
#[utoipa::path(
    post,
    path = "/api/v1/ads/{id}/selections",
    tag = "Placements",
    summary = "Assign an ad to a category",
    description = "Creates a pending placement. Set `from_pool` for a zero-cost pickup of a rejected ad from the reassignment pool.",
    params(
        ("id" = uuid::Uuid, Path, description = "Ad UUID"),
    ),
    request_body = AssignRequest,
    responses(
        (status = 201, description = "Placement created", body = SelectionDto),
        (status = 404, description = "Ad or category not found", body = ErrorResponse),
        (status = 422, description = "Category fully booked", body = ErrorResponse),
    )
)]
pub async fn assign(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AssignRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let ad_id = crate::domain::AdId::from_uuid(id);
    let selection = if req.from_pool {
        state
            .market_service
            .assign_from_pool(ad_id, req.website_id, req.category_id)
            .await?
    } else {
        state
            .market_service
            .assign(ad_id, req.website_id, req.category_id)
            .await?
    };
    Ok((
        StatusCode::CREATED,
        Json(SelectionDto::from_selection(&selection, Utc::now())),
    ))
}

/// `POST /selections/:id/approve` — Publisher approval.
///
/// # Errors
///
/// Returns [`MarketError::InvalidTransition`] unless the placement is
/// pending.
#[utoipa::path(
    post,
    path = "/api/v1/selections/{id}/approve",
    tag = "Placements",
    summary = "Approve a placement",
    description = "Moves a pending placement to active and starts the rejection window.",
    params(
        ("id" = uuid::Uuid, Path, description = "Selection UUID"),
    ),
    responses(
        (status = 200, description = "Placement approved", body = SelectionDto),
        (status = 404, description = "Selection not found", body = ErrorResponse),
        (status = 409, description = "Invalid transition", body = ErrorResponse),
    )
)]
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let selection_id = crate::domain::SelectionId::from_uuid(id);
    let selection = state.market_service.approve(selection_id).await?;
    Ok(Json(SelectionDto::from_selection(&selection, Utc::now())))
}

/// `POST /selections/:id/reject` — Publisher rejection with refund.
///
/// # Errors
///
/// Returns [`MarketError::RejectionWindowClosed`] past the deadline or
/// [`MarketError::InsufficientBalance`] when the publisher cannot fund
/// the refund; in both cases nothing changes.
#[utoipa::path(
    post,
    path = "/api/v1/selections/{id}/reject",
    tag = "Placements",
    summary = "Reject a placement",
    description = "Rejects a pending or in-window active placement. The publisher's wallet funds the advertiser's refund credit atomically; the slot is released and the ad joins the reassignment pool.",
    params(
        ("id" = uuid::Uuid, Path, description = "Selection UUID"),
    ),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Placement rejected, refund settled", body = SelectionDto),
        (status = 404, description = "Selection not found", body = ErrorResponse),
        (status = 409, description = "Window closed or invalid transition", body = ErrorResponse),
        (status = 422, description = "Publisher balance cannot fund the refund", body = ErrorResponse),
    )
)]
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<RejectRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let selection_id = crate::domain::SelectionId::from_uuid(id);
    let selection = state.market_service.reject(selection_id, req.reason).await?;
    Ok(Json(SelectionDto::from_selection(&selection, Utc::now())))
}

/// `POST /selections/:id/confirm` — Advertiser confirmation.
///
/// # Errors
///
/// Returns [`MarketError::InvalidTransition`] unless the placement is
/// active.
#[utoipa::path(
    post,
    path = "/api/v1/selections/{id}/confirm",
    tag = "Placements",
    summary = "Confirm a live placement",
    description = "Advertiser acknowledgement that the placement is live. Idempotent.",
    params(
        ("id" = uuid::Uuid, Path, description = "Selection UUID"),
    ),
    responses(
        (status = 200, description = "Placement confirmed", body = SelectionDto),
        (status = 404, description = "Selection not found", body = ErrorResponse),
        (status = 409, description = "Invalid transition", body = ErrorResponse),
    )
)]
pub async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let selection_id = crate::domain::SelectionId::from_uuid(id);
    let selection = state.market_service.confirm(selection_id).await?;
    Ok(Json(SelectionDto::from_selection(&selection, Utc::now())))
}

/// Placement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ads/{id}/selections", post(assign))
        .route("/selections/{id}/approve", post(approve))
        .route("/selections/{id}/reject", post(reject))
        .route("/selections/{id}/confirm", post(confirm))
}
