//! Checkout DTOs: allocation preview, commit, and payment confirmation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::placement_dto::SelectionDto;
use crate::domain::{AdId, CategoryId};
use crate::engine::allocation::AllocationOutcome;
use crate::payment::PaymentInitiation;
use crate::service::CheckoutCommit;

/// Request body for `POST /checkout/preview` and `POST /checkout/commit`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Ad being placed.
    pub ad_id: AdId,
    /// Categories in the advertiser's cart, in display order.
    pub category_ids: Vec<CategoryId>,
}

/// One category's share of the allocation.
#[derive(Debug, Serialize, ToSchema)]
pub struct AllocationLineDto {
    /// Category identifier.
    pub category_id: CategoryId,
    /// Listed price in cents.
    pub price_cents: u64,
    /// Refund credit applied to this category, in cents.
    pub applied_cents: u64,
    /// Remainder the advertiser still owes, in cents.
    pub owed_cents: u64,
}

/// Allocation result for `POST /checkout/preview`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutPreviewResponse {
    /// Per-category breakdown, in request order.
    pub lines: Vec<AllocationLineDto>,
    /// Sum of listed prices, in cents.
    pub total_original_cents: u64,
    /// Refund credit that would be consumed, in cents.
    pub total_applied_cents: u64,
    /// Out-of-pocket remainder, in cents.
    pub total_owed_cents: u64,
    /// `true` when the credit covers the whole cart.
    pub fully_covered: bool,
    /// Share of the cart covered by credit, in `[0, 1]`.
    pub refund_efficiency: f64,
}

impl From<&AllocationOutcome> for CheckoutPreviewResponse {
    fn from(outcome: &AllocationOutcome) -> Self {
        Self {
            lines: outcome
                .per_category
                .iter()
                .map(|line| AllocationLineDto {
                    category_id: line.category_id,
                    price_cents: line.price.cents(),
                    applied_cents: line.applied.cents(),
                    owed_cents: line.owed.cents(),
                })
                .collect(),
            total_original_cents: outcome.total_original.cents(),
            total_applied_cents: outcome.total_applied.cents(),
            total_owed_cents: outcome.total_owed.cents(),
            fully_covered: outcome.is_fully_covered,
            refund_efficiency: outcome.refund_efficiency,
        }
    }
}

/// Gateway hand-off details within a commit response.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentDto {
    /// Gateway payment reference.
    pub payment_id: String,
    /// URL the advertiser completes the payment at.
    pub payment_url: String,
    /// Amount requested from the gateway, in cents.
    pub amount_cents: u64,
}

impl PaymentDto {
    fn new(initiation: &PaymentInitiation, amount_cents: u64) -> Self {
        Self {
            payment_id: initiation.payment_id.clone(),
            payment_url: initiation.payment_url.clone(),
            amount_cents,
        }
    }
}

/// Response body for `POST /checkout/commit` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutCommitResponse {
    /// Newly created pending placements, in request order.
    pub selections: Vec<SelectionDto>,
    /// The allocation that was applied.
    pub allocation: CheckoutPreviewResponse,
    /// Present when a remainder went to the payment gateway.
    pub payment: Option<PaymentDto>,
}

impl CheckoutCommitResponse {
    /// Builds the commit view as of `now`.
    #[must_use]
    pub fn from_commit(commit: &CheckoutCommit, now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            selections: commit
                .selections
                .iter()
                .map(|s| SelectionDto::from_selection(s, now))
                .collect(),
            allocation: CheckoutPreviewResponse::from(&commit.outcome),
            payment: commit
                .payment
                .as_ref()
                .map(|p| PaymentDto::new(p, commit.outcome.total_owed.cents())),
        }
    }
}

/// Response body for `POST /payments/:id/confirm`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentConfirmResponse {
    /// Ad whose placements were settled.
    pub ad_id: AdId,
    /// Confirmed gateway payment reference.
    pub payment_id: String,
}
