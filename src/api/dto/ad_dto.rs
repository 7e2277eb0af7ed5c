//! Ad DTOs: create, list, detail, and the reassignment pool view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use super::placement_dto::SelectionDto;
use crate::domain::ad::{Ad, AdSummary};
use crate::domain::{AdId, WalletId};

/// Request body for `POST /ads`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAdRequest {
    /// Wallet that pays for and receives refunds on this ad.
    pub advertiser_wallet: WalletId,
    /// URL of the creative asset.
    pub creative_url: String,
    /// Payment amount captured at submission, in cents.
    pub payment_amount_cents: u64,
}

/// Response body for `POST /ads` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateAdResponse {
    /// Unique ad identifier.
    pub ad_id: AdId,
    /// Advertiser wallet echoed from the request.
    pub advertiser_wallet: WalletId,
    /// Creative URL echoed from the request.
    pub creative_url: String,
    /// Payment amount echoed from the request, in cents.
    pub payment_amount_cents: u64,
    /// Server creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Ad summary in list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdSummaryDto {
    /// Ad identifier.
    pub ad_id: AdId,
    /// Owning advertiser's wallet.
    pub advertiser_wallet: WalletId,
    /// Creative reference.
    pub creative_url: String,
    /// Payment amount in cents.
    pub payment_amount_cents: u64,
    /// Whether the ad sits in the reassignment pool.
    pub available_for_reassignment: bool,
    /// Number of placements ever created.
    pub selection_count: usize,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<AdSummary> for AdSummaryDto {
    fn from(summary: AdSummary) -> Self {
        Self {
            ad_id: summary.ad_id,
            advertiser_wallet: summary.advertiser_wallet,
            creative_url: summary.creative_url,
            payment_amount_cents: summary.payment_amount.cents(),
            available_for_reassignment: summary.available_for_reassignment,
            selection_count: summary.selection_count,
            created_at: summary.created_at,
        }
    }
}

/// Paginated list response for `GET /ads`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdListResponse {
    /// Ad summaries.
    pub data: Vec<AdSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// An entry in the reassignment pool (`GET /ads/available`).
///
/// `pickup_price_cents` is always zero: the original advertiser already
/// paid, so pool pickups cost the new website nothing.
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableAdDto {
    /// Ad identifier.
    pub ad_id: AdId,
    /// Creative reference.
    pub creative_url: String,
    /// Amount the original advertiser paid, in cents.
    pub original_amount_cents: u64,
    /// Cost of picking this ad up from the pool. Always `0`.
    pub pickup_price_cents: u64,
}

impl From<AdSummary> for AvailableAdDto {
    fn from(summary: AdSummary) -> Self {
        Self {
            ad_id: summary.ad_id,
            creative_url: summary.creative_url,
            original_amount_cents: summary.payment_amount.cents(),
            pickup_price_cents: 0,
        }
    }
}

/// Full ad detail for `GET /ads/:id`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdDetailResponse {
    /// Ad identifier.
    pub ad_id: AdId,
    /// Owning advertiser's wallet.
    pub advertiser_wallet: WalletId,
    /// Creative reference.
    pub creative_url: String,
    /// Payment amount in cents.
    pub payment_amount_cents: u64,
    /// Whether the ad sits in the reassignment pool.
    pub available_for_reassignment: bool,
    /// Every placement ever created for this ad.
    pub selections: Vec<SelectionDto>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl AdDetailResponse {
    /// Builds the detail view of an ad as of `now`.
    #[must_use]
    pub fn from_ad(ad: &Ad, now: DateTime<Utc>) -> Self {
        Self {
            ad_id: ad.ad_id,
            advertiser_wallet: ad.advertiser_wallet,
            creative_url: ad.creative_url.clone(),
            payment_amount_cents: ad.payment_amount.cents(),
            available_for_reassignment: ad.available_for_reassignment,
            selections: ad
                .selections
                .iter()
                .map(|s| SelectionDto::from_selection(s, now))
                .collect(),
            created_at: ad.created_at,
        }
    }
}
