//! Category DTOs: create and list operations.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::category::CategorySummary;
use crate::domain::{CategoryId, WalletId, WebsiteId};

/// Request body for `POST /categories`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    /// Website the slot belongs to.
    pub website_id: WebsiteId,
    /// Wallet that receives placement payments.
    pub publisher_wallet: WalletId,
    /// Display name (e.g. `"homepage banner"`).
    pub name: String,
    /// Price per placement in cents.
    pub price_cents: u64,
    /// Maximum concurrent placements.
    pub max_slots: u32,
}

/// Response body for `POST /categories` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateCategoryResponse {
    /// Unique category identifier.
    pub category_id: CategoryId,
    /// Website echoed from the request.
    pub website_id: WebsiteId,
    /// Name echoed from the request.
    pub name: String,
    /// Price echoed from the request, in cents.
    pub price_cents: u64,
    /// Slot limit echoed from the request.
    pub max_slots: u32,
}

/// Query parameters for `GET /categories`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CategoryFilterParams {
    /// Restrict the listing to one website.
    pub website_id: Option<uuid::Uuid>,
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

/// Category summary in list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryDto {
    /// Category identifier.
    pub category_id: CategoryId,
    /// Website the slot belongs to.
    pub website_id: WebsiteId,
    /// Display name.
    pub name: String,
    /// Price per placement in cents.
    pub price_cents: u64,
    /// Maximum concurrent placements.
    pub max_slots: u32,
    /// Currently occupied placements.
    pub occupied: u32,
    /// Whether every slot is taken.
    pub fully_booked: bool,
}

impl From<CategorySummary> for CategoryDto {
    fn from(summary: CategorySummary) -> Self {
        Self {
            category_id: summary.category_id,
            website_id: summary.website_id,
            name: summary.name,
            price_cents: summary.price.cents(),
            max_slots: summary.max_slots,
            occupied: summary.occupied,
            fully_booked: summary.fully_booked,
        }
    }
}

/// Paginated list response for `GET /categories`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryListResponse {
    /// Category summaries.
    pub data: Vec<CategoryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
