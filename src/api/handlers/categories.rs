//! Category handlers: create and list publisher ad slots.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{
    CategoryDto, CategoryFilterParams, CategoryListResponse, CreateCategoryRequest,
    CreateCategoryResponse, PaginationParams, paginate,
};
use crate::app_state::AppState;
use crate::domain::money::Amount;
use crate::error::{ErrorResponse, MarketError};

/// `POST /categories` — Create a publisher category.
///
/// # Errors
///
/// Returns [`MarketError`] for an unknown publisher wallet or a zero
/// slot limit.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "Categories",
    summary = "Create a category",
    description = "Registers an ad slot on a website with its price and slot limit. The publisher wallet receives placement payments and funds refunds.",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CreateCategoryResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Publisher wallet not found", body = ErrorResponse),
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let category_id = state
        .market_service
        .create_category(
            req.website_id,
            req.publisher_wallet,
            req.name.clone(),
            Amount::from_cents(req.price_cents),
            req.max_slots,
        )
        .await?;

    let response = CreateCategoryResponse {
        category_id,
        website_id: req.website_id,
        name: req.name,
        price_cents: req.price_cents,
        max_slots: req.max_slots,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /categories` — List categories, optionally for one website.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "Categories",
    summary = "List categories",
    description = "Returns a paginated category listing with live occupancy, optionally filtered by website.",
    params(CategoryFilterParams),
    responses(
        (status = 200, description = "Paginated category list", body = CategoryListResponse),
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<CategoryFilterParams>,
) -> impl IntoResponse {
    let filter = params
        .website_id
        .map(crate::domain::WebsiteId::from_uuid);
    let summaries = state.market_service.catalog().list(filter).await;

    let total = u32::try_from(summaries.len()).unwrap_or(u32::MAX);
    let (pagination, start, take) = paginate(
        &PaginationParams {
            page: params.page,
            per_page: params.per_page,
        },
        total,
    );

    let data: Vec<CategoryDto> = summaries
        .into_iter()
        .skip(start)
        .take(take)
        .map(CategoryDto::from)
        .collect();

    Json(CategoryListResponse { data, pagination })
}

/// Category routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/categories", post(create_category).get(list_categories))
}
