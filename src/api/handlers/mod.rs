//! REST endpoint handlers organized by resource.

pub mod ads;
pub mod categories;
pub mod checkout;
pub mod placements;
pub mod system;
pub mod wallets;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(wallets::routes())
        .merge(categories::routes())
        .merge(ads::routes())
        .merge(placements::routes())
        .merge(checkout::routes())
}
