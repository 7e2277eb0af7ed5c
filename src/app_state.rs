//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::MarketService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Market service for all business logic.
    pub market_service: Arc<MarketService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}
