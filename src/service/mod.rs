//! Service layer: business logic orchestration.
//!
//! [`MarketService`] coordinates the placement lifecycle, settles money
//! through the wallet ledger, runs the refund allocation engine at
//! checkout, and emits events through the [`super::domain::EventBus`].

pub mod market_service;

pub use market_service::{CheckoutCommit, MarketService};
