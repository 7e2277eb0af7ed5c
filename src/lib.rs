//! # admarket
//!
//! Ad placement lifecycle and refund reallocation engine for a
//! two-sided ad marketplace, exposed over REST and WebSocket.
//!
//! Advertisers submit ads with a captured payment amount; publishers
//! list priced categories with limited slots. When a publisher rejects
//! a placement, the refund lands in the advertiser's wallet as spendable
//! credit, and the allocation engine spreads that credit across the next
//! cart cheapest-category-first at checkout.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── MarketService (service/)
//!     ├── Allocation Engine (engine/)
//!     ├── PaymentGateway (payment)
//!     ├── EventBus (domain/)
//!     │
//!     ├── AdRegistry / CategoryCatalog / WalletLedger (domain/)
//!     │
//!     └── PostgreSQL Persistence
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod payment;
pub mod persistence;
pub mod service;
pub mod ws;
