//! Domain layer: identifiers, money, the wallet ledger, the placement
//! state machine, categories with the capacity guard, and the event
//! system.
//!
//! Every mutable aggregate (wallets, ads, categories) lives in its own
//! registry behind per-entry [`tokio::sync::RwLock`]s, so unrelated
//! entities never contend and per-entity mutations are serialized.

pub mod ad;
pub mod category;
pub mod event;
pub mod event_bus;
pub mod ids;
pub mod ledger;
pub mod money;
pub mod registry;
pub mod selection;
pub mod wallet;

pub use ad::{Ad, AdSummary};
pub use category::{Category, CategoryCatalog, CategoryQuoteInfo, CategorySummary};
pub use event::MarketEvent;
pub use event_bus::EventBus;
pub use ids::{AdId, CategoryId, SelectionId, WalletId, WebsiteId};
pub use ledger::WalletLedger;
pub use money::Amount;
pub use registry::AdRegistry;
pub use selection::{SelectionStatus, WebsiteSelection};
pub use wallet::{Transaction, TransactionKind, Wallet};
