//! Publisher ad slots and the capacity guard.
//!
//! A [`Category`] is a priced, capacity-limited placement slot on a
//! publisher website. The [`CategoryCatalog`] owns all categories behind
//! per-entry locks; slot occupancy only ever changes through
//! [`CategoryCatalog::try_occupy`] and [`CategoryCatalog::release`], which
//! are conditional updates under the entry's write lock. There is no
//! read-then-write path that could overbook under concurrency.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::money::Amount;
use super::{CategoryId, WalletId, WebsiteId};
use crate::error::MarketError;

/// A publisher-defined ad slot with a price and a slot limit.
#[derive(Debug, Clone)]
pub struct Category {
    /// Category identifier (immutable after creation).
    pub category_id: CategoryId,
    /// Website this slot belongs to.
    pub website_id: WebsiteId,
    /// Wallet of the publisher who owns the website.
    pub publisher_wallet: WalletId,
    /// Display name shown in the catalog.
    pub name: String,
    /// Price per placement.
    pub price: Amount,
    /// Maximum concurrent placements.
    pub max_slots: u32,
    /// Currently occupied placements. `0 <= occupied <= max_slots`.
    pub occupied: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Creates an empty category.
    #[must_use]
    pub fn new(
        website_id: WebsiteId,
        publisher_wallet: WalletId,
        name: String,
        price: Amount,
        max_slots: u32,
    ) -> Self {
        Self {
            category_id: CategoryId::new(),
            website_id,
            publisher_wallet,
            name,
            price,
            max_slots,
            occupied: 0,
            created_at: Utc::now(),
        }
    }

    /// Derived: `occupied >= max_slots`.
    #[must_use]
    pub const fn is_fully_booked(&self) -> bool {
        self.occupied >= self.max_slots
    }
}

/// Lightweight category view for catalog listings.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    /// Category identifier.
    pub category_id: CategoryId,
    /// Website the slot belongs to.
    pub website_id: WebsiteId,
    /// Display name.
    pub name: String,
    /// Price per placement.
    pub price: Amount,
    /// Maximum concurrent placements.
    pub max_slots: u32,
    /// Currently occupied placements.
    pub occupied: u32,
    /// Derived booking state.
    pub fully_booked: bool,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            category_id: category.category_id,
            website_id: category.website_id,
            name: category.name.clone(),
            price: category.price,
            max_slots: category.max_slots,
            occupied: category.occupied,
            fully_booked: category.is_fully_booked(),
        }
    }
}

/// Price and ownership of a category, resolved once per operation.
#[derive(Debug, Clone, Copy)]
pub struct CategoryQuoteInfo {
    /// Category identifier.
    pub category_id: CategoryId,
    /// Website the slot belongs to.
    pub website_id: WebsiteId,
    /// Wallet of the owning publisher.
    pub publisher_wallet: WalletId,
    /// Price per placement.
    pub price: Amount,
}

/// Central store for all categories; the capacity guard lives here.
#[derive(Debug, Default)]
pub struct CategoryCatalog {
    categories: RwLock<HashMap<CategoryId, Arc<RwLock<Category>>>>,
}

impl CategoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            categories: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a category, returning its id.
    pub async fn insert(&self, category: Category) -> CategoryId {
        let category_id = category.category_id;
        let mut map = self.categories.write().await;
        map.insert(category_id, Arc::new(RwLock::new(category)));
        category_id
    }

    async fn entry(&self, category_id: CategoryId) -> Result<Arc<RwLock<Category>>, MarketError> {
        let map = self.categories.read().await;
        map.get(&category_id)
            .cloned()
            .ok_or(MarketError::CategoryNotFound(category_id))
    }

    /// Occupies one slot iff the category is not fully booked.
    ///
    /// Conditional increment under the entry's write lock; assignment and
    /// checkout commit both go through here, so `occupied <= max_slots`
    /// holds under any interleaving.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::CategoryNotFound`] for an unknown category
    /// or [`MarketError::FullyBooked`] when no slot is free.
    pub async fn try_occupy(&self, category_id: CategoryId) -> Result<(), MarketError> {
        let entry = self.entry(category_id).await?;
        let mut category = entry.write().await;
        if category.is_fully_booked() {
            return Err(MarketError::FullyBooked(vec![category_id]));
        }
        category.occupied += 1;
        Ok(())
    }

    /// Releases one slot (saturating at zero; releasing an already-free
    /// category is a no-op rather than an underflow).
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::CategoryNotFound`] for an unknown category.
    pub async fn release(&self, category_id: CategoryId) -> Result<(), MarketError> {
        let entry = self.entry(category_id).await?;
        let mut category = entry.write().await;
        category.occupied = category.occupied.saturating_sub(1);
        Ok(())
    }

    /// Derived booking state for a single category.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::CategoryNotFound`] for an unknown category.
    pub async fn is_fully_booked(&self, category_id: CategoryId) -> Result<bool, MarketError> {
        let entry = self.entry(category_id).await?;
        let category = entry.read().await;
        Ok(category.is_fully_booked())
    }

    /// Resolves price and ownership for an operation.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::CategoryNotFound`] for an unknown category.
    pub async fn quote(&self, category_id: CategoryId) -> Result<CategoryQuoteInfo, MarketError> {
        let entry = self.entry(category_id).await?;
        let category = entry.read().await;
        Ok(CategoryQuoteInfo {
            category_id: category.category_id,
            website_id: category.website_id,
            publisher_wallet: category.publisher_wallet,
            price: category.price,
        })
    }

    /// Returns summaries of all categories, optionally restricted to a website.
    pub async fn list(&self, website_filter: Option<WebsiteId>) -> Vec<CategorySummary> {
        let map = self.categories.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry in map.values() {
            let category = entry.read().await;
            if let Some(filter) = website_filter
                && category.website_id != filter
            {
                continue;
            }
            summaries.push(CategorySummary::from(&*category));
        }
        summaries
    }

    /// Returns the number of categories in the catalog.
    pub async fn len(&self) -> usize {
        self.categories.read().await.len()
    }

    /// Returns `true` if the catalog is empty.
    pub async fn is_empty(&self) -> bool {
        self.categories.read().await.is_empty()
    }
}
