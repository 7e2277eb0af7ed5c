//! Concurrent ad storage with per-ad fine-grained locking.
//!
//! [`AdRegistry`] stores every ad behind its own [`tokio::sync::RwLock`],
//! so operations on different ads run concurrently while the state
//! machine transitions on one ad are serialized. A secondary
//! selection → ad index lets placement endpoints address a selection
//! without knowing its ad.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::ad::{Ad, AdSummary};
use super::{AdId, SelectionId};
use crate::error::MarketError;

/// Central store for all ads.
#[derive(Debug, Default)]
pub struct AdRegistry {
    ads: RwLock<HashMap<AdId, Arc<RwLock<Ad>>>>,
    selection_index: RwLock<HashMap<SelectionId, AdId>>,
}

impl AdRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ads: RwLock::new(HashMap::new()),
            selection_index: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new ad, returning its id.
    pub async fn insert(&self, ad: Ad) -> AdId {
        let ad_id = ad.ad_id;
        let mut map = self.ads.write().await;
        map.insert(ad_id, Arc::new(RwLock::new(ad)));
        ad_id
    }

    /// Returns the shared handle for an ad.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::AdNotFound`] if no ad with the given id exists.
    pub async fn get(&self, ad_id: AdId) -> Result<Arc<RwLock<Ad>>, MarketError> {
        let map = self.ads.read().await;
        map.get(&ad_id).cloned().ok_or(MarketError::AdNotFound(ad_id))
    }

    /// Records that `selection_id` belongs to `ad_id`. Called whenever a
    /// selection is created.
    pub async fn index_selection(&self, selection_id: SelectionId, ad_id: AdId) {
        let mut index = self.selection_index.write().await;
        index.insert(selection_id, ad_id);
    }

    /// Resolves a selection to its owning ad.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::SelectionNotFound`] for an unknown selection.
    pub async fn ad_for_selection(&self, selection_id: SelectionId) -> Result<AdId, MarketError> {
        let index = self.selection_index.read().await;
        index
            .get(&selection_id)
            .copied()
            .ok_or(MarketError::SelectionNotFound(selection_id))
    }

    /// Returns summaries of all ads.
    pub async fn list(&self) -> Vec<AdSummary> {
        let map = self.ads.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry in map.values() {
            let ad = entry.read().await;
            summaries.push(AdSummary::from(&*ad));
        }
        summaries
    }

    /// Returns the ads currently offered for zero-cost reassignment.
    pub async fn list_available(&self) -> Vec<AdSummary> {
        let map = self.ads.read().await;
        let mut summaries = Vec::new();
        for entry in map.values() {
            let ad = entry.read().await;
            if ad.available_for_reassignment {
                summaries.push(AdSummary::from(&*ad));
            }
        }
        summaries
    }

    /// Returns every ad handle; the auto-approval sweep walks these.
    pub async fn handles(&self) -> Vec<Arc<RwLock<Ad>>> {
        let map = self.ads.read().await;
        map.values().cloned().collect()
    }

    /// Returns the number of ads in the registry.
    pub async fn len(&self) -> usize {
        self.ads.read().await.len()
    }

    /// Returns `true` if the registry contains no ads.
    pub async fn is_empty(&self) -> bool {
        self.ads.read().await.is_empty()
    }
}
