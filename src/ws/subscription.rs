//! Per-connection subscription manager.
//!
//! Tracks which ad IDs a WebSocket client is subscribed to and provides
//! server-side event filtering.

use std::collections::HashSet;

use crate::domain::AdId;

/// Manages the set of ad subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed ad IDs. If `subscribe_all` is true, this set is ignored.
    ad_ids: HashSet<AdId>,
    /// Whether the client subscribes to all ads (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds ad IDs to the subscription set. `"*"` enables the wildcard.
    pub fn subscribe(&mut self, ids: &[AdId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        for id in ids {
            self.ad_ids.insert(*id);
        }
    }

    /// Removes ad IDs from the subscription set.
    pub fn unsubscribe(&mut self, ids: &[AdId]) {
        for id in ids {
            self.ad_ids.remove(id);
        }
    }

    /// Returns `true` if the given ad ID matches the subscription filter.
    #[must_use]
    pub fn matches(&self, ad_id: AdId) -> bool {
        self.subscribe_all || self.ad_ids.contains(&ad_id)
    }

    /// Returns the number of explicitly subscribed ad IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.ad_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
