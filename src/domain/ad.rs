//! Ad aggregate: an advertiser's campaign record and its placements.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::money::Amount;
use super::selection::WebsiteSelection;
use super::{AdId, SelectionId, WalletId};

/// An advertiser's ad with its full placement history.
///
/// Selections are only ever appended; rejected ones stay as history.
/// The ad is never hard-deleted while any selection is live.
#[derive(Debug, Clone)]
pub struct Ad {
    /// Ad identifier (immutable after creation).
    pub ad_id: AdId,
    /// Wallet of the owning advertiser.
    pub advertiser_wallet: WalletId,
    /// Opaque reference to the creative asset. Never inspected.
    pub creative_url: String,
    /// Payment captured at submission; the refund quantum on rejection.
    pub payment_amount: Amount,
    /// Set when a placement is rejected; cleared once any placement goes
    /// active again. Gates visibility in the zero-cost pickup pool.
    pub available_for_reassignment: bool,
    /// All placements, oldest first.
    pub selections: Vec<WebsiteSelection>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Ad {
    /// Creates an ad with no placements yet.
    #[must_use]
    pub fn new(advertiser_wallet: WalletId, creative_url: String, payment_amount: Amount) -> Self {
        Self {
            ad_id: AdId::new(),
            advertiser_wallet,
            creative_url,
            payment_amount,
            available_for_reassignment: false,
            selections: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Looks up a selection by id.
    #[must_use]
    pub fn selection(&self, selection_id: SelectionId) -> Option<&WebsiteSelection> {
        self.selections
            .iter()
            .find(|s| s.selection_id == selection_id)
    }

    /// Mutable lookup of a selection by id.
    #[must_use]
    pub fn selection_mut(&mut self, selection_id: SelectionId) -> Option<&mut WebsiteSelection> {
        self.selections
            .iter_mut()
            .find(|s| s.selection_id == selection_id)
    }

    /// `true` if any placement is currently active.
    #[must_use]
    pub fn has_active_selection(&self) -> bool {
        self.selections.iter().any(WebsiteSelection::is_active)
    }
}

/// Lightweight ad view for list endpoints and the reassignment pool.
#[derive(Debug, Clone, Serialize)]
pub struct AdSummary {
    /// Ad identifier.
    pub ad_id: AdId,
    /// Owning advertiser's wallet.
    pub advertiser_wallet: WalletId,
    /// Creative reference.
    pub creative_url: String,
    /// Amount captured at submission.
    pub payment_amount: Amount,
    /// Whether the ad sits in the reassignment pool.
    pub available_for_reassignment: bool,
    /// Number of placements ever created.
    pub selection_count: usize,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Ad> for AdSummary {
    fn from(ad: &Ad) -> Self {
        Self {
            ad_id: ad.ad_id,
            advertiser_wallet: ad.advertiser_wallet,
            creative_url: ad.creative_url.clone(),
            payment_amount: ad.payment_amount,
            available_for_reassignment: ad.available_for_reassignment,
            selection_count: ad.selections.len(),
            created_at: ad.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{CategoryId, WebsiteId};

    #[test]
    fn selection_lookup() {
        let mut ad = Ad::new(WalletId::new(), "ipfs://creative".to_string(), Amount::from_cents(5000));
        let sel = WebsiteSelection::new_pending(WebsiteId::new(), CategoryId::new(), Utc::now());
        let id = sel.selection_id;
        ad.selections.push(sel);

        assert!(ad.selection(id).is_some());
        assert!(ad.selection(SelectionId::new()).is_none());
        assert!(!ad.has_active_selection());
    }

    #[test]
    fn summary_reflects_state() {
        let mut ad = Ad::new(WalletId::new(), "ipfs://creative".to_string(), Amount::from_cents(5000));
        ad.available_for_reassignment = true;
        let summary = AdSummary::from(&ad);
        assert!(summary.available_for_reassignment);
        assert_eq!(summary.selection_count, 0);
        assert_eq!(summary.payment_amount, Amount::from_cents(5000));
    }
}
