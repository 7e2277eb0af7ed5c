//! Domain events reflecting marketplace state mutations.
//!
//! Every state change emits a [`MarketEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers and
//! optionally persisted to the PostgreSQL event log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::money::Amount;
use super::{AdId, CategoryId, SelectionId, WalletId, WebsiteId};

/// Domain event emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// Emitted when an advertiser submits a new ad.
    AdCreated {
        /// Ad identifier.
        ad_id: AdId,
        /// Owning advertiser's wallet.
        advertiser_wallet: WalletId,
        /// Amount captured at submission.
        payment_amount: Amount,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a placement is assigned to a category.
    PlacementAssigned {
        /// Ad identifier.
        ad_id: AdId,
        /// New selection identifier.
        selection_id: SelectionId,
        /// Target website.
        website_id: WebsiteId,
        /// Target category.
        category_id: CategoryId,
        /// Whether this was a zero-cost pickup from the reassignment pool.
        from_pool: bool,
        /// Assignment timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a placement goes active.
    PlacementApproved {
        /// Ad identifier.
        ad_id: AdId,
        /// Selection identifier.
        selection_id: SelectionId,
        /// `true` when the auto-approval sweep fired instead of a publisher.
        auto: bool,
        /// Instant after which the publisher can no longer reject.
        rejection_deadline: DateTime<Utc>,
        /// Approval timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a publisher rejects a placement and the refund settles.
    PlacementRejected {
        /// Ad identifier.
        ad_id: AdId,
        /// Selection identifier.
        selection_id: SelectionId,
        /// Publisher-supplied reason.
        reason: String,
        /// Amount moved from the publisher to the advertiser's refund pool.
        refund_amount: Amount,
        /// Debited publisher wallet.
        publisher_wallet: WalletId,
        /// Credited advertiser wallet.
        advertiser_wallet: WalletId,
        /// Rejection timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when the advertiser confirms an active placement.
    PlacementConfirmed {
        /// Ad identifier.
        ad_id: AdId,
        /// Selection identifier.
        selection_id: SelectionId,
        /// Confirmation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when checkout consumes refund credit.
    CreditConsumed {
        /// Ad identifier.
        ad_id: AdId,
        /// Advertiser wallet the credit came out of.
        advertiser_wallet: WalletId,
        /// Credit applied across the committed categories.
        amount: Amount,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when checkout hands the remaining balance to the gateway.
    PaymentRequested {
        /// Ad identifier.
        ad_id: AdId,
        /// Gateway payment reference.
        payment_id: String,
        /// Out-of-pocket amount requested.
        amount: Amount,
        /// Request timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when the gateway confirms a payment.
    PaymentConfirmed {
        /// Ad identifier.
        ad_id: AdId,
        /// Gateway payment reference.
        payment_id: String,
        /// Confirmation timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl MarketEvent {
    /// Returns the ad this event belongs to.
    #[must_use]
    pub fn ad_id(&self) -> AdId {
        match self {
            Self::AdCreated { ad_id, .. }
            | Self::PlacementAssigned { ad_id, .. }
            | Self::PlacementApproved { ad_id, .. }
            | Self::PlacementRejected { ad_id, .. }
            | Self::PlacementConfirmed { ad_id, .. }
            | Self::CreditConsumed { ad_id, .. }
            | Self::PaymentRequested { ad_id, .. }
            | Self::PaymentConfirmed { ad_id, .. } => *ad_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::AdCreated { .. } => "ad_created",
            Self::PlacementAssigned { .. } => "placement_assigned",
            Self::PlacementApproved { .. } => "placement_approved",
            Self::PlacementRejected { .. } => "placement_rejected",
            Self::PlacementConfirmed { .. } => "placement_confirmed",
            Self::CreditConsumed { .. } => "credit_consumed",
            Self::PaymentRequested { .. } => "payment_requested",
            Self::PaymentConfirmed { .. } => "payment_confirmed",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn ad_created_event_type() {
        let event = MarketEvent::AdCreated {
            ad_id: AdId::new(),
            advertiser_wallet: WalletId::new(),
            payment_amount: Amount::from_cents(5000),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "ad_created");
    }

    #[test]
    fn placement_rejected_serializes() {
        let event = MarketEvent::PlacementRejected {
            ad_id: AdId::new(),
            selection_id: SelectionId::new(),
            reason: "off brand".to_string(),
            refund_amount: Amount::from_cents(5000),
            publisher_wallet: WalletId::new(),
            advertiser_wallet: WalletId::new(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event);
        assert!(json.is_ok());
        let json_str = json.unwrap_or_default();
        assert!(json_str.contains("placement_rejected"));
        assert!(json_str.contains("off brand"));
    }

    #[test]
    fn ad_id_accessor() {
        let id = AdId::new();
        let event = MarketEvent::PaymentConfirmed {
            ad_id: id,
            payment_id: "pay-1".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.ad_id(), id);
    }
}
