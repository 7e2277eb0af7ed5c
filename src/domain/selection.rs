//! Per-placement state machine.
//!
//! A [`WebsiteSelection`] is one relationship between an ad and a
//! (website, category) pair. Its lifecycle is a single tagged enum,
//! [`SelectionStatus`] — the one canonical status derivation consumed by
//! every surface; there are no parallel booleans to fall out of sync.
//!
//! `confirmed` (advertiser acknowledgement) and `paid` are orthogonal
//! flags on top of the status, not states of their own.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryId, SelectionId, WebsiteId};
use crate::error::MarketError;

/// Lifecycle state of a placement.
///
/// `Pending → Active → Rejected` is the only forward path; `Rejected` is
/// terminal for the selection (the ad itself may be reassigned elsewhere).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionStatus {
    /// Awaiting the publisher's decision (or the auto-approval sweep).
    Pending {
        /// When the placement was assigned.
        assigned_at: DateTime<Utc>,
    },
    /// Approved and live.
    Active {
        /// When the publisher (or the sweep) approved it.
        approved_at: DateTime<Utc>,
        /// After this instant the publisher can no longer reject it.
        rejection_deadline: DateTime<Utc>,
    },
    /// Rejected by the publisher. Terminal; kept as history.
    Rejected {
        /// Publisher-supplied reason.
        reason: String,
        /// When the rejection happened.
        rejected_at: DateTime<Utc>,
    },
}

impl SelectionStatus {
    /// Stable string label (`"pending"` / `"active"` / `"rejected"`).
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending { .. } => "pending",
            Self::Active { .. } => "active",
            Self::Rejected { .. } => "rejected",
        }
    }
}

/// One placement of an ad on a (website, category) pair.
///
/// Never physically removed: rejected selections remain as history and as
/// the trigger for the ad's reassignment availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteSelection {
    /// Selection identifier (immutable after creation).
    pub selection_id: SelectionId,
    /// Target website.
    pub website_id: WebsiteId,
    /// Target category on that website.
    pub category_id: CategoryId,
    /// Lifecycle state.
    pub status: SelectionStatus,
    /// Advertiser's manual acknowledgement of an active placement.
    pub confirmed: bool,
    /// When the advertiser confirmed, if they did.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Whether the placement has been paid for (by credit or gateway).
    pub paid: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl WebsiteSelection {
    /// Creates a pending selection assigned at `now`.
    #[must_use]
    pub fn new_pending(website_id: WebsiteId, category_id: CategoryId, now: DateTime<Utc>) -> Self {
        Self {
            selection_id: SelectionId::new(),
            website_id,
            category_id,
            status: SelectionStatus::Pending { assigned_at: now },
            confirmed: false,
            confirmed_at: None,
            paid: false,
            created_at: now,
        }
    }

    /// `true` once the placement has been approved (it may have been
    /// rejected afterwards; see [`Self::is_rejected`]).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, SelectionStatus::Active { .. })
    }

    /// `true` for rejected placements.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self.status, SelectionStatus::Rejected { .. })
    }

    /// `true` while the publisher's decision (or the sweep) is outstanding.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, SelectionStatus::Pending { .. })
    }

    /// Time left in which the publisher may still reject an active
    /// placement. Derived from the stored deadline, never a stored
    /// countdown. `None` for non-active selections; zero once expired.
    #[must_use]
    pub fn rejection_time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        match &self.status {
            SelectionStatus::Active {
                rejection_deadline, ..
            } => Some((*rejection_deadline - now).max(Duration::zero())),
            _ => None,
        }
    }

    /// Publisher approval: `Pending → Active`.
    ///
    /// The rejection deadline is fixed at `now + rejection_window`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidTransition`] unless the selection is
    /// pending.
    pub fn approve(
        &mut self,
        now: DateTime<Utc>,
        rejection_window: Duration,
    ) -> Result<(), MarketError> {
        match self.status {
            SelectionStatus::Pending { .. } => {
                self.status = SelectionStatus::Active {
                    approved_at: now,
                    rejection_deadline: now + rejection_window,
                };
                Ok(())
            }
            _ => Err(self.invalid("approve")),
        }
    }

    /// Checks whether a rejection is currently permitted, without
    /// mutating anything. The service runs this *before* touching any
    /// wallet so a disallowed rejection never causes a partial debit.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidTransition`] for already-rejected
    /// selections or [`MarketError::RejectionWindowClosed`] for active
    /// ones past their deadline.
    pub fn check_rejectable(&self, now: DateTime<Utc>) -> Result<(), MarketError> {
        match &self.status {
            SelectionStatus::Pending { .. } => Ok(()),
            SelectionStatus::Active {
                rejection_deadline, ..
            } => {
                if now >= *rejection_deadline {
                    Err(MarketError::RejectionWindowClosed(self.selection_id))
                } else {
                    Ok(())
                }
            }
            SelectionStatus::Rejected { .. } => Err(self.invalid("reject")),
        }
    }

    /// Publisher rejection: `Pending | Active → Rejected`.
    ///
    /// The caller is responsible for having settled the refund first;
    /// this only flips the state.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::check_rejectable`].
    pub fn reject(&mut self, reason: String, now: DateTime<Utc>) -> Result<(), MarketError> {
        self.check_rejectable(now)?;
        self.status = SelectionStatus::Rejected {
            reason,
            rejected_at: now,
        };
        Ok(())
    }

    /// Advertiser confirmation of an active placement. Idempotent:
    /// confirming twice returns `Ok` without changing the timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidTransition`] unless the selection is
    /// active.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<(), MarketError> {
        if !self.is_active() {
            return Err(self.invalid("confirm"));
        }
        if !self.confirmed {
            self.confirmed = true;
            self.confirmed_at = Some(now);
        }
        Ok(())
    }

    /// `true` if the auto-approval grace window has elapsed for a
    /// still-pending selection.
    #[must_use]
    pub fn auto_approval_due(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        match self.status {
            SelectionStatus::Pending { assigned_at } => now >= assigned_at + grace,
            _ => false,
        }
    }

    fn invalid(&self, action: &str) -> MarketError {
        MarketError::InvalidTransition {
            selection_id: self.selection_id,
            from: self.status.label(),
            action: action.to_string(),
        }
    }
}
