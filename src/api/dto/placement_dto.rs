//! Placement DTOs: assignment requests and selection views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::selection::{SelectionStatus, WebsiteSelection};
use crate::domain::{CategoryId, SelectionId, WebsiteId};

/// Request body for `POST /ads/:id/selections`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRequest {
    /// Website making the assignment.
    pub website_id: WebsiteId,
    /// Target category on that website.
    pub category_id: CategoryId,
    /// `true` for a zero-cost pickup from the reassignment pool.
    #[serde(default)]
    pub from_pool: bool,
}

/// Request body for `POST /selections/:id/reject`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    /// Publisher-supplied reason shown to the advertiser.
    pub reason: String,
}

/// A placement as returned by every selection endpoint.
///
/// `rejection_time_remaining_secs` is derived from the stored deadline
/// at serialization time; it is never persisted.
#[derive(Debug, Serialize, ToSchema)]
pub struct SelectionDto {
    /// Selection identifier.
    pub selection_id: SelectionId,
    /// Website hosting the placement.
    pub website_id: WebsiteId,
    /// Category holding the slot.
    pub category_id: CategoryId,
    /// Lifecycle status (`pending`, `active`, `rejected`).
    pub status: String,
    /// When the placement was assigned (pending only).
    pub assigned_at: Option<DateTime<Utc>>,
    /// When the placement was approved (active only).
    pub approved_at: Option<DateTime<Utc>>,
    /// Instant after which rejection is no longer possible (active only).
    pub rejection_deadline: Option<DateTime<Utc>>,
    /// Seconds left in the rejection window, clamped to zero.
    pub rejection_time_remaining_secs: Option<i64>,
    /// Publisher's reason (rejected only).
    pub rejection_reason: Option<String>,
    /// Whether the advertiser confirmed the live placement.
    pub confirmed: bool,
    /// Whether payment for this placement has settled.
    pub paid: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl SelectionDto {
    /// Builds the view of a selection as of `now`.
    #[must_use]
    pub fn from_selection(selection: &WebsiteSelection, now: DateTime<Utc>) -> Self {
        let (assigned_at, approved_at, rejection_deadline, rejection_reason) =
            match &selection.status {
                SelectionStatus::Pending { assigned_at } => (Some(*assigned_at), None, None, None),
                SelectionStatus::Active {
                    approved_at,
                    rejection_deadline,
                } => (None, Some(*approved_at), Some(*rejection_deadline), None),
                SelectionStatus::Rejected { reason, .. } => {
                    (None, None, None, Some(reason.clone()))
                }
            };
        Self {
            selection_id: selection.selection_id,
            website_id: selection.website_id,
            category_id: selection.category_id,
            status: selection.status.label().to_string(),
            assigned_at,
            approved_at,
            rejection_deadline,
            rejection_time_remaining_secs: selection
                .rejection_time_remaining(now)
                .map(|d| d.num_seconds()),
            rejection_reason,
            confirmed: selection.confirmed,
            paid: selection.paid,
            created_at: selection.created_at,
        }
    }
}
