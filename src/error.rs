//! Marketplace error types with HTTP status code mapping.
//!
//! [`MarketError`] is the central error type for the service. Each
//! variant maps to a specific HTTP status code and structured JSON error
//! response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::money::Amount;
use crate::domain::{AdId, CategoryId, SelectionId, WalletId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "insufficient balance ...",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`MarketError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details (e.g. the blocked category ids).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category             | HTTP Status                  |
/// |-----------|----------------------|------------------------------|
/// | 1000–1999 | Validation           | 400 Bad Request              |
/// | 2000–2099 | Not Found            | 404 Not Found                |
/// | 2100–2199 | State Conflict       | 409 Conflict                 |
/// | 3000–3999 | Server               | 500 / 502                    |
/// | 4000–4999 | Business Rule        | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Ad with the given id was not found.
    #[error("ad not found: {0}")]
    AdNotFound(AdId),

    /// Selection with the given id was not found.
    #[error("selection not found: {0}")]
    SelectionNotFound(SelectionId),

    /// Category with the given id was not found.
    #[error("category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// Wallet with the given id was not found.
    #[error("wallet not found: {0}")]
    WalletNotFound(WalletId),

    /// Gateway payment reference was not found.
    #[error("payment not found: {0}")]
    PaymentNotFound(String),

    /// The requested lifecycle transition is not permitted from the
    /// selection's current state. No retry is meaningful.
    #[error("cannot {action} selection {selection_id}: state is {from}")]
    InvalidTransition {
        /// Selection the transition was attempted on.
        selection_id: SelectionId,
        /// Current state label.
        from: &'static str,
        /// Attempted action.
        action: String,
    },

    /// The rejection deadline for an active placement has passed.
    #[error("rejection window closed for selection {0}")]
    RejectionWindowClosed(SelectionId),

    /// A wallet debit was denied. The triggering operation (rejection or
    /// payment) aborts with no partial mutation.
    #[error("insufficient balance in wallet {wallet_id}: required {required}, available {available}")]
    InsufficientBalance {
        /// Wallet the debit was attempted on.
        wallet_id: WalletId,
        /// Amount the operation needed.
        required: Amount,
        /// Amount actually available.
        available: Amount,
    },

    /// One or more categories have no free slot. Carries the specific
    /// blocked ids so the caller can re-select without discarding the rest.
    #[error("fully booked: {} category(ies) have no free slot", .0.len())]
    FullyBooked(Vec<CategoryId>),

    /// Internal invariant violation: computed credit application exceeds
    /// the available pool. Programming-error class; never clamped.
    #[error("allocation mismatch: applied {applied} exceeds available credit {available}")]
    AllocationMismatch {
        /// Credit the allocation tried to apply.
        applied: Amount,
        /// Credit actually available.
        available: Amount,
    },

    /// The external payment gateway failed to accept the request.
    /// No selection state was mutated.
    #[error("payment gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::AdNotFound(_) => 2001,
            Self::SelectionNotFound(_) => 2002,
            Self::CategoryNotFound(_) => 2003,
            Self::WalletNotFound(_) => 2004,
            Self::PaymentNotFound(_) => 2005,
            Self::InvalidTransition { .. } => 2101,
            Self::RejectionWindowClosed(_) => 2102,
            Self::InsufficientBalance { .. } => 4001,
            Self::FullyBooked(_) => 4002,
            Self::AllocationMismatch { .. } => 3002,
            Self::GatewayUnavailable(_) => 3003,
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::AdNotFound(_)
            | Self::SelectionNotFound(_)
            | Self::CategoryNotFound(_)
            | Self::WalletNotFound(_)
            | Self::PaymentNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidTransition { .. } | Self::RejectionWindowClosed(_) => {
                StatusCode::CONFLICT
            }
            Self::InsufficientBalance { .. } | Self::FullyBooked(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::AllocationMismatch { .. } | Self::PersistenceError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Variant-specific structured details for the response body.
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::FullyBooked(blocked) => serde_json::to_value(blocked).ok().map(|ids| {
                serde_json::json!({ "blocked_categories": ids })
            }),
            Self::InsufficientBalance {
                required, available, ..
            } => Some(serde_json::json!({
                "required_cents": required.cents(),
                "available_cents": available.cents(),
            })),
            _ => None,
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn fully_booked_carries_blocked_ids() {
        let blocked = vec![CategoryId::new(), CategoryId::new()];
        let err = MarketError::FullyBooked(blocked.clone());
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let Some(details) = err.details() else {
            panic!("expected details");
        };
        let listed = details
            .get("blocked_categories")
            .and_then(|v| v.as_array())
            .map(Vec::len);
        assert_eq!(listed, Some(blocked.len()));
    }

    #[test]
    fn status_and_code_mapping() {
        let err = MarketError::AllocationMismatch {
            applied: Amount::from_cents(100),
            available: Amount::from_cents(50),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), 3002);

        let err = MarketError::RejectionWindowClosed(SelectionId::new());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
