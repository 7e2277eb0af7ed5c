//! External payment gateway contract and pending payment tracking.
//!
//! The engine never talks to a real payment provider: it hands the
//! out-of-pocket remainder of a checkout to a [`PaymentGateway`]
//! implementation and waits for the confirmation callback. Until that
//! callback arrives the affected selections stay pending and unpaid.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::domain::money::Amount;
use crate::domain::{AdId, CategoryId, SelectionId, WalletId};
use crate::error::MarketError;

/// What the gateway returns when a payment is initiated.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PaymentInitiation {
    /// Gateway-side payment reference, echoed back on confirmation.
    pub payment_id: String,
    /// URL the advertiser is redirected to.
    pub payment_url: String,
}

/// Contract for the external payment collaborator.
///
/// Called only when a checkout leaves an out-of-pocket remainder.
/// Implementations must be side-effect-safe on error: a failed
/// `initiate` means no money moved anywhere.
pub trait PaymentGateway: Send + Sync + fmt::Debug {
    /// Requests an external payment of `amount` for `ad_id`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::GatewayUnavailable`] when the provider
    /// cannot accept the request; the caller rolls its checkout back.
    fn initiate(&self, amount: Amount, ad_id: AdId) -> Result<PaymentInitiation, MarketError>;
}

/// Default gateway: mints a local reference and a redirect URL without
/// contacting a provider. Enough for development and tests; production
/// deployments swap in a real implementation.
#[derive(Debug, Clone)]
pub struct UrlStubGateway {
    base_url: String,
}

impl UrlStubGateway {
    /// Creates a stub gateway issuing URLs under `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl PaymentGateway for UrlStubGateway {
    fn initiate(&self, amount: Amount, ad_id: AdId) -> Result<PaymentInitiation, MarketError> {
        let payment_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(%ad_id, %amount, payment_id, "payment initiated (stub)");
        Ok(PaymentInitiation {
            payment_url: format!("{}/pay/{payment_id}", self.base_url),
            payment_id,
        })
    }
}

/// A publisher settlement owed once a payment confirms.
#[derive(Debug, Clone)]
pub struct PendingSettlement {
    /// Selection to mark paid.
    pub selection_id: SelectionId,
    /// Category the selection occupies.
    pub category_id: CategoryId,
    /// Publisher to credit.
    pub publisher_wallet: WalletId,
    /// Category price to credit.
    pub price: Amount,
}

/// An initiated but unconfirmed gateway payment.
#[derive(Debug, Clone)]
pub struct PendingPayment {
    /// Gateway payment reference.
    pub payment_id: String,
    /// Ad the checkout belongs to.
    pub ad_id: AdId,
    /// Total out-of-pocket amount requested.
    pub amount: Amount,
    /// Selections and publisher credits settled on confirmation.
    pub settlements: Vec<PendingSettlement>,
    /// Initiation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Tracks initiated payments until their confirmation callback arrives.
#[derive(Debug, Default)]
pub struct PendingPayments {
    payments: RwLock<HashMap<String, PendingPayment>>,
}

impl PendingPayments {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            payments: RwLock::new(HashMap::new()),
        }
    }

    /// Records an initiated payment.
    pub async fn insert(&self, payment: PendingPayment) {
        let mut map = self.payments.write().await;
        map.insert(payment.payment_id.clone(), payment);
    }

    /// Removes and returns a payment on confirmation. A second
    /// confirmation for the same id fails, which makes the webhook
    /// idempotence-safe (the first one wins).
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::PaymentNotFound`] for an unknown or
    /// already-confirmed payment id.
    pub async fn take(&self, payment_id: &str) -> Result<PendingPayment, MarketError> {
        let mut map = self.payments.write().await;
        map.remove(payment_id)
            .ok_or_else(|| MarketError::PaymentNotFound(payment_id.to_string()))
    }

    /// Returns the number of unconfirmed payments.
    pub async fn len(&self) -> usize {
        self.payments.read().await.len()
    }

    /// Returns `true` if no payment is awaiting confirmation.
    pub async fn is_empty(&self) -> bool {
        self.payments.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn stub_gateway_mints_unique_references() {
        let gateway = UrlStubGateway::new("https://pay.example");
        let ad = AdId::new();
        let Ok(a) = gateway.initiate(Amount::from_cents(100), ad) else {
            panic!("stub cannot fail");
        };
        let Ok(b) = gateway.initiate(Amount::from_cents(100), ad) else {
            panic!("stub cannot fail");
        };
        assert_ne!(a.payment_id, b.payment_id);
        assert!(a.payment_url.starts_with("https://pay.example/pay/"));
    }

    #[tokio::test]
    async fn take_is_single_shot() {
        let tracker = PendingPayments::new();
        tracker
            .insert(PendingPayment {
                payment_id: "pay-1".to_string(),
                ad_id: AdId::new(),
                amount: Amount::from_cents(1300),
                settlements: Vec::new(),
                created_at: Utc::now(),
            })
            .await;

        assert!(tracker.take("pay-1").await.is_ok());
        let second = tracker.take("pay-1").await;
        assert!(matches!(second, Err(MarketError::PaymentNotFound(_))));
        assert!(tracker.is_empty().await);
    }
}
