//! Market service: orchestrates the placement lifecycle and emits events.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::domain::ad::{Ad, AdSummary};
use crate::domain::category::Category;
use crate::domain::money::Amount;
use crate::domain::selection::WebsiteSelection;
use crate::domain::wallet::{TransactionKind, Wallet};
use crate::domain::{
    AdId, AdRegistry, CategoryCatalog, CategoryId, EventBus, MarketEvent, SelectionId, WalletId,
    WalletLedger, WebsiteId,
};
use crate::engine::allocation::{AllocationOutcome, CategoryQuote, allocate};
use crate::error::MarketError;
use crate::payment::{
    PaymentGateway, PaymentInitiation, PendingPayment, PendingPayments, PendingSettlement,
};

/// Result of a committed checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutCommit {
    /// The newly created pending selections, in request order.
    pub selections: Vec<WebsiteSelection>,
    /// The allocation that was applied.
    pub outcome: AllocationOutcome,
    /// Present when an out-of-pocket remainder went to the gateway.
    pub payment: Option<PaymentInitiation>,
}

/// Orchestration layer for all marketplace operations.
///
/// Stateless coordinator over the domain registries. Every mutation
/// method follows the pattern: acquire the per-ad lock → validate the
/// transition → settle money through the ledger → mutate state → emit
/// events → return.
///
/// Policy note: `available_for_reassignment` is cleared as soon as *any*
/// selection for the ad becomes active again, whether by publisher
/// approval or the auto-approval sweep.
#[derive(Debug)]
pub struct MarketService {
    registry: Arc<AdRegistry>,
    catalog: Arc<CategoryCatalog>,
    ledger: Arc<WalletLedger>,
    event_bus: EventBus,
    gateway: Arc<dyn PaymentGateway>,
    pending_payments: PendingPayments,
    auto_approve_grace: Duration,
    rejection_window: Duration,
}

impl MarketService {
    /// Creates a new `MarketService`.
    #[must_use]
    pub fn new(
        registry: Arc<AdRegistry>,
        catalog: Arc<CategoryCatalog>,
        ledger: Arc<WalletLedger>,
        event_bus: EventBus,
        gateway: Arc<dyn PaymentGateway>,
        auto_approve_grace: Duration,
        rejection_window: Duration,
    ) -> Self {
        Self {
            registry,
            catalog,
            ledger,
            event_bus,
            gateway,
            pending_payments: PendingPayments::new(),
            auto_approve_grace,
            rejection_window,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the ad registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<AdRegistry> {
        &self.registry
    }

    /// Returns a reference to the category catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<CategoryCatalog> {
        &self.catalog
    }

    /// Returns a reference to the wallet ledger.
    #[must_use]
    pub fn ledger(&self) -> &Arc<WalletLedger> {
        &self.ledger
    }

    // ── Wallets ─────────────────────────────────────────────────────────

    /// Opens a new empty wallet.
    pub async fn open_wallet(&self) -> WalletId {
        let wallet_id = self.ledger.open().await;
        tracing::info!(%wallet_id, "wallet opened");
        wallet_id
    }

    /// Snapshot of a wallet's counters and transaction log.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::WalletNotFound`] for an unknown wallet.
    pub async fn wallet_snapshot(&self, wallet_id: WalletId) -> Result<Wallet, MarketError> {
        self.ledger.snapshot(wallet_id).await
    }

    // ── Categories ──────────────────────────────────────────────────────

    /// Creates a publisher category (ad slot).
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::WalletNotFound`] for an unknown publisher
    /// wallet or [`MarketError::InvalidRequest`] for a zero slot limit.
    pub async fn create_category(
        &self,
        website_id: WebsiteId,
        publisher_wallet: WalletId,
        name: String,
        price: Amount,
        max_slots: u32,
    ) -> Result<CategoryId, MarketError> {
        if max_slots == 0 {
            return Err(MarketError::InvalidRequest(
                "max_slots must be at least 1".to_string(),
            ));
        }
        // Resolve once so a typo'd wallet fails here, not at refund time.
        let _ = self.ledger.get(publisher_wallet).await?;

        let category = Category::new(website_id, publisher_wallet, name, price, max_slots);
        let category_id = self.catalog.insert(category).await;
        tracing::info!(%category_id, %website_id, "category created");
        Ok(category_id)
    }

    // ── Ads ─────────────────────────────────────────────────────────────

    /// Creates an ad with its captured payment amount.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::WalletNotFound`] for an unknown advertiser
    /// wallet.
    pub async fn create_ad(
        &self,
        advertiser_wallet: WalletId,
        creative_url: String,
        payment_amount: Amount,
    ) -> Result<AdId, MarketError> {
        let _ = self.ledger.get(advertiser_wallet).await?;

        let ad = Ad::new(advertiser_wallet, creative_url, payment_amount);
        let ad_id = self.registry.insert(ad).await;

        let _ = self.event_bus.publish(MarketEvent::AdCreated {
            ad_id,
            advertiser_wallet,
            payment_amount,
            timestamp: Utc::now(),
        });

        tracing::info!(%ad_id, "ad created");
        Ok(ad_id)
    }

    /// Returns summaries of all ads.
    pub async fn list_ads(&self) -> Vec<AdSummary> {
        self.registry.list().await
    }

    /// Returns the ads currently offered for zero-cost reassignment.
    pub async fn list_available_ads(&self) -> Vec<AdSummary> {
        self.registry.list_available().await
    }

    /// Full detail of a single ad.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::AdNotFound`] for an unknown ad.
    pub async fn ad_detail(&self, ad_id: AdId) -> Result<Ad, MarketError> {
        let handle = self.registry.get(ad_id).await?;
        let ad = handle.read().await;
        Ok(ad.clone())
    }

    // ── Placement state machine ─────────────────────────────────────────

    /// Assigns an ad to a category, creating a pending placement.
    ///
    /// Capacity-guarded; no wallet transaction happens here.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::FullyBooked`] when the category has no free
    /// slot, [`MarketError::InvalidRequest`] when the category does not
    /// belong to the given website, or not-found errors for unknown ids.
    pub async fn assign(
        &self,
        ad_id: AdId,
        website_id: WebsiteId,
        category_id: CategoryId,
    ) -> Result<WebsiteSelection, MarketError> {
        self.assign_inner(ad_id, website_id, category_id, false).await
    }

    /// Zero-cost pickup of a rejected ad from the reassignment pool.
    ///
    /// # Errors
    ///
    /// Same as [`Self::assign`], plus [`MarketError::InvalidRequest`] when
    /// the ad is not offered for reassignment.
    pub async fn assign_from_pool(
        &self,
        ad_id: AdId,
        website_id: WebsiteId,
        category_id: CategoryId,
    ) -> Result<WebsiteSelection, MarketError> {
        self.assign_inner(ad_id, website_id, category_id, true).await
    }

    async fn assign_inner(
        &self,
        ad_id: AdId,
        website_id: WebsiteId,
        category_id: CategoryId,
        from_pool: bool,
    ) -> Result<WebsiteSelection, MarketError> {
        let quote = self.catalog.quote(category_id).await?;
        if quote.website_id != website_id {
            return Err(MarketError::InvalidRequest(format!(
                "category {category_id} does not belong to website {website_id}"
            )));
        }

        let handle = self.registry.get(ad_id).await?;
        let mut ad = handle.write().await;

        if from_pool && !ad.available_for_reassignment {
            return Err(MarketError::InvalidRequest(format!(
                "ad {ad_id} is not available for reassignment"
            )));
        }

        // Slot taken only after all validation; released again if the
        // caller's rejection ever fires.
        self.catalog.try_occupy(category_id).await?;

        let now = Utc::now();
        let selection = WebsiteSelection::new_pending(website_id, category_id, now);
        let selection_id = selection.selection_id;
        ad.selections.push(selection.clone());
        drop(ad);

        self.registry.index_selection(selection_id, ad_id).await;

        let _ = self.event_bus.publish(MarketEvent::PlacementAssigned {
            ad_id,
            selection_id,
            website_id,
            category_id,
            from_pool,
            timestamp: now,
        });

        tracing::info!(%ad_id, %selection_id, %category_id, from_pool, "placement assigned");
        Ok(selection)
    }

    /// Publisher approval: `pending → active`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidTransition`] unless the selection is
    /// pending, or not-found errors for unknown ids.
    pub async fn approve(&self, selection_id: SelectionId) -> Result<WebsiteSelection, MarketError> {
        let ad_id = self.registry.ad_for_selection(selection_id).await?;
        let handle = self.registry.get(ad_id).await?;
        let mut ad = handle.write().await;

        let now = Utc::now();
        let window = self.rejection_window;
        let approved = {
            let Some(selection) = ad.selection_mut(selection_id) else {
                return Err(MarketError::SelectionNotFound(selection_id));
            };
            selection.approve(now, window)?;
            selection.clone()
        };
        ad.available_for_reassignment = false;
        drop(ad);

        let _ = self.event_bus.publish(MarketEvent::PlacementApproved {
            ad_id,
            selection_id,
            auto: false,
            rejection_deadline: now + window,
            timestamp: now,
        });

        tracing::info!(%ad_id, %selection_id, "placement approved");
        Ok(approved)
    }

    /// Publisher rejection with refund settlement.
    ///
    /// Order of operations is load-bearing: the transition is validated
    /// and the publisher pre-flight balance checked before any money
    /// moves, and the selection is only flipped after both wallet legs
    /// succeeded. A failure at any point leaves the selection, both
    /// wallets, and the slot count exactly as they were.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidTransition`] /
    /// [`MarketError::RejectionWindowClosed`] for disallowed transitions,
    /// [`MarketError::InsufficientBalance`] when the publisher cannot
    /// cover the refund, or not-found errors for unknown ids.
    pub async fn reject(
        &self,
        selection_id: SelectionId,
        reason: String,
    ) -> Result<WebsiteSelection, MarketError> {
        let ad_id = self.registry.ad_for_selection(selection_id).await?;
        let handle = self.registry.get(ad_id).await?;
        let mut ad = handle.write().await;

        let now = Utc::now();
        let (category_id, refund_amount, advertiser_wallet) = {
            let Some(selection) = ad.selection(selection_id) else {
                return Err(MarketError::SelectionNotFound(selection_id));
            };
            selection.check_rejectable(now)?;
            (selection.category_id, ad.payment_amount, ad.advertiser_wallet)
        };
        let quote = self.catalog.quote(category_id).await?;
        let publisher_wallet = quote.publisher_wallet;

        // Pre-flight check for a clean user-facing error before any debit
        // is attempted.
        let publisher_balance = self.ledger.balance(publisher_wallet).await?;
        if publisher_balance < refund_amount {
            return Err(MarketError::InsufficientBalance {
                wallet_id: publisher_wallet,
                required: refund_amount,
                available: publisher_balance,
            });
        }

        // Resolve the advertiser wallet up front so the credit leg cannot
        // fail once the publisher has been debited.
        let advertiser_handle = self.ledger.get(advertiser_wallet).await?;

        // The debit is itself an atomic check-and-decrement; a concurrent
        // rejection that drained the wallet between pre-flight and here
        // surfaces as the same InsufficientBalance with no state change.
        self.ledger
            .debit(
                publisher_wallet,
                TransactionKind::RefundDebit,
                refund_amount,
                format!("refund for rejected placement {selection_id}"),
                Some(ad_id),
            )
            .await?;
        {
            let mut advertiser = advertiser_handle.write().await;
            let _ = advertiser.credit(
                TransactionKind::RefundCredit,
                refund_amount,
                format!("rejection refund for ad {ad_id}"),
                Some(ad_id),
            );
        }

        let rejected = {
            let Some(selection) = ad.selection_mut(selection_id) else {
                return Err(MarketError::SelectionNotFound(selection_id));
            };
            selection.reject(reason.clone(), now)?;
            selection.clone()
        };
        ad.available_for_reassignment = true;
        drop(ad);

        self.catalog.release(category_id).await?;

        let _ = self.event_bus.publish(MarketEvent::PlacementRejected {
            ad_id,
            selection_id,
            reason,
            refund_amount,
            publisher_wallet,
            advertiser_wallet,
            timestamp: now,
        });

        tracing::info!(%ad_id, %selection_id, %refund_amount, "placement rejected, refund settled");
        Ok(rejected)
    }

    /// Advertiser confirmation of an active placement. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidTransition`] unless the selection is
    /// active, or not-found errors for unknown ids.
    pub async fn confirm(&self, selection_id: SelectionId) -> Result<WebsiteSelection, MarketError> {
        let ad_id = self.registry.ad_for_selection(selection_id).await?;
        let handle = self.registry.get(ad_id).await?;
        let mut ad = handle.write().await;

        let now = Utc::now();
        let (confirmed, first_time) = {
            let Some(selection) = ad.selection_mut(selection_id) else {
                return Err(MarketError::SelectionNotFound(selection_id));
            };
            let was_confirmed = selection.confirmed;
            selection.confirm(now)?;
            (selection.clone(), !was_confirmed)
        };
        drop(ad);

        if first_time {
            let _ = self.event_bus.publish(MarketEvent::PlacementConfirmed {
                ad_id,
                selection_id,
                timestamp: now,
            });
        }
        Ok(confirmed)
    }

    /// Auto-approval sweep: flips every pending selection whose grace
    /// window has elapsed to active. Returns the number of approvals.
    ///
    /// Idempotent (already-active selections are skipped) and serialized
    /// against manual `reject` on the per-ad lock, so the two paths can
    /// never race on the same selection.
    pub async fn sweep_auto_approvals(&self) -> usize {
        let now = Utc::now();
        let window = self.rejection_window;
        let mut approvals = 0;

        for handle in self.registry.handles().await {
            let mut ad = handle.write().await;
            let ad_id = ad.ad_id;
            let mut flipped = Vec::new();
            for selection in &mut ad.selections {
                if selection.auto_approval_due(now, self.auto_approve_grace)
                    && selection.approve(now, window).is_ok()
                {
                    flipped.push(selection.selection_id);
                }
            }
            if !flipped.is_empty() {
                ad.available_for_reassignment = false;
            }
            drop(ad);

            for selection_id in flipped {
                approvals += 1;
                let _ = self.event_bus.publish(MarketEvent::PlacementApproved {
                    ad_id,
                    selection_id,
                    auto: true,
                    rejection_deadline: now + window,
                    timestamp: now,
                });
                tracing::info!(%ad_id, %selection_id, "placement auto-approved");
            }
        }
        approvals
    }

    // ── Checkout ────────────────────────────────────────────────────────

    /// Previews the refund allocation for a candidate category set.
    ///
    /// Pure read: nothing is reserved. The advertiser can call this
    /// repeatedly while toggling the selection; only
    /// [`Self::commit_checkout`] spends anything.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidRequest`] for an empty or duplicated
    /// selection, or not-found errors for unknown ids.
    pub async fn preview_checkout(
        &self,
        ad_id: AdId,
        category_ids: &[CategoryId],
    ) -> Result<AllocationOutcome, MarketError> {
        let advertiser_wallet = {
            let handle = self.registry.get(ad_id).await?;
            let ad = handle.read().await;
            ad.advertiser_wallet
        };
        let quotes = self.resolve_quotes(category_ids).await?;
        let credit = self.ledger.available_refund_credit(advertiser_wallet).await?;
        Ok(allocate(credit, &quotes))
    }

    /// Commits a checkout: re-checks capacity, consumes refund credit,
    /// initiates the external payment for the remainder, and creates the
    /// pending selections.
    ///
    /// Credit-covered selections are marked paid immediately and their
    /// publishers credited; gateway-paid selections stay unpaid until
    /// [`Self::confirm_payment`].
    ///
    /// # Errors
    ///
    /// - [`MarketError::FullyBooked`] listing every category that lost its
    ///   last slot since the preview; nothing is spent or created.
    /// - [`MarketError::InsufficientBalance`] when a concurrent commit
    ///   consumed the credit pool first; slots are released again.
    /// - [`MarketError::AllocationMismatch`] on an internal invariant
    ///   violation (never reachable through valid inputs).
    /// - [`MarketError::GatewayUnavailable`] when payment initiation
    ///   fails; slots are released and consumed credit returned.
    pub async fn commit_checkout(
        &self,
        ad_id: AdId,
        category_ids: &[CategoryId],
    ) -> Result<CheckoutCommit, MarketError> {
        let handle = self.registry.get(ad_id).await?;
        let mut ad = handle.write().await;
        let advertiser_wallet = ad.advertiser_wallet;

        let quotes = self.resolve_quotes(category_ids).await?;
        let infos = {
            let mut infos = Vec::with_capacity(category_ids.len());
            for &category_id in category_ids {
                infos.push(self.catalog.quote(category_id).await?);
            }
            infos
        };

        let available = self.ledger.available_refund_credit(advertiser_wallet).await?;
        let outcome = allocate(available, &quotes);

        // Never clamp: an allocation spending more than the pool is a bug
        // and must surface, not be silently corrected.
        if outcome.total_applied > available {
            return Err(MarketError::AllocationMismatch {
                applied: outcome.total_applied,
                available,
            });
        }

        // Capacity re-check: time has passed since the preview. Attempt
        // every category so the caller learns the full blocked set.
        let mut occupied = Vec::with_capacity(category_ids.len());
        let mut blocked = Vec::new();
        for &category_id in category_ids {
            match self.catalog.try_occupy(category_id).await {
                Ok(()) => occupied.push(category_id),
                Err(MarketError::FullyBooked(_)) => blocked.push(category_id),
                Err(other) => {
                    self.release_all(&occupied).await;
                    return Err(other);
                }
            }
        }
        if !blocked.is_empty() {
            self.release_all(&occupied).await;
            return Err(MarketError::FullyBooked(blocked));
        }

        // Credit consumption is the serialization point between
        // concurrent commits for the same advertiser.
        if !outcome.total_applied.is_zero() {
            let consumed = self
                .ledger
                .consume_refund_credit(
                    advertiser_wallet,
                    outcome.total_applied,
                    format!("refund credit applied at checkout for ad {ad_id}"),
                    Some(ad_id),
                )
                .await;
            if let Err(err) = consumed {
                self.release_all(&occupied).await;
                return Err(err);
            }
        }

        let payment = if outcome.total_owed.is_zero() {
            None
        } else {
            match self.gateway.initiate(outcome.total_owed, ad_id) {
                Ok(initiation) => Some(initiation),
                Err(err) => {
                    self.release_all(&occupied).await;
                    if !outcome.total_applied.is_zero() {
                        // Return the consumed credit with a compensating
                        // entry; the log stays append-only and nets zero.
                        let _ = self
                            .ledger
                            .credit(
                                advertiser_wallet,
                                TransactionKind::RefundCredit,
                                outcome.total_applied,
                                format!("checkout rolled back for ad {ad_id}: payment initiation failed"),
                                Some(ad_id),
                            )
                            .await;
                    }
                    return Err(err);
                }
            }
        };

        let now = Utc::now();
        let mut selections = Vec::with_capacity(infos.len());
        let mut settlements = Vec::new();
        for (info, alloc) in infos.iter().zip(&outcome.per_category) {
            let mut selection =
                WebsiteSelection::new_pending(info.website_id, info.category_id, now);
            if alloc.owed.is_zero() {
                selection.paid = true;
                // Fully credit-covered: the publisher earns right away.
                let _ = self
                    .ledger
                    .credit(
                        info.publisher_wallet,
                        TransactionKind::Credit,
                        info.price,
                        format!("placement payment for ad {ad_id}"),
                        Some(ad_id),
                    )
                    .await;
            } else {
                settlements.push(PendingSettlement {
                    selection_id: selection.selection_id,
                    category_id: info.category_id,
                    publisher_wallet: info.publisher_wallet,
                    price: info.price,
                });
            }
            selections.push(selection);
        }

        for selection in &selections {
            ad.selections.push(selection.clone());
        }
        drop(ad);

        for selection in &selections {
            self.registry
                .index_selection(selection.selection_id, ad_id)
                .await;
            let _ = self.event_bus.publish(MarketEvent::PlacementAssigned {
                ad_id,
                selection_id: selection.selection_id,
                website_id: selection.website_id,
                category_id: selection.category_id,
                from_pool: false,
                timestamp: now,
            });
        }

        if !outcome.total_applied.is_zero() {
            let _ = self.event_bus.publish(MarketEvent::CreditConsumed {
                ad_id,
                advertiser_wallet,
                amount: outcome.total_applied,
                timestamp: now,
            });
        }

        if let Some(initiation) = &payment {
            self.pending_payments
                .insert(PendingPayment {
                    payment_id: initiation.payment_id.clone(),
                    ad_id,
                    amount: outcome.total_owed,
                    settlements,
                    created_at: now,
                })
                .await;
            let _ = self.event_bus.publish(MarketEvent::PaymentRequested {
                ad_id,
                payment_id: initiation.payment_id.clone(),
                amount: outcome.total_owed,
                timestamp: now,
            });
        }

        tracing::info!(
            %ad_id,
            applied = %outcome.total_applied,
            owed = %outcome.total_owed,
            fully_covered = outcome.is_fully_covered,
            "checkout committed"
        );
        Ok(CheckoutCommit {
            selections,
            outcome,
            payment,
        })
    }

    /// Gateway confirmation callback: marks the payment's selections paid
    /// and credits their publishers.
    ///
    /// A selection rejected between commit and the callback already had
    /// its refund settled, so it is neither marked paid nor credited.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::PaymentNotFound`] for an unknown or
    /// already-confirmed payment reference.
    pub async fn confirm_payment(&self, payment_id: &str) -> Result<AdId, MarketError> {
        let payment = self.pending_payments.take(payment_id).await?;
        let handle = self.registry.get(payment.ad_id).await?;
        let mut ad = handle.write().await;

        let mut payable = Vec::with_capacity(payment.settlements.len());
        for settlement in &payment.settlements {
            if let Some(selection) = ad.selection_mut(settlement.selection_id)
                && !selection.is_rejected()
            {
                selection.paid = true;
                payable.push(settlement);
            }
        }
        drop(ad);

        for settlement in payable {
            let _ = self
                .ledger
                .credit(
                    settlement.publisher_wallet,
                    TransactionKind::Credit,
                    settlement.price,
                    format!("placement payment for ad {}", payment.ad_id),
                    Some(payment.ad_id),
                )
                .await;
        }

        let _ = self.event_bus.publish(MarketEvent::PaymentConfirmed {
            ad_id: payment.ad_id,
            payment_id: payment.payment_id.clone(),
            timestamp: Utc::now(),
        });

        tracing::info!(ad_id = %payment.ad_id, payment_id, "payment confirmed");
        Ok(payment.ad_id)
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    async fn resolve_quotes(
        &self,
        category_ids: &[CategoryId],
    ) -> Result<Vec<CategoryQuote>, MarketError> {
        if category_ids.is_empty() {
            return Err(MarketError::InvalidRequest(
                "at least one category is required".to_string(),
            ));
        }
        let mut seen = HashSet::with_capacity(category_ids.len());
        let mut quotes = Vec::with_capacity(category_ids.len());
        for &category_id in category_ids {
            if !seen.insert(category_id) {
                return Err(MarketError::InvalidRequest(format!(
                    "category {category_id} listed more than once"
                )));
            }
            let info = self.catalog.quote(category_id).await?;
            quotes.push(CategoryQuote {
                category_id,
                price: info.price,
            });
        }
        Ok(quotes)
    }

    async fn release_all(&self, category_ids: &[CategoryId]) {
        for &category_id in category_ids {
            let _ = self.catalog.release(category_id).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::payment::UrlStubGateway;

    #[derive(Debug)]
    struct FailingGateway;

    impl PaymentGateway for FailingGateway {
        fn initiate(&self, _amount: Amount, _ad_id: AdId) -> Result<PaymentInitiation, MarketError> {
            Err(MarketError::GatewayUnavailable(
                "gateway refused the connection".to_string(),
            ))
        }
    }

    fn make_service_with(
        gateway: Arc<dyn PaymentGateway>,
        grace: Duration,
        window: Duration,
    ) -> MarketService {
        MarketService::new(
            Arc::new(AdRegistry::new()),
            Arc::new(CategoryCatalog::new()),
            Arc::new(WalletLedger::new()),
            EventBus::new(1000),
            gateway,
            grace,
            window,
        )
    }

    fn make_service() -> MarketService {
        make_service_with(
            Arc::new(UrlStubGateway::new("http://localhost:9000")),
            Duration::seconds(120),
            Duration::seconds(3600),
        )
    }

    async fn funded_wallet(service: &MarketService, cents: u64) -> WalletId {
        let wallet_id = service.open_wallet().await;
        if cents > 0 {
            let Ok(_) = service
                .ledger
                .credit(
                    wallet_id,
                    TransactionKind::Credit,
                    Amount::from_cents(cents),
                    "seed".to_string(),
                    None,
                )
                .await
            else {
                panic!("seed credit");
            };
        }
        wallet_id
    }

    async fn seeded_category(
        service: &MarketService,
        website_id: WebsiteId,
        publisher_wallet: WalletId,
        price_cents: u64,
        max_slots: u32,
    ) -> CategoryId {
        let Ok(category_id) = service
            .create_category(
                website_id,
                publisher_wallet,
                "sidebar".to_string(),
                Amount::from_cents(price_cents),
                max_slots,
            )
            .await
        else {
            panic!("category created");
        };
        category_id
    }

    async fn seeded_ad(service: &MarketService, wallet: WalletId, payment_cents: u64) -> AdId {
        let Ok(ad_id) = service
            .create_ad(
                wallet,
                "https://cdn.example.com/banner.png".to_string(),
                Amount::from_cents(payment_cents),
            )
            .await
        else {
            panic!("ad created");
        };
        ad_id
    }

    #[tokio::test]
    async fn assign_creates_pending_selection_and_occupies_slot() {
        let service = make_service();
        let publisher = funded_wallet(&service, 0).await;
        let advertiser = funded_wallet(&service, 0).await;
        let website = WebsiteId::new();
        let category = seeded_category(&service, website, publisher, 5_000, 2).await;
        let ad_id = seeded_ad(&service, advertiser, 5_000).await;

        let mut rx = service.event_bus().subscribe();
        let Ok(selection) = service.assign(ad_id, website, category).await else {
            panic!("assign succeeds");
        };
        assert!(selection.is_pending());
        assert!(!selection.paid);

        let Ok(event) = rx.recv().await else {
            panic!("event published");
        };
        assert_eq!(event.event_type_str(), "placement_assigned");

        let Ok(info) = service.catalog.quote(category).await else {
            panic!("category exists");
        };
        assert_eq!(info.price, Amount::from_cents(5_000));
        let Ok(fully_booked) = service.catalog.is_fully_booked(category).await else {
            panic!("category exists");
        };
        assert!(!fully_booked);
    }

    #[tokio::test]
    async fn assign_to_full_category_is_refused() {
        let service = make_service();
        let publisher = funded_wallet(&service, 0).await;
        let advertiser = funded_wallet(&service, 0).await;
        let website = WebsiteId::new();
        let category = seeded_category(&service, website, publisher, 5_000, 1).await;
        let ad_a = seeded_ad(&service, advertiser, 5_000).await;
        let ad_b = seeded_ad(&service, advertiser, 5_000).await;

        assert!(service.assign(ad_a, website, category).await.is_ok());
        let result = service.assign(ad_b, website, category).await;
        assert!(matches!(result, Err(MarketError::FullyBooked(ids)) if ids == vec![category]));
    }

    #[tokio::test]
    async fn assign_rejects_website_category_mismatch() {
        let service = make_service();
        let publisher = funded_wallet(&service, 0).await;
        let advertiser = funded_wallet(&service, 0).await;
        let category = seeded_category(&service, WebsiteId::new(), publisher, 5_000, 1).await;
        let ad_id = seeded_ad(&service, advertiser, 5_000).await;

        let result = service.assign(ad_id, WebsiteId::new(), category).await;
        assert!(matches!(result, Err(MarketError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn approve_activates_and_sets_deadline() {
        let service = make_service();
        let publisher = funded_wallet(&service, 0).await;
        let advertiser = funded_wallet(&service, 0).await;
        let website = WebsiteId::new();
        let category = seeded_category(&service, website, publisher, 5_000, 1).await;
        let ad_id = seeded_ad(&service, advertiser, 5_000).await;

        let Ok(selection) = service.assign(ad_id, website, category).await else {
            panic!("assign succeeds");
        };
        let Ok(approved) = service.approve(selection.selection_id).await else {
            panic!("approve succeeds");
        };
        assert!(approved.is_active());
        let remaining = approved.rejection_time_remaining(Utc::now());
        let Some(remaining) = remaining else {
            panic!("active selection has a countdown");
        };
        assert!(remaining > Duration::seconds(3590));

        // Second approval is an invalid transition.
        let again = service.approve(selection.selection_id).await;
        assert!(matches!(again, Err(MarketError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn reject_settles_refund_and_frees_slot() {
        let service = make_service();
        let publisher = funded_wallet(&service, 10_000).await;
        let advertiser = funded_wallet(&service, 0).await;
        let website = WebsiteId::new();
        let category = seeded_category(&service, website, publisher, 5_000, 1).await;
        let ad_id = seeded_ad(&service, advertiser, 5_000).await;

        let Ok(selection) = service.assign(ad_id, website, category).await else {
            panic!("assign succeeds");
        };
        let Ok(_) = service.approve(selection.selection_id).await else {
            panic!("approve succeeds");
        };
        let Ok(rejected) = service
            .reject(selection.selection_id, "off-brand creative".to_string())
            .await
        else {
            panic!("reject succeeds");
        };
        assert!(rejected.is_rejected());

        let Ok(publisher_balance) = service.ledger.balance(publisher).await else {
            panic!("publisher wallet");
        };
        assert_eq!(publisher_balance, Amount::from_cents(5_000));

        let Ok(credit) = service.ledger.available_refund_credit(advertiser).await else {
            panic!("advertiser wallet");
        };
        assert_eq!(credit, Amount::from_cents(5_000));

        // Slot freed, ad back in the pool.
        let Ok(fully_booked) = service.catalog.is_fully_booked(category).await else {
            panic!("category exists");
        };
        assert!(!fully_booked);
        let available = service.list_available_ads().await;
        assert_eq!(available.len(), 1);
    }

    #[tokio::test]
    async fn reject_with_broke_publisher_changes_nothing() {
        let service = make_service();
        // Publisher holds $30, refund would be $50.
        let publisher = funded_wallet(&service, 3_000).await;
        let advertiser = funded_wallet(&service, 0).await;
        let website = WebsiteId::new();
        let category = seeded_category(&service, website, publisher, 5_000, 1).await;
        let ad_id = seeded_ad(&service, advertiser, 5_000).await;

        let Ok(selection) = service.assign(ad_id, website, category).await else {
            panic!("assign succeeds");
        };
        let Ok(_) = service.approve(selection.selection_id).await else {
            panic!("approve succeeds");
        };

        let result = service
            .reject(selection.selection_id, "no budget".to_string())
            .await;
        assert!(matches!(
            result,
            Err(MarketError::InsufficientBalance { required, available, .. })
                if required == Amount::from_cents(5_000) && available == Amount::from_cents(3_000)
        ));

        // Selection still active, no transaction recorded on either side,
        // slot still occupied.
        let Ok(ad) = service.ad_detail(ad_id).await else {
            panic!("ad exists");
        };
        let Some(selection) = ad.selection(selection.selection_id) else {
            panic!("selection exists");
        };
        assert!(selection.is_active());
        assert!(!ad.available_for_reassignment);

        let Ok(publisher_snapshot) = service.wallet_snapshot(publisher).await else {
            panic!("publisher wallet");
        };
        assert_eq!(publisher_snapshot.transactions().len(), 1);
        let Ok(advertiser_snapshot) = service.wallet_snapshot(advertiser).await else {
            panic!("advertiser wallet");
        };
        assert!(advertiser_snapshot.transactions().is_empty());

        let Ok(fully_booked) = service.catalog.is_fully_booked(category).await else {
            panic!("category exists");
        };
        assert!(fully_booked);
    }

    #[tokio::test]
    async fn reject_after_window_close_is_refused() {
        let service = make_service_with(
            Arc::new(UrlStubGateway::new("http://localhost:9000")),
            Duration::seconds(120),
            Duration::zero(),
        );
        let publisher = funded_wallet(&service, 10_000).await;
        let advertiser = funded_wallet(&service, 0).await;
        let website = WebsiteId::new();
        let category = seeded_category(&service, website, publisher, 5_000, 1).await;
        let ad_id = seeded_ad(&service, advertiser, 5_000).await;

        let Ok(selection) = service.assign(ad_id, website, category).await else {
            panic!("assign succeeds");
        };
        let Ok(_) = service.approve(selection.selection_id).await else {
            panic!("approve succeeds");
        };

        let result = service
            .reject(selection.selection_id, "too late".to_string())
            .await;
        assert!(matches!(result, Err(MarketError::RejectionWindowClosed(_))));
    }

    #[tokio::test]
    async fn confirm_is_idempotent_and_emits_once() {
        let service = make_service();
        let publisher = funded_wallet(&service, 0).await;
        let advertiser = funded_wallet(&service, 0).await;
        let website = WebsiteId::new();
        let category = seeded_category(&service, website, publisher, 5_000, 1).await;
        let ad_id = seeded_ad(&service, advertiser, 5_000).await;

        let Ok(selection) = service.assign(ad_id, website, category).await else {
            panic!("assign succeeds");
        };
        // Confirming a pending selection is refused.
        let early = service.confirm(selection.selection_id).await;
        assert!(matches!(early, Err(MarketError::InvalidTransition { .. })));

        let Ok(_) = service.approve(selection.selection_id).await else {
            panic!("approve succeeds");
        };

        let mut rx = service.event_bus().subscribe();
        let Ok(first) = service.confirm(selection.selection_id).await else {
            panic!("confirm succeeds");
        };
        assert!(first.confirmed);
        let Ok(second) = service.confirm(selection.selection_id).await else {
            panic!("repeat confirm succeeds");
        };
        assert_eq!(second.confirmed_at, first.confirmed_at);

        let Ok(event) = rx.recv().await else {
            panic!("event published");
        };
        assert_eq!(event.event_type_str(), "placement_confirmed");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn sweep_auto_approves_stale_pending_selections() {
        let service = make_service_with(
            Arc::new(UrlStubGateway::new("http://localhost:9000")),
            Duration::zero(),
            Duration::seconds(3600),
        );
        let publisher = funded_wallet(&service, 0).await;
        let advertiser = funded_wallet(&service, 0).await;
        let website = WebsiteId::new();
        let category = seeded_category(&service, website, publisher, 5_000, 2).await;
        let ad_id = seeded_ad(&service, advertiser, 5_000).await;

        let Ok(selection) = service.assign(ad_id, website, category).await else {
            panic!("assign succeeds");
        };

        assert_eq!(service.sweep_auto_approvals().await, 1);
        let Ok(ad) = service.ad_detail(ad_id).await else {
            panic!("ad exists");
        };
        let Some(swept) = ad.selection(selection.selection_id) else {
            panic!("selection exists");
        };
        assert!(swept.is_active());

        // Second run finds nothing pending.
        assert_eq!(service.sweep_auto_approvals().await, 0);
    }

    #[tokio::test]
    async fn pool_pickup_requires_flag_and_approval_clears_it() {
        let service = make_service();
        let publisher = funded_wallet(&service, 10_000).await;
        let second_publisher = funded_wallet(&service, 0).await;
        let advertiser = funded_wallet(&service, 0).await;
        let website = WebsiteId::new();
        let second_website = WebsiteId::new();
        let category = seeded_category(&service, website, publisher, 5_000, 1).await;
        let second_category =
            seeded_category(&service, second_website, second_publisher, 4_000, 1).await;
        let ad_id = seeded_ad(&service, advertiser, 5_000).await;

        // Not in the pool yet.
        let early = service
            .assign_from_pool(ad_id, second_website, second_category)
            .await;
        assert!(matches!(early, Err(MarketError::InvalidRequest(_))));

        let Ok(selection) = service.assign(ad_id, website, category).await else {
            panic!("assign succeeds");
        };
        let Ok(_) = service.approve(selection.selection_id).await else {
            panic!("approve succeeds");
        };
        let Ok(_) = service
            .reject(selection.selection_id, "poor fit".to_string())
            .await
        else {
            panic!("reject succeeds");
        };

        // Zero-cost pickup, then approval pulls the ad out of the pool.
        let Ok(pickup) = service
            .assign_from_pool(ad_id, second_website, second_category)
            .await
        else {
            panic!("pool pickup succeeds");
        };
        assert!(service.list_available_ads().await.len() == 1);
        let Ok(_) = service.approve(pickup.selection_id).await else {
            panic!("approve succeeds");
        };
        assert!(service.list_available_ads().await.is_empty());

        // No new wallet legs for the pickup itself.
        let Ok(second_snapshot) = service.wallet_snapshot(second_publisher).await else {
            panic!("publisher wallet");
        };
        assert!(second_snapshot.transactions().is_empty());
    }

    #[tokio::test]
    async fn preview_matches_greedy_allocation_and_mutates_nothing() {
        let service = make_service();
        let publisher = funded_wallet(&service, 0).await;
        let advertiser = funded_wallet(&service, 0).await;
        let Ok(_) = service
            .ledger
            .credit(
                advertiser,
                TransactionKind::RefundCredit,
                Amount::from_cents(1_000),
                "refund".to_string(),
                None,
            )
            .await
        else {
            panic!("seed refund credit");
        };
        let website = WebsiteId::new();
        let cheap = seeded_category(&service, website, publisher, 400, 1).await;
        let middle = seeded_category(&service, website, publisher, 700, 1).await;
        let dear = seeded_category(&service, website, publisher, 1_200, 1).await;
        let ad_id = seeded_ad(&service, advertiser, 1_000).await;

        let Ok(outcome) = service.preview_checkout(ad_id, &[cheap, middle, dear]).await else {
            panic!("preview succeeds");
        };
        assert_eq!(outcome.total_applied, Amount::from_cents(1_000));
        assert_eq!(outcome.total_owed, Amount::from_cents(1_300));
        assert!(!outcome.is_fully_covered);

        // Nothing reserved, nothing spent.
        let Ok(credit) = service.ledger.available_refund_credit(advertiser).await else {
            panic!("advertiser wallet");
        };
        assert_eq!(credit, Amount::from_cents(1_000));
        let Ok(fully_booked) = service.catalog.is_fully_booked(cheap).await else {
            panic!("category exists");
        };
        assert!(!fully_booked);
    }

    #[tokio::test]
    async fn commit_fully_covered_pays_publishers_immediately() {
        let service = make_service();
        let publisher = funded_wallet(&service, 0).await;
        let advertiser = funded_wallet(&service, 0).await;
        let Ok(_) = service
            .ledger
            .credit(
                advertiser,
                TransactionKind::RefundCredit,
                Amount::from_cents(2_000),
                "refund".to_string(),
                None,
            )
            .await
        else {
            panic!("seed refund credit");
        };
        let website = WebsiteId::new();
        let cheap = seeded_category(&service, website, publisher, 400, 1).await;
        let middle = seeded_category(&service, website, publisher, 700, 1).await;
        let ad_id = seeded_ad(&service, advertiser, 1_100).await;

        let Ok(commit) = service.commit_checkout(ad_id, &[cheap, middle]).await else {
            panic!("commit succeeds");
        };
        assert!(commit.outcome.is_fully_covered);
        assert!(commit.payment.is_none());
        assert_eq!(commit.selections.len(), 2);
        assert!(commit.selections.iter().all(|s| s.paid && s.is_pending()));

        let Ok(credit) = service.ledger.available_refund_credit(advertiser).await else {
            panic!("advertiser wallet");
        };
        assert_eq!(credit, Amount::from_cents(900));

        // Both slots now taken, publishers credited up front.
        let Ok(publisher_balance) = service.ledger.balance(publisher).await else {
            panic!("publisher wallet");
        };
        assert_eq!(publisher_balance, Amount::from_cents(1_100));
        let Ok(fully_booked) = service.catalog.is_fully_booked(cheap).await else {
            panic!("category exists");
        };
        assert!(fully_booked);
    }

    #[tokio::test]
    async fn commit_with_remainder_goes_through_the_gateway() {
        let service = make_service();
        let publisher = funded_wallet(&service, 0).await;
        let advertiser = funded_wallet(&service, 0).await;
        let Ok(_) = service
            .ledger
            .credit(
                advertiser,
                TransactionKind::RefundCredit,
                Amount::from_cents(500),
                "refund".to_string(),
                None,
            )
            .await
        else {
            panic!("seed refund credit");
        };
        let website = WebsiteId::new();
        let cheap = seeded_category(&service, website, publisher, 400, 1).await;
        let dear = seeded_category(&service, website, publisher, 1_200, 1).await;
        let ad_id = seeded_ad(&service, advertiser, 1_600).await;

        let Ok(commit) = service.commit_checkout(ad_id, &[cheap, dear]).await else {
            panic!("commit succeeds");
        };
        let Some(payment) = commit.payment.clone() else {
            panic!("gateway payment initiated");
        };
        assert_eq!(commit.outcome.total_owed, Amount::from_cents(1_100));

        // Cheap category was fully covered and paid; the dear one waits
        // for the gateway.
        let paid: Vec<bool> = commit.selections.iter().map(|s| s.paid).collect();
        assert_eq!(paid, vec![true, false]);
        let Ok(balance_before) = service.ledger.balance(publisher).await else {
            panic!("publisher wallet");
        };
        assert_eq!(balance_before, Amount::from_cents(400));

        let Ok(confirmed_ad) = service.confirm_payment(&payment.payment_id).await else {
            panic!("payment confirm succeeds");
        };
        assert_eq!(confirmed_ad, ad_id);

        let Ok(ad) = service.ad_detail(ad_id).await else {
            panic!("ad exists");
        };
        assert!(ad.selections.iter().all(|s| s.paid));
        let Ok(balance_after) = service.ledger.balance(publisher).await else {
            panic!("publisher wallet");
        };
        assert_eq!(balance_after, Amount::from_cents(1_600));

        // The payment reference is single-shot.
        let replay = service.confirm_payment(&payment.payment_id).await;
        assert!(matches!(replay, Err(MarketError::PaymentNotFound(_))));
    }

    #[tokio::test]
    async fn confirm_payment_skips_selections_rejected_in_flight() {
        let service = make_service();
        let publisher = funded_wallet(&service, 1_200).await;
        let advertiser = funded_wallet(&service, 0).await;
        let website = WebsiteId::new();
        let category = seeded_category(&service, website, publisher, 1_200, 1).await;
        let ad_id = seeded_ad(&service, advertiser, 1_200).await;

        // No refund credit, so the whole price goes through the gateway.
        let Ok(commit) = service.commit_checkout(ad_id, &[category]).await else {
            panic!("commit succeeds");
        };
        let Some(payment) = commit.payment.clone() else {
            panic!("gateway payment initiated");
        };
        let Some(selection) = commit.selections.first() else {
            panic!("selection created");
        };

        // Publisher rejects before the gateway callback lands. The refund
        // settles: publisher debited, advertiser holds the credit.
        let Ok(_) = service
            .reject(selection.selection_id, "withdrawn".to_string())
            .await
        else {
            panic!("reject succeeds");
        };

        let Ok(confirmed_ad) = service.confirm_payment(&payment.payment_id).await else {
            panic!("payment confirm succeeds");
        };
        assert_eq!(confirmed_ad, ad_id);

        // The rejected selection stays rejected and unpaid, and the
        // publisher is not credited the price on top of the refund debit.
        let Ok(ad) = service.ad_detail(ad_id).await else {
            panic!("ad exists");
        };
        let Some(selection) = ad.selection(selection.selection_id) else {
            panic!("selection exists");
        };
        assert!(selection.is_rejected());
        assert!(!selection.paid);

        let Ok(publisher_balance) = service.ledger.balance(publisher).await else {
            panic!("publisher wallet");
        };
        assert_eq!(publisher_balance, Amount::ZERO);
        let Ok(credit) = service.ledger.available_refund_credit(advertiser).await else {
            panic!("advertiser wallet");
        };
        assert_eq!(credit, Amount::from_cents(1_200));
    }

    #[tokio::test]
    async fn commit_reports_every_category_that_filled_up() {
        let service = make_service();
        let publisher = funded_wallet(&service, 0).await;
        let advertiser = funded_wallet(&service, 0).await;
        let rival = funded_wallet(&service, 0).await;
        let Ok(_) = service
            .ledger
            .credit(
                advertiser,
                TransactionKind::RefundCredit,
                Amount::from_cents(2_000),
                "refund".to_string(),
                None,
            )
            .await
        else {
            panic!("seed refund credit");
        };
        let website = WebsiteId::new();
        let open = seeded_category(&service, website, publisher, 400, 2).await;
        let contested = seeded_category(&service, website, publisher, 700, 1).await;
        let ad_id = seeded_ad(&service, advertiser, 1_100).await;
        let rival_ad = seeded_ad(&service, rival, 700).await;

        // A rival takes the contested category's last slot between
        // preview and commit.
        let Ok(_) = service.assign(rival_ad, website, contested).await else {
            panic!("rival assign succeeds");
        };

        let result = service.commit_checkout(ad_id, &[open, contested]).await;
        assert!(matches!(result, Err(MarketError::FullyBooked(ids)) if ids == vec![contested]));

        // Nothing consumed, the open category's trial slot was released.
        let Ok(credit) = service.ledger.available_refund_credit(advertiser).await else {
            panic!("advertiser wallet");
        };
        assert_eq!(credit, Amount::from_cents(2_000));
        let Ok(ad) = service.ad_detail(ad_id).await else {
            panic!("ad exists");
        };
        assert!(ad.selections.is_empty());
        let Ok(info) = service.catalog.quote(open).await else {
            panic!("category exists");
        };
        assert_eq!(info.price, Amount::from_cents(400));
        let Ok(fully_booked) = service.catalog.is_fully_booked(open).await else {
            panic!("category exists");
        };
        assert!(!fully_booked);
    }

    #[tokio::test]
    async fn gateway_failure_rolls_back_slots_and_credit() {
        let service = make_service_with(
            Arc::new(FailingGateway),
            Duration::seconds(120),
            Duration::seconds(3600),
        );
        let publisher = funded_wallet(&service, 0).await;
        let advertiser = funded_wallet(&service, 0).await;
        let Ok(_) = service
            .ledger
            .credit(
                advertiser,
                TransactionKind::RefundCredit,
                Amount::from_cents(500),
                "refund".to_string(),
                None,
            )
            .await
        else {
            panic!("seed refund credit");
        };
        let website = WebsiteId::new();
        let category = seeded_category(&service, website, publisher, 1_200, 1).await;
        let ad_id = seeded_ad(&service, advertiser, 1_200).await;

        let result = service.commit_checkout(ad_id, &[category]).await;
        assert!(matches!(result, Err(MarketError::GatewayUnavailable(_))));

        // Credit restored by a compensating entry, slot released, no
        // selections created.
        let Ok(credit) = service.ledger.available_refund_credit(advertiser).await else {
            panic!("advertiser wallet");
        };
        assert_eq!(credit, Amount::from_cents(500));
        let Ok(fully_booked) = service.catalog.is_fully_booked(category).await else {
            panic!("category exists");
        };
        assert!(!fully_booked);
        let Ok(ad) = service.ad_detail(ad_id).await else {
            panic!("ad exists");
        };
        assert!(ad.selections.is_empty());
    }

    #[tokio::test]
    async fn duplicate_categories_are_refused() {
        let service = make_service();
        let publisher = funded_wallet(&service, 0).await;
        let advertiser = funded_wallet(&service, 0).await;
        let website = WebsiteId::new();
        let category = seeded_category(&service, website, publisher, 400, 2).await;
        let ad_id = seeded_ad(&service, advertiser, 800).await;

        let result = service.preview_checkout(ad_id, &[category, category]).await;
        assert!(matches!(result, Err(MarketError::InvalidRequest(_))));
        let empty = service.preview_checkout(ad_id, &[]).await;
        assert!(matches!(empty, Err(MarketError::InvalidRequest(_))));
    }
}
