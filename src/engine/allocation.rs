//! Refund credit allocation across candidate categories.
//!
//! Given an advertiser's spendable refund credit and a set of selected
//! categories, [`allocate`] computes how much credit applies to each and
//! the resulting out-of-pocket amount.
//!
//! The greedy order is price-*ascending* on purpose: a limited credit
//! pool then fully covers as many categories as possible, instead of
//! chipping away at the single most expensive one. Swapping the sort
//! order would change which categories appear "free" to the advertiser,
//! so the ascending policy is part of the contract, not an accident.
//! Ties keep the caller's original order (stable sort).
//!
//! [`allocate`] is a pure function: the advertiser can toggle categories
//! and re-preview indefinitely; nothing is reserved until checkout
//! commits.

use serde::Serialize;

use crate::domain::money::Amount;
use crate::domain::CategoryId;

/// One category as priced at preview time.
#[derive(Debug, Clone, Copy)]
pub struct CategoryQuote {
    /// Category identifier.
    pub category_id: CategoryId,
    /// Price per placement.
    pub price: Amount,
}

/// Credit application for a single category.
#[derive(Debug, Clone, Copy, Serialize, utoipa::ToSchema)]
pub struct CategoryAllocation {
    /// Category identifier.
    pub category_id: CategoryId,
    /// Price of the category.
    pub price: Amount,
    /// Refund credit applied to this category.
    pub applied: Amount,
    /// Remaining out-of-pocket amount (`price − applied`).
    pub owed: Amount,
}

/// Result of distributing a credit pool over a category selection.
///
/// Conservation invariants (asserted by tests):
/// `total_applied ≤ total credit` and
/// `total_applied + total_owed == total_original`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct AllocationOutcome {
    /// Per-category application, in the caller's original order.
    pub per_category: Vec<CategoryAllocation>,
    /// Sum of all category prices.
    pub total_original: Amount,
    /// Credit applied across all categories.
    pub total_applied: Amount,
    /// Out-of-pocket remainder across all categories.
    pub total_owed: Amount,
    /// `total_owed == 0` with at least some credit applied.
    pub is_fully_covered: bool,
    /// `total_applied / total_original`; `0.0` for an empty selection.
    pub refund_efficiency: f64,
}

/// Distributes `total_credit` over `quotes`, cheapest category first.
///
/// Deterministic and side-effect free: identical inputs always yield an
/// identical outcome. The returned `per_category` vector preserves the
/// input order regardless of the internal price sort.
#[must_use]
pub fn allocate(total_credit: Amount, quotes: &[CategoryQuote]) -> AllocationOutcome {
    // Sort indices by price ascending; stable, so equal prices keep the
    // caller's order.
    let mut order: Vec<usize> = (0..quotes.len()).collect();
    order.sort_by_key(|&i| quotes.get(i).map_or(Amount::ZERO, |q| q.price));

    let mut applied_by_index = vec![Amount::ZERO; quotes.len()];
    let mut remaining = total_credit;
    for &i in &order {
        let Some(quote) = quotes.get(i) else {
            continue;
        };
        let applied = remaining.min(quote.price);
        if let Some(slot) = applied_by_index.get_mut(i) {
            *slot = applied;
        }
        remaining = remaining.saturating_sub(applied);
    }

    let per_category: Vec<CategoryAllocation> = quotes
        .iter()
        .zip(applied_by_index)
        .map(|(quote, applied)| CategoryAllocation {
            category_id: quote.category_id,
            price: quote.price,
            applied,
            owed: quote.price.saturating_sub(applied),
        })
        .collect();

    let total_original: Amount = per_category.iter().map(|c| c.price).sum();
    let total_applied: Amount = per_category.iter().map(|c| c.applied).sum();
    let total_owed = total_original.saturating_sub(total_applied);

    let refund_efficiency = if total_original.is_zero() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let ratio = total_applied.cents() as f64 / total_original.cents() as f64;
        ratio
    };

    AllocationOutcome {
        per_category,
        total_original,
        total_applied,
        total_owed,
        is_fully_covered: total_owed.is_zero() && !total_applied.is_zero(),
        refund_efficiency,
    }
}
