//! Per-party wallet with an append-only transaction log.
//!
//! A [`Wallet`] is the leaf of the financial model: every other component
//! reads and writes money exclusively through it. Historical entries are
//! never updated in place; each mutation appends exactly one
//! [`Transaction`] and adjusts the running counters, so
//! `balance == Σ transaction amounts` holds at all times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::money::Amount;
use super::{AdId, WalletId};
use crate::error::MarketError;

/// Direction and bookkeeping class of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Regular earning (increases `total_earned`).
    Credit,
    /// Regular spend (decreases balance, increases `total_spent`).
    Debit,
    /// Refund issued to this wallet (increases `total_refunded`).
    RefundCredit,
    /// Refund reversed out of this wallet (increases `total_refund_consumed`).
    RefundDebit,
}

impl TransactionKind {
    /// Returns `true` for the kinds that increase the balance.
    #[must_use]
    pub const fn is_credit(&self) -> bool {
        matches!(self, Self::Credit | Self::RefundCredit)
    }

    /// Stable string form used in events and the event log.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::RefundCredit => "refund_credit",
            Self::RefundDebit => "refund_debit",
        }
    }
}

/// Immutable ledger entry. Appended once, never edited.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Transaction {
    /// Position in the wallet's log (0-based, strictly increasing).
    pub seq: u64,
    /// Signed amount in cents: positive for credits, negative for debits.
    pub amount: i64,
    /// Bookkeeping class of the entry.
    pub kind: TransactionKind,
    /// Human-readable description for statements.
    pub description: String,
    /// Ad this entry relates to, when money moved because of one.
    pub related_ad: Option<AdId>,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
}

/// A party's wallet: running balance, aggregate counters, and the full
/// append-only transaction log.
///
/// Invariants (checked by tests, relied on everywhere):
/// - `balance == total_earned − total_spent + total_refunded − total_refund_consumed`
/// - `balance == Σ transaction.amount` over the log
/// - the balance never goes negative; debits that would do so fail
///   without any state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// Wallet identifier (immutable after open).
    pub wallet_id: WalletId,
    /// Current spendable balance.
    pub balance: Amount,
    /// Lifetime earnings (kind `credit`).
    pub total_earned: Amount,
    /// Lifetime spend (kind `debit`).
    pub total_spent: Amount,
    /// Lifetime refunds received (kind `refund_credit`).
    pub total_refunded: Amount,
    /// Lifetime refunds reversed/consumed (kind `refund_debit`).
    pub total_refund_consumed: Amount,
    /// Timestamp of the last mutation.
    pub last_updated: DateTime<Utc>,
    transactions: Vec<Transaction>,
}

impl Wallet {
    /// Creates an empty wallet.
    #[must_use]
    pub fn new(wallet_id: WalletId) -> Self {
        Self {
            wallet_id,
            balance: Amount::ZERO,
            total_earned: Amount::ZERO,
            total_spent: Amount::ZERO,
            total_refunded: Amount::ZERO,
            total_refund_consumed: Amount::ZERO,
            last_updated: Utc::now(),
            transactions: Vec::new(),
        }
    }

    /// Spendable refund credit: refunds received minus refunds consumed.
    ///
    /// Derived, never stored. This is the pool the allocation engine
    /// distributes across newly selected categories.
    #[must_use]
    pub fn available_refund_credit(&self) -> Amount {
        self.total_refunded.saturating_sub(self.total_refund_consumed)
    }

    /// Applies a credit-direction entry. Crediting cannot fail.
    pub fn credit(
        &mut self,
        kind: TransactionKind,
        amount: Amount,
        description: String,
        related_ad: Option<AdId>,
    ) -> Transaction {
        debug_assert!(kind.is_credit());
        self.balance = self.balance.saturating_add(amount);
        match kind {
            TransactionKind::RefundCredit => {
                self.total_refunded = self.total_refunded.saturating_add(amount);
            }
            _ => {
                self.total_earned = self.total_earned.saturating_add(amount);
            }
        }
        self.append(kind, amount.as_signed(), description, related_ad)
    }

    /// Applies a debit-direction entry as an atomic check-and-decrement.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InsufficientBalance`] if `balance < amount`;
    /// the wallet is untouched in that case.
    pub fn debit(
        &mut self,
        kind: TransactionKind,
        amount: Amount,
        description: String,
        related_ad: Option<AdId>,
    ) -> Result<Transaction, MarketError> {
        debug_assert!(!kind.is_credit());
        if self.balance < amount {
            return Err(MarketError::InsufficientBalance {
                wallet_id: self.wallet_id,
                required: amount,
                available: self.balance,
            });
        }
        self.balance = self.balance.saturating_sub(amount);
        match kind {
            TransactionKind::RefundDebit => {
                self.total_refund_consumed = self.total_refund_consumed.saturating_add(amount);
            }
            _ => {
                self.total_spent = self.total_spent.saturating_add(amount);
            }
        }
        Ok(self.append(kind, -amount.as_signed(), description, related_ad))
    }

    /// Consumes refund credit: a `refund_debit` that additionally requires
    /// `available_refund_credit() >= amount`.
    ///
    /// This is the commit-path serialization point for the refund pool:
    /// two concurrent checkouts for the same advertiser race on the
    /// wallet's write lock, and the loser fails here.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InsufficientBalance`] if the spendable
    /// refund credit (or the balance) is smaller than `amount`.
    pub fn consume_refund_credit(
        &mut self,
        amount: Amount,
        description: String,
        related_ad: Option<AdId>,
    ) -> Result<Transaction, MarketError> {
        if self.available_refund_credit() < amount {
            return Err(MarketError::InsufficientBalance {
                wallet_id: self.wallet_id,
                required: amount,
                available: self.available_refund_credit(),
            });
        }
        self.debit(TransactionKind::RefundDebit, amount, description, related_ad)
    }

    /// Read-only view of the transaction log, oldest first.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Recomputes the balance from the log. Used by the audit invariant
    /// tests; `O(n)` and never on the hot path.
    #[must_use]
    pub fn balance_from_log(&self) -> i64 {
        self.transactions.iter().map(|t| t.amount).sum()
    }

    fn append(
        &mut self,
        kind: TransactionKind,
        amount: i64,
        description: String,
        related_ad: Option<AdId>,
    ) -> Transaction {
        let tx = Transaction {
            seq: self.transactions.len() as u64,
            amount,
            kind,
            description,
            related_ad,
            created_at: Utc::now(),
        };
        self.last_updated = tx.created_at;
        self.transactions.push(tx.clone());
        tx
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn cents(v: u64) -> Amount {
        Amount::from_cents(v)
    }

    #[test]
    fn credit_increases_balance_and_earned() {
        let mut w = Wallet::new(WalletId::new());
        let tx = w.credit(TransactionKind::Credit, cents(5000), "payment".to_string(), None);
        assert_eq!(w.balance, cents(5000));
        assert_eq!(w.total_earned, cents(5000));
        assert_eq!(tx.amount, 5000);
        assert_eq!(tx.seq, 0);
    }

    #[test]
    fn refund_credit_tracks_refunded() {
        let mut w = Wallet::new(WalletId::new());
        let ad = AdId::new();
        w.credit(
            TransactionKind::RefundCredit,
            cents(1000),
            "rejection refund".to_string(),
            Some(ad),
        );
        assert_eq!(w.total_refunded, cents(1000));
        assert_eq!(w.total_earned, Amount::ZERO);
        assert_eq!(w.available_refund_credit(), cents(1000));
    }

    #[test]
    fn debit_requires_sufficient_balance() {
        let mut w = Wallet::new(WalletId::new());
        w.credit(TransactionKind::Credit, cents(3000), "earn".to_string(), None);

        let err = w.debit(TransactionKind::RefundDebit, cents(5000), "refund".to_string(), None);
        let Err(MarketError::InsufficientBalance {
            required, available, ..
        }) = err
        else {
            panic!("expected InsufficientBalance");
        };
        assert_eq!(required, cents(5000));
        assert_eq!(available, cents(3000));
        // No partial mutation.
        assert_eq!(w.balance, cents(3000));
        assert_eq!(w.transactions().len(), 1);
    }

    #[test]
    fn consume_refund_credit_limited_to_pool() {
        let mut w = Wallet::new(WalletId::new());
        // Earned money is not spendable refund credit.
        w.credit(TransactionKind::Credit, cents(10_000), "earn".to_string(), None);
        w.credit(TransactionKind::RefundCredit, cents(1000), "refund".to_string(), None);

        let over = w.consume_refund_credit(cents(1500), "checkout".to_string(), None);
        assert!(over.is_err());
        assert_eq!(w.available_refund_credit(), cents(1000));

        let ok = w.consume_refund_credit(cents(1000), "checkout".to_string(), None);
        assert!(ok.is_ok());
        assert_eq!(w.available_refund_credit(), Amount::ZERO);
        assert_eq!(w.balance, cents(10_000));
    }

    #[test]
    fn balance_equals_log_sum_after_any_sequence() {
        let mut w = Wallet::new(WalletId::new());
        w.credit(TransactionKind::Credit, cents(5000), "a".to_string(), None);
        w.credit(TransactionKind::RefundCredit, cents(700), "b".to_string(), None);
        let _ = w.debit(TransactionKind::Debit, cents(1200), "c".to_string(), None);
        let _ = w.debit(TransactionKind::RefundDebit, cents(700), "d".to_string(), None);
        // A failed debit must not appear in the log.
        let _ = w.debit(TransactionKind::Debit, cents(999_999), "e".to_string(), None);

        assert_eq!(w.balance.as_signed(), w.balance_from_log());
        assert_eq!(w.transactions().len(), 4);
        let expected = w
            .total_earned
            .saturating_add(w.total_refunded)
            .saturating_sub(w.total_spent)
            .saturating_sub(w.total_refund_consumed);
        assert_eq!(w.balance, expected);
    }

    #[test]
    fn sequence_numbers_are_dense() {
        let mut w = Wallet::new(WalletId::new());
        for i in 0..5u64 {
            let tx = w.credit(TransactionKind::Credit, cents(1), format!("tx {i}"), None);
            assert_eq!(tx.seq, i);
        }
    }
}
