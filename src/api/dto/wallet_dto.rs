//! Wallet DTOs: open, detail, and transaction history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::wallet::{Transaction, Wallet};
use crate::domain::{AdId, WalletId};

/// Response body for `POST /wallets` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateWalletResponse {
    /// Unique wallet identifier.
    pub wallet_id: WalletId,
    /// Server creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Wallet detail for `GET /wallets/:id`.
#[derive(Debug, Serialize, ToSchema)]
pub struct WalletResponse {
    /// Wallet identifier.
    pub wallet_id: WalletId,
    /// Current spendable balance in cents.
    pub balance_cents: u64,
    /// Lifetime earnings in cents.
    pub total_earned_cents: u64,
    /// Lifetime spend in cents.
    pub total_spent_cents: u64,
    /// Lifetime refunds received in cents.
    pub total_refunded_cents: u64,
    /// Lifetime refund credit consumed in cents.
    pub total_refund_consumed_cents: u64,
    /// Refund credit currently spendable at checkout, in cents.
    pub available_refund_credit_cents: u64,
    /// Timestamp of the last mutation.
    pub last_updated: DateTime<Utc>,
    /// Number of ledger entries.
    pub transaction_count: usize,
}

impl From<&Wallet> for WalletResponse {
    fn from(wallet: &Wallet) -> Self {
        Self {
            wallet_id: wallet.wallet_id,
            balance_cents: wallet.balance.cents(),
            total_earned_cents: wallet.total_earned.cents(),
            total_spent_cents: wallet.total_spent.cents(),
            total_refunded_cents: wallet.total_refunded.cents(),
            total_refund_consumed_cents: wallet.total_refund_consumed.cents(),
            available_refund_credit_cents: wallet.available_refund_credit().cents(),
            last_updated: wallet.last_updated,
            transaction_count: wallet.transactions().len(),
        }
    }
}

/// A single ledger entry in a transaction listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionDto {
    /// Position in the wallet's log.
    pub seq: u64,
    /// Signed amount in cents: positive for credits, negative for debits.
    pub amount_cents: i64,
    /// Entry kind (`credit`, `debit`, `refund_credit`, `refund_debit`).
    pub kind: String,
    /// Human-readable description.
    pub description: String,
    /// Related ad, if any.
    pub related_ad: Option<AdId>,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Transaction> for TransactionDto {
    fn from(tx: &Transaction) -> Self {
        Self {
            seq: tx.seq,
            amount_cents: tx.amount,
            kind: tx.kind.as_str().to_string(),
            description: tx.description.clone(),
            related_ad: tx.related_ad,
            created_at: tx.created_at,
        }
    }
}

/// Paginated response for `GET /wallets/:id/transactions`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionListResponse {
    /// Ledger entries, oldest first.
    pub data: Vec<TransactionDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
