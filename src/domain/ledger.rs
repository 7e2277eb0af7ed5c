//! Concurrent wallet storage with per-wallet fine-grained locking.
//!
//! [`WalletLedger`] stores every party wallet in a `HashMap` where each
//! entry is individually protected by a [`tokio::sync::RwLock`]. Reads on
//! the same wallet are concurrent; mutations on the same wallet are
//! serialized, which is what makes `debit` and `consume_refund_credit`
//! atomic check-and-decrements.
//!
//! Wallets are always addressed by an explicit [`WalletId`] passed in by
//! the caller; there is no ambient "current publisher wallet" lookup.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::money::Amount;
use super::wallet::{Transaction, TransactionKind, Wallet};
use super::{AdId, WalletId};
use crate::error::MarketError;

/// Central store for all party wallets.
#[derive(Debug, Default)]
pub struct WalletLedger {
    wallets: RwLock<HashMap<WalletId, Arc<RwLock<Wallet>>>>,
}

impl WalletLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            wallets: RwLock::new(HashMap::new()),
        }
    }

    /// Opens a new empty wallet and returns its id.
    pub async fn open(&self) -> WalletId {
        let wallet_id = WalletId::new();
        let mut map = self.wallets.write().await;
        map.insert(wallet_id, Arc::new(RwLock::new(Wallet::new(wallet_id))));
        wallet_id
    }

    /// Returns the shared handle for a wallet.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::WalletNotFound`] if the wallet does not exist.
    pub async fn get(&self, wallet_id: WalletId) -> Result<Arc<RwLock<Wallet>>, MarketError> {
        let map = self.wallets.read().await;
        map.get(&wallet_id)
            .cloned()
            .ok_or(MarketError::WalletNotFound(wallet_id))
    }

    /// Credits a wallet. Crediting cannot fail once the wallet is resolved.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::WalletNotFound`] if the wallet does not exist.
    pub async fn credit(
        &self,
        wallet_id: WalletId,
        kind: TransactionKind,
        amount: Amount,
        description: impl Into<String>,
        related_ad: Option<AdId>,
    ) -> Result<Transaction, MarketError> {
        let handle = self.get(wallet_id).await?;
        let mut wallet = handle.write().await;
        Ok(wallet.credit(kind, amount, description.into(), related_ad))
    }

    /// Debits a wallet atomically.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::WalletNotFound`] for an unknown wallet, or
    /// [`MarketError::InsufficientBalance`] when `balance < amount`; in
    /// the latter case no state changed and the caller must abort its
    /// in-flight operation.
    pub async fn debit(
        &self,
        wallet_id: WalletId,
        kind: TransactionKind,
        amount: Amount,
        description: impl Into<String>,
        related_ad: Option<AdId>,
    ) -> Result<Transaction, MarketError> {
        let handle = self.get(wallet_id).await?;
        let mut wallet = handle.write().await;
        wallet.debit(kind, amount, description.into(), related_ad)
    }

    /// Consumes spendable refund credit atomically.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::WalletNotFound`] for an unknown wallet, or
    /// [`MarketError::InsufficientBalance`] when the available refund
    /// credit is smaller than `amount` (the losing side of two concurrent
    /// checkout commits ends up here).
    pub async fn consume_refund_credit(
        &self,
        wallet_id: WalletId,
        amount: Amount,
        description: impl Into<String>,
        related_ad: Option<AdId>,
    ) -> Result<Transaction, MarketError> {
        let handle = self.get(wallet_id).await?;
        let mut wallet = handle.write().await;
        wallet.consume_refund_credit(amount, description.into(), related_ad)
    }

    /// Point-in-time balance read reflecting all committed transactions.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::WalletNotFound`] if the wallet does not exist.
    pub async fn balance(&self, wallet_id: WalletId) -> Result<Amount, MarketError> {
        let handle = self.get(wallet_id).await?;
        let wallet = handle.read().await;
        Ok(wallet.balance)
    }

    /// Point-in-time spendable refund credit.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::WalletNotFound`] if the wallet does not exist.
    pub async fn available_refund_credit(
        &self,
        wallet_id: WalletId,
    ) -> Result<Amount, MarketError> {
        let handle = self.get(wallet_id).await?;
        let wallet = handle.read().await;
        Ok(wallet.available_refund_credit())
    }

    /// Snapshot of a wallet (counters and full log) for statements.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::WalletNotFound`] if the wallet does not exist.
    pub async fn snapshot(&self, wallet_id: WalletId) -> Result<Wallet, MarketError> {
        let handle = self.get(wallet_id).await?;
        let wallet = handle.read().await;
        Ok(wallet.clone())
    }

    /// Clones every open wallet, for the background snapshot task.
    pub async fn snapshot_all(&self) -> Vec<Wallet> {
        let handles: Vec<Arc<RwLock<Wallet>>> = {
            let map = self.wallets.read().await;
            map.values().cloned().collect()
        };
        let mut wallets = Vec::with_capacity(handles.len());
        for handle in handles {
            wallets.push(handle.read().await.clone());
        }
        wallets
    }

    /// Re-inserts a wallet restored from a persisted snapshot, replacing
    /// any in-memory state under the same id.
    pub async fn restore(&self, wallet: Wallet) {
        let mut map = self.wallets.write().await;
        map.insert(wallet.wallet_id, Arc::new(RwLock::new(wallet)));
    }

    /// Returns the number of open wallets.
    pub async fn len(&self) -> usize {
        self.wallets.read().await.len()
    }

    /// Returns `true` if no wallet has been opened.
    pub async fn is_empty(&self) -> bool {
        self.wallets.read().await.is_empty()
    }
}
