//! PostgreSQL implementation of the persistence layer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::WalletSnapshot;
use crate::error::MarketError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends an event to the event log.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] on database failure.
    pub async fn save_event(
        &self,
        ad_id: Uuid,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<i64, MarketError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO events (ad_id, event_type, payload) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(ad_id)
        .bind(event_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| MarketError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    /// Saves a wallet state snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] on database failure.
    pub async fn save_wallet_snapshot(
        &self,
        wallet_id: Uuid,
        balance_cents: i64,
        state_json: &serde_json::Value,
    ) -> Result<i64, MarketError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO wallet_snapshots (wallet_id, balance_cents, state_json) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(wallet_id)
        .bind(balance_cents)
        .bind(state_json)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| MarketError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    /// Loads the latest snapshot for each wallet using `DISTINCT ON`.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] on database failure.
    pub async fn load_latest_snapshots(&self) -> Result<Vec<WalletSnapshot>, MarketError> {
        let rows = sqlx::query_as::<_, (i64, Uuid, i64, serde_json::Value, DateTime<Utc>)>(
            "SELECT DISTINCT ON (wallet_id) id, wallet_id, balance_cents, state_json, snapshot_at \
             FROM wallet_snapshots ORDER BY wallet_id, snapshot_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MarketError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, wallet_id, balance_cents, state_json, snapshot_at)| WalletSnapshot {
                    id,
                    wallet_id,
                    balance_cents,
                    state_json,
                    snapshot_at,
                },
            )
            .collect())
    }

    /// Deletes wallet snapshots older than the given number of days.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] on database failure.
    pub async fn delete_old_snapshots(&self, before_days: u64) -> Result<u64, MarketError> {
        let cutoff =
            Utc::now() - chrono::Duration::days(i64::try_from(before_days).unwrap_or(i64::MAX));

        let result = sqlx::query("DELETE FROM wallet_snapshots WHERE snapshot_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| MarketError::PersistenceError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
