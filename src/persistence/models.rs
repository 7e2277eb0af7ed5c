//! Database models for wallet snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A wallet snapshot row from the `wallet_snapshots` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSnapshot {
    /// Auto-increment row ID.
    pub id: i64,
    /// Wallet that was snapshotted.
    pub wallet_id: Uuid,
    /// Balance in cents at snapshot time.
    pub balance_cents: i64,
    /// Full wallet state (counters plus transaction log) as JSONB.
    pub state_json: serde_json::Value,
    /// Snapshot timestamp.
    pub snapshot_at: DateTime<Utc>,
}
