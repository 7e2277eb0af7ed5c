//! Persistence layer: PostgreSQL event log and wallet snapshots.
//!
//! Durable storage for marketplace events and periodic wallet state
//! snapshots. The concrete implementation uses `sqlx::PgPool` for async
//! PostgreSQL access.

pub mod models;
pub mod postgres;
