//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams marketplace events in real
//! time: placement transitions, refund settlements, and payment
//! progress, filtered per client by ad subscription.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
