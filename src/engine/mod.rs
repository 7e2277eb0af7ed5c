//! Engine layer: pure computations with no side effects.
//!
//! [`allocation`] holds the refund reallocation algorithm. Everything in
//! this module is deterministic and callable repeatedly — previews never
//! touch wallets or slots.

pub mod allocation;

pub use allocation::{AllocationOutcome, CategoryAllocation, CategoryQuote, allocate};
