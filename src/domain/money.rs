//! Integer money type.
//!
//! All prices, balances, and ledger amounts are whole cents. Floating
//! point never touches a wallet; the only float in the crate is the
//! display-only refund efficiency ratio.

use std::fmt;
use std::iter::Sum;

use serde::{Deserialize, Serialize};

/// An unsigned money amount in cents.
///
/// Serialized as a plain JSON number. Arithmetic is checked or
/// saturating at every call site that could overflow.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from whole cents.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in whole cents.
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction (floors at zero).
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Returns the smaller of two amounts.
    #[must_use]
    pub const fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }

    /// Signed cents for ledger entries (positive direction).
    ///
    /// Amounts above `i64::MAX` cents do not occur in practice; the
    /// conversion saturates rather than wraps.
    #[must_use]
    pub fn as_signed(&self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_dollars() {
        assert_eq!(Amount::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Amount::from_cents(5).to_string(), "$0.05");
        assert_eq!(Amount::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn saturating_sub_floors_at_zero() {
        let a = Amount::from_cents(100);
        let b = Amount::from_cents(250);
        assert_eq!(a.saturating_sub(b), Amount::ZERO);
        assert_eq!(b.saturating_sub(a), Amount::from_cents(150));
    }

    #[test]
    fn min_picks_smaller() {
        let a = Amount::from_cents(400);
        let b = Amount::from_cents(700);
        assert_eq!(a.min(b), a);
        assert_eq!(b.min(a), a);
    }

    #[test]
    fn sum_of_amounts() {
        let total: Amount = [100, 250, 50]
            .into_iter()
            .map(Amount::from_cents)
            .sum();
        assert_eq!(total, Amount::from_cents(400));
    }

    #[test]
    fn serde_is_plain_number() {
        let a = Amount::from_cents(1200);
        let json = serde_json::to_string(&a).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        assert_eq!(json, "1200");
    }
}
