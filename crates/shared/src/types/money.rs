//! Money in minor currency units with decimal rounding.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Stored amounts are integer minor units (pence). Intermediate arithmetic
//! (rates, fractions, formulas) goes through `rust_decimal::Decimal` and is
//! rounded back to minor units at the boundary.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// An amount in the smallest currency unit (e.g. pence).
pub type MinorUnits = i64;

/// Number of minor units in one major unit.
pub const MINOR_PER_MAJOR: i64 = 100;

/// Rounds a decimal amount to the nearest whole minor unit.
///
/// Midpoints round away from zero. Values outside the `i64` range saturate.
#[must_use]
pub fn round_to_minor(amount: Decimal) -> MinorUnits {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Converts an amount in major units (e.g. pounds) to rounded minor units.
///
/// Returns `None` if the result does not fit in `i64`.
#[must_use]
pub fn major_to_minor(major: Decimal) -> Option<MinorUnits> {
    major
        .checked_mul(Decimal::from(MINOR_PER_MAJOR))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// A monetary amount stored in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub MinorUnits);

impl Money {
    /// Creates a new amount from minor units.
    #[must_use]
    pub const fn from_minor(amount: MinorUnits) -> Self {
        Self(amount)
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor(self) -> MinorUnits {
        self.0
    }

    /// Returns the amount in major units, exactly.
    #[must_use]
    pub fn to_major(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.to_major())
    }
}
