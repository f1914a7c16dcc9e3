//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are never stored as binary floats. The catalog API serves amounts
//! as JSON numbers, so [`Price`] deserializes through
//! `rust_decimal::serde::float` and keeps exact decimal arithmetic from
//! there on (line subtotals are `price * quantity` and must not drift).

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in the storefront's display currency.
///
/// Amounts are in the currency's standard unit (e.g. dollars, not cents).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an integer number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display (e.g. "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents_and_display() {
        let price = Price::from_cents(1099);
        assert_eq!(price.display(), "$10.99");
    }

    #[test]
    fn test_times_is_exact() {
        // 10.10 * 3 must be 30.30 exactly, not 30.299999...
        let price = Price::from_cents(1010);
        assert_eq!(price.times(3), Price::from_cents(3030));
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_cents(1000), Price::from_cents(500)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(1500));
    }

    #[test]
    fn test_deserializes_from_json_number() {
        let price: Price = serde_json::from_str("109.95").expect("deserialize");
        assert_eq!(price, Price::from_cents(10995));
    }
}
