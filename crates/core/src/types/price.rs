//! Type-safe price representation using decimal arithmetic.
//!
//! Prices travel as plain JSON numbers (`"price": 999`) because that is what
//! the product and order endpoints exchange. In memory they are
//! [`Decimal`]s so totals never pick up binary floating point drift.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Largest unit price accepted from a catalog or a persisted cart, in the
/// major unit.
const MAX_UNIT_PRICE: i64 = 1_000_000_000_000;

/// A single-currency price.
///
/// There is no currency code: every amount in a session is in the currency
/// the storefront displays. [`Price::display_with`] adds the symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole amount in the major unit.
    #[must_use]
    pub fn from_major(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// Create a price from an amount in minor units (e.g. paise, cents).
    #[must_use]
    pub fn from_minor(amount: i64) -> Self {
        Self(Decimal::new(amount, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Whether this is usable as a product's unit price: not negative and
    /// no more than one trillion.
    #[must_use]
    pub fn is_valid_unit_price(&self) -> bool {
        !self.is_negative() && self.0 <= Decimal::from(MAX_UNIT_PRICE)
    }

    /// Line price for `quantity` units, or `None` on overflow.
    #[must_use]
    pub fn checked_times(&self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Sum of two prices, or `None` on overflow.
    #[must_use]
    pub fn checked_add(&self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// The amount rounded half-away-from-zero to two decimal places.
    ///
    /// This is the value shown to customers and submitted as an order total.
    #[must_use]
    pub fn to_cents(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Format with a currency symbol prefix, e.g. `Rs999.00`.
    #[must_use]
    pub fn display_with(&self, symbol: &str) -> String {
        format!("{symbol}{self}")
    }
}

/// Two-decimal rendering without a symbol, e.g. `1998.00`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_cents().0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_two_decimals() {
        assert_eq!(Price::from_major(1998).to_string(), "1998.00");
        assert_eq!(Price::from_minor(59_950).to_string(), "599.50");
        assert_eq!(Price::from_major(999).display_with("Rs"), "Rs999.00");
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        let price = Price::new(Decimal::new(10_005, 3)); // 10.005
        assert_eq!(price.to_string(), "10.01");
    }

    #[test]
    fn test_checked_times_and_add() {
        let ear_pods = Price::from_major(999).checked_times(2).unwrap();
        let stickers = Price::from_minor(1050).checked_times(3).unwrap();
        assert_eq!(ear_pods.checked_add(stickers).unwrap().to_string(), "2029.50");
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let huge: Price = serde_json::from_str("40000000000000000000000000000").unwrap();
        assert!(huge.checked_times(2).is_none());
        assert!(huge.checked_add(huge).is_none());
        assert_eq!(huge.checked_times(1), Some(huge));
    }

    #[test]
    fn test_valid_unit_price() {
        assert!(Price::ZERO.is_valid_unit_price());
        assert!(Price::from_major(1_000_000_000_000).is_valid_unit_price());
        assert!(!Price::from_major(1_000_000_000_001).is_valid_unit_price());
        assert!(!Price::from_minor(-1).is_valid_unit_price());
    }

    #[test]
    fn test_wire_form_is_a_json_number() {
        let parsed: Price = serde_json::from_str("999").unwrap();
        assert_eq!(parsed, Price::from_major(999));

        let parsed: Price = serde_json::from_str("1599.99").unwrap();
        assert_eq!(parsed, Price::from_minor(159_999));

        let json = serde_json::to_value(Price::from_major(999)).unwrap();
        assert!(json.is_number());
    }

    #[test]
    fn test_is_negative() {
        assert!(Price::from_major(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
        assert!(!Price::from_major(5).is_negative());
    }
}
