//! Type-safe price representation using decimal arithmetic.
//!
//! The storefront sells in a single currency (INR). Amounts are kept in
//! rupees as `rust_decimal::Decimal`; the payment gateway wants amounts in
//! paise (minor units), which is what [`to_minor_units`] produces.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a rupee price.
    #[must_use]
    pub const fn inr(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::INR)
    }

    /// Amount in minor currency units (paise for INR).
    #[must_use]
    pub fn minor_units(&self) -> i64 {
        to_minor_units(self.amount)
    }

    /// Format for display (e.g., "₹1999.00").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes.
///
/// The storefront only trades in INR today; the enum keeps the currency
/// explicit on the wire instead of an implied unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
}

impl CurrencyCode {
    /// Currency symbol for display.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::INR => "₹",
        }
    }

    /// ISO 4217 code string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::INR => "INR",
        }
    }
}

impl core::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Convert a rupee amount to paise, rounding to the nearest paisa.
///
/// The gateway's order API takes integer minor units, so ₹1999 becomes 199900.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> i64 {
    (amount * Decimal::from(100)).round().to_i64().unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_rupees_to_paise() {
        assert_eq!(to_minor_units(Decimal::from(1999)), 199_900);
    }

    #[test]
    fn test_fractional_rupees_to_paise() {
        // 499.50 -> 49950
        assert_eq!(to_minor_units(Decimal::new(49950, 2)), 49_950);
    }

    #[test]
    fn test_sub_paisa_amounts_round() {
        // 10.005 rounds to 1000 or 1001 paise depending on banker's rounding;
        // Decimal::round is banker's rounding, 1000.5 -> 1000
        assert_eq!(to_minor_units(Decimal::new(10_005, 3)), 1000);
    }

    #[test]
    fn test_zero() {
        assert_eq!(to_minor_units(Decimal::ZERO), 0);
    }

    #[test]
    fn test_price_display() {
        let price = Price::inr(Decimal::new(1_99900, 2));
        assert_eq!(price.display(), "₹1999.00");
        assert_eq!(price.minor_units(), 199_900);
        assert_eq!(price.currency_code.code(), "INR");
    }
}
