//! Amount type for displaying monetary values with optional dollar signs.
//!
//! This module provides the `Amount` type which wraps `Decimal` and renders it the way the report
//! presents USD totals, e.g. `-$60,000.00`. Parsing raw, messy amount text is the job of
//! `normalize::AmountNormalizer`, not of this type.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};
use std::fmt;

/// Represents a dollar amount, written with a dollar sign, thousands commas and exactly two places.
///
/// The value is rounded half away from zero for display only. The rounding happens on the
/// `Decimal`, no floating point is involved.
///
/// ```
/// # use finparse::model::Amount;
/// # use rust_decimal::Decimal;
/// let amount = Amount::new(Decimal::new(-123456789, 3));
/// assert_eq!(amount.to_string(), "-$123,456.79");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, num) = if self.is_negative() {
            ("-", self.value().abs())
        } else {
            ("", self.value().abs())
        };

        let rounded = num.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let text = format!("{rounded:.2}");
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
        write!(f, "{sign}${}.{frac_part}", group_thousands(int_part))
    }
}

/// Inserts a comma between every group of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (ix, c) in digits.chars().enumerate() {
        if ix > 0 && (len - ix) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_display_positive() {
        let amount = Amount::new(dec("50.00"));
        assert_eq!(amount.to_string(), "$50.00");
    }

    #[test]
    fn test_display_negative() {
        let amount = Amount::new(dec("-50.00"));
        assert_eq!(amount.to_string(), "-$50.00");
    }

    #[test]
    fn test_display_zero() {
        let amount = Amount::new(Decimal::ZERO);
        assert_eq!(amount.to_string(), "$0.00");
    }

    #[test]
    fn test_display_pads_and_rounds() {
        assert_eq!(Amount::new(dec("7")).to_string(), "$7.00");
        assert_eq!(Amount::new(dec("0.005")).to_string(), "$0.01");
        assert_eq!(Amount::new(dec("-0.005")).to_string(), "-$0.01");
        assert_eq!(Amount::new(dec("2.675")).to_string(), "$2.68");
    }

    #[test]
    fn test_display_large_amount_with_commas() {
        let amount = Amount::new(dec("-60000"));
        assert_eq!(amount.to_string(), "-$60,000.00");
        let amount = Amount::new(dec("1234567.891"));
        assert_eq!(amount.to_string(), "$1,234,567.89");
    }

    #[test]
    fn test_serialize() {
        let amount = Amount::new(dec("1234.5"));
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"$1,234.50\"");
    }

    #[test]
    fn test_equality() {
        assert_eq!(Amount::new(dec("50.00")), Amount::new(dec("50.00")));
        assert!(Amount::new(dec("30")) < Amount::new(dec("50")));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456"), "123,456");
    }
}
