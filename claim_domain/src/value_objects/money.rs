use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ClaimError;

/// A monetary amount. Backed by `rust_decimal` so comparisons and the
/// German-locale formatting used by Status-Sales (spec.md §4.5) never suffer
/// floating-point drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    /// Constructs a strictly-positive amount, as required for the `amount`
    /// field during extraction (spec.md §4.2).
    pub fn positive(value: Decimal) -> Result<Self, ClaimError> {
        if value <= Decimal::ZERO {
            return Err(ClaimError::PatternMatch {
                issuer: String::new(),
                detail: format!("amount must be > 0, got {value}"),
            });
        }
        Ok(Self(value))
    }

    /// Constructs an amount with no sign restriction (tolerances, thresholds
    /// of zero, credit deltas).
    pub fn of(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn abs_diff(&self, other: Money) -> Decimal {
        (self.0 - other.0).abs()
    }

    /// `true` when `self` is within `tolerance` of `other`, per the ERP
    /// duplicate-search rule `|a − b| ≤ tolerance` (spec.md §4.6).
    pub fn within(&self, other: Money, tolerance: Decimal) -> bool {
        self.abs_diff(other) <= tolerance
    }

    /// Formats in German locale: `.` as thousands separator, `,` as the
    /// decimal point, no currency symbol — the shape Status-Sales text uses.
    pub fn format_german(&self) -> String {
        let rounded = self.0.round_dp(2);
        let sign = if rounded.is_sign_negative() { "-" } else { "" };
        let fixed = format!("{:.2}", rounded.abs());
        let (whole, frac) = fixed.split_once('.').expect("fixed-point formatting always has a point");

        let mut grouped = String::new();
        for (count, ch) in whole.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let whole_grouped: String = grouped.chars().rev().collect();

        format!("{sign}{whole_grouped},{frac}")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_non_positive_amount() {
        assert!(Money::positive(dec!(0)).is_err());
        assert!(Money::positive(dec!(-1)).is_err());
    }

    #[test]
    fn formats_german_thousands() {
        assert_eq!(Money::of(dec!(1500)).format_german(), "1.500,00");
        assert_eq!(Money::of(dec!(123.45)).format_german(), "123,45");
        assert_eq!(Money::of(dec!(1234567.8)).format_german(), "1.234.567,80");
    }

    #[test]
    fn within_tolerance() {
        let a = Money::of(dec!(100.00));
        let b = Money::of(dec!(100.005));
        assert!(a.within(b, dec!(0.01)));
        assert!(!a.within(b, dec!(0.001)));
    }
}
