use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ClaimError;

/// Monetary cut-off distinguishing "auto-close under threshold" from "route
/// to CS" (spec.md glossary). Invariant: `threshold ≥ 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold(Decimal);

impl Threshold {
    pub fn new(value: Decimal) -> Result<Self, ClaimError> {
        if value < Decimal::ZERO {
            return Err(ClaimError::InvalidClaimContext {
                detail: format!("threshold must be >= 0, got {value}"),
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Amount exactly equal to the threshold is treated as over-threshold
    /// (spec.md §8 boundary behavior).
    pub fn is_met_or_exceeded_by(&self, amount: Decimal) -> bool {
        amount >= self.0
    }
}

/// Absolute epsilon for amount equality in case-duplicate search (spec.md
/// glossary). Invariant: `tolerance ≥ 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tolerance(Decimal);

impl Tolerance {
    pub fn new(value: Decimal) -> Result<Self, ClaimError> {
        if value < Decimal::ZERO {
            return Err(ClaimError::InvalidClaimContext {
                detail: format!("tolerance must be >= 0, got {value}"),
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn threshold_boundary_is_over() {
        let t = Threshold::new(dec!(500)).unwrap();
        assert!(t.is_met_or_exceeded_by(dec!(500)));
        assert!(!t.is_met_or_exceeded_by(dec!(499.99)));
    }

    #[test]
    fn rejects_negative() {
        assert!(Threshold::new(dec!(-1)).is_err());
        assert!(Tolerance::new(dec!(-0.01)).is_err());
    }
}
