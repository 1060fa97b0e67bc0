use rust_decimal::Decimal;

use crate::error::ClaimError;

/// Target numeric type for the parser's output (spec.md §4.2's numeric
/// parser).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NumericTarget {
    Int,
    Float,
}

/// A parsed value, or — when the caller asked for the lenient mode — the
/// original text passed straight through unmodified (spec.md §4.2: "On
/// error: raise, or silently return the original string, per caller
/// preference").
#[derive(Debug, Clone, PartialEq)]
pub enum NumericValue {
    Int(i64),
    Float(Decimal),
    Raw(String),
}

/// Parses locale-ambiguous numeric strings: thousand separators `.`, `,`,
/// or a space, an optional trailing sign, and a fractional part of any
/// width, resolved by scanning the last non-digit separator (spec.md §4.2).
///
/// Implementations must satisfy the round-trip law from spec.md §8:
/// `parse(format(x)) == x` for representable decimals with ≤ 4 fractional
/// digits, any sign, any separator style.
pub trait NumericParser: Send + Sync {
    fn parse(&self, raw: &str, target: NumericTarget, strict: bool) -> Result<NumericValue, ClaimError>;
}
