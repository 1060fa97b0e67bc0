use claim_domain::error::ClaimError;
use claim_domain::services::numeric_parser::{NumericParser, NumericTarget, NumericValue};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Locale-ambiguous numeric text parser (spec.md §4.2). Thousand separators
/// `.`, `,`, and a space are all accepted; the fractional part's width is
/// resolved by scanning the *last* non-digit character in the string and
/// treating everything after it as the fraction, of whatever width it is.
#[derive(Debug, Default)]
pub struct DefaultNumericParser;

impl DefaultNumericParser {
    fn try_parse(&self, raw: &str) -> Result<Decimal, ClaimError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClaimError::NumericParse("empty input".into()));
        }

        let (negative, body) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_suffix('-') {
            (true, stripped)
        } else {
            (false, trimmed)
        };

        let last_separator = body
            .char_indices()
            .rev()
            .find(|(_, c)| !c.is_ascii_digit());

        let (integer_digits, fraction_digits) = match last_separator {
            Some((idx, _)) => {
                let (int_part, frac_part) = body.split_at(idx);
                let frac_part = &frac_part[1..]; // drop the separator itself
                (strip_separators(int_part), frac_part.to_string())
            }
            None => (strip_separators(body), String::new()),
        };

        if integer_digits.is_empty() && fraction_digits.is_empty() {
            return Err(ClaimError::NumericParse(format!("no digits in '{raw}'")));
        }

        let canonical = if fraction_digits.is_empty() {
            integer_digits
        } else {
            format!("{integer_digits}.{fraction_digits}")
        };

        let mut value = Decimal::from_str(&canonical)
            .map_err(|e| ClaimError::NumericParse(format!("'{raw}' is not numeric: {e}")))?;
        if negative {
            value.set_sign_negative(true);
        }
        Ok(value)
    }
}

fn strip_separators(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

impl NumericParser for DefaultNumericParser {
    fn parse(&self, raw: &str, target: NumericTarget, strict: bool) -> Result<NumericValue, ClaimError> {
        match self.try_parse(raw) {
            Ok(decimal) => Ok(match target {
                NumericTarget::Float => NumericValue::Float(decimal),
                NumericTarget::Int => {
                    use rust_decimal::prelude::ToPrimitive;
                    match decimal.trunc().to_i64() {
                        Some(i) => NumericValue::Int(i),
                        None => {
                            if strict {
                                return Err(ClaimError::NumericParse(format!(
                                    "'{raw}' does not fit in an i64"
                                )));
                            }
                            NumericValue::Raw(raw.to_string())
                        }
                    }
                }
            }),
            Err(e) => {
                if strict {
                    Err(e)
                } else {
                    Ok(NumericValue::Raw(raw.to_string()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse_float(raw: &str) -> Decimal {
        match DefaultNumericParser.parse(raw, NumericTarget::Float, true).unwrap() {
            NumericValue::Float(d) => d,
            other => panic!("expected Float, got {other:?}"),
        }
    }

    #[test]
    fn parses_dot_thousands_comma_decimal() {
        assert_eq!(parse_float("1.234,56"), dec!(1234.56));
    }

    #[test]
    fn parses_comma_thousands_dot_decimal() {
        assert_eq!(parse_float("1,234.56"), dec!(1234.56));
    }

    #[test]
    fn parses_space_thousands() {
        assert_eq!(parse_float("1 234.56"), dec!(1234.56));
    }

    #[test]
    fn parses_plain_integer() {
        assert_eq!(parse_float("1500"), dec!(1500));
    }

    #[test]
    fn parses_trailing_sign() {
        assert_eq!(parse_float("123,45-"), dec!(-123.45));
    }

    #[test]
    fn lenient_mode_returns_raw_on_failure() {
        let result = DefaultNumericParser.parse("not a number", NumericTarget::Float, false).unwrap();
        assert_eq!(result, NumericValue::Raw("not a number".into()));
    }

    #[test]
    fn strict_mode_raises_on_failure() {
        assert!(DefaultNumericParser.parse("not a number", NumericTarget::Float, true).is_err());
    }

    mod roundtrip {
        use super::*;
        use proptest::prelude::*;

        fn format_german(integer: u32, fraction: u8) -> String {
            format!("{integer},{fraction:02}")
        }

        proptest! {
            #[test]
            fn german_format_roundtrips(integer in 0u32..1_000_000, fraction in 0u8..100) {
                let text = format_german(integer, fraction);
                let parsed = parse_float(&text);
                let expected = Decimal::new(integer as i64 * 100 + fraction as i64, 2);
                prop_assert_eq!(parsed, expected);
            }
        }
    }
}
