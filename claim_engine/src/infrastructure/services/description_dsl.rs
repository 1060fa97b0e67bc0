use std::collections::HashMap;

use claim_domain::error::ClaimError;
use once_cell::sync::Lazy;
use regex::Regex;

/// One `<field>` / `<?field>` / `<3field>` placeholder occurrence in a rule
/// description template (spec.md §4.5, §9's placeholder-substitution DSL).
struct Token {
    full_match: String,
    optional_marks: usize,
    pad_width: Option<usize>,
    field: String,
}

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(\?*)(\d*)([A-Za-z_][A-Za-z0-9_]*)>").unwrap());

fn parse_tokens(template: &str) -> Vec<Token> {
    TOKEN_RE
        .captures_iter(template)
        .map(|c| Token {
            full_match: c.get(0).unwrap().as_str().to_string(),
            optional_marks: c.get(1).unwrap().as_str().len(),
            pad_width: c.get(2).unwrap().as_str().parse().ok(),
            field: c.get(3).unwrap().as_str().to_string(),
        })
        .collect()
}

fn format_value(value: &str, pad_width: Option<usize>) -> String {
    match pad_width {
        Some(width) => format!("{value:0>width$}"),
        None => value.to_string(),
    }
}

/// Renders a description template against bound field values (spec.md
/// §4.5). `values` carries `None` for fields known to the rule but absent
/// in this claim's extracted data.
///
/// Steps: verify every required (non-`?`) token is bound, else
/// [`ClaimError::UnboundToken`]; drop optional tokens whose value is null
/// together with the single separator character immediately preceding them;
/// when more than one optional token for the same field remains, keep the
/// one with the fewest `?` marks; substitute; strip leading/trailing
/// non-word characters. The result never contains `<`, `>`, `?`, or the
/// literal `None`.
pub fn render(template: &str, values: &HashMap<String, Option<String>>) -> Result<String, ClaimError> {
    let tokens = parse_tokens(template);

    for token in &tokens {
        if token.optional_marks == 0 && !matches!(values.get(&token.field), Some(Some(_))) {
            return Err(ClaimError::UnboundToken { token: token.field.clone() });
        }
    }

    // Among multiple optional occurrences of the same field, keep only the
    // one with the fewest `?` marks.
    let mut best_optional_marks: HashMap<&str, usize> = HashMap::new();
    for token in &tokens {
        if token.optional_marks > 0 {
            best_optional_marks
                .entry(token.field.as_str())
                .and_modify(|marks| *marks = (*marks).min(token.optional_marks))
                .or_insert(token.optional_marks);
        }
    }

    let mut out = template.to_string();
    for token in &tokens {
        let is_null = matches!(values.get(&token.field), None | Some(None));
        let is_redundant_optional = token.optional_marks > 0
            && best_optional_marks.get(token.field.as_str()) != Some(&token.optional_marks);

        if (token.optional_marks > 0 && is_null) || is_redundant_optional {
            out = remove_token_and_preceding_separator(&out, &token.full_match);
            continue;
        }

        if let Some(Some(value)) = values.get(&token.field) {
            let rendered = format_value(value, token.pad_width);
            out = out.replacen(&token.full_match, &rendered, 1);
        }
    }

    let trimmed = out.trim_matches(|c: char| !c.is_alphanumeric() && c != '_').to_string();

    if trimmed.contains('<') || trimmed.contains('>') || trimmed.contains('?') || trimmed.contains("None") {
        return Err(ClaimError::InvalidClaimContext {
            detail: format!("description generator produced an unresolved placeholder: '{trimmed}'"),
        });
    }

    Ok(trimmed)
}

fn remove_token_and_preceding_separator(text: &str, token: &str) -> String {
    match text.find(token) {
        Some(idx) => {
            let mut start = idx;
            if start > 0 {
                let preceding_char_len = text[..start].chars().next_back().map(|c| c.len_utf8()).unwrap_or(0);
                start -= preceding_char_len;
            }
            let end = idx + token.len();
            format!("{}{}", &text[..start], &text[end..])
        }
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, Option<&str>)]) -> HashMap<String, Option<String>> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.map(String::from))).collect()
    }

    #[test]
    fn required_token_must_be_bound() {
        let result = render("Retoure <amount>", &values(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn optional_null_token_and_separator_dropped() {
        let result = render("Retoure <amount> <?note>", &values(&[("amount", Some("123")), ("note", None)])).unwrap();
        assert_eq!(result, "Retoure 123");
    }

    #[test]
    fn pad_width_zero_pads() {
        let result = render("<3branch>", &values(&[("branch", Some("7"))])).unwrap();
        assert_eq!(result, "007");
    }

    #[test]
    fn never_leaves_placeholder_markers() {
        let result = render("<amount>", &values(&[("amount", Some("1"))])).unwrap();
        assert!(!result.contains('<') && !result.contains('>') && !result.contains('?'));
    }
}
