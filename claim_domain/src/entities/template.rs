use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ClaimError;
use crate::value_objects::{Category, Kind, TemplateId};

/// One `[from_regex, to]` text replacement applied during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacePair {
    pub from: String,
    pub to: String,
}

/// Input-normalization options applied before keyword matching and field
/// extraction (spec.md §4.1, §6).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOptions {
    #[serde(default)]
    pub remove_whitespace: bool,
    #[serde(default)]
    pub lowercase: bool,
    #[serde(default)]
    pub replace: Vec<ReplacePair>,
    #[serde(default)]
    pub date_formats: Vec<String>,
}

impl TemplateOptions {
    /// Applies `replace` pairs, then optional lowercase, then optional
    /// whitespace collapse, in that order (spec.md §4.1).
    pub fn normalize(&self, text: &str) -> Result<String, ClaimError> {
        let mut out = text.to_string();
        for pair in &self.replace {
            let re = Regex::new(&pair.from).map_err(|e| ClaimError::TemplateLoad {
                path: String::new(),
                detail: format!("invalid replace pattern '{}': {e}", pair.from),
            })?;
            out = re.replace_all(&out, pair.to.as_str()).into_owned();
        }
        if self.lowercase {
            out = out.to_lowercase();
        }
        if self.remove_whitespace {
            out = out.split_whitespace().collect::<Vec<_>>().join(" ");
        }
        Ok(out)
    }
}

/// A field's extraction rule: try each regex in order, take the first with
/// at least one match (spec.md §4.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldPattern {
    Single(String),
    Alternatives(Vec<String>),
}

impl FieldPattern {
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            FieldPattern::Single(p) => vec![p.as_str()],
            FieldPattern::Alternatives(ps) => ps.iter().map(String::as_str).collect(),
        }
    }
}

/// Read-only, immutable-per-load extraction template (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub template_id: TemplateId,
    pub issuer: String,
    pub kind: Kind,
    pub name: String,
    #[serde(default)]
    pub allowed_categories: BTreeSet<Category>,
    pub inclusive_keywords: Vec<String>,
    #[serde(default)]
    pub exclusive_keywords: Vec<String>,
    #[serde(default)]
    pub options: TemplateOptions,
    pub fields: BTreeMap<String, FieldPattern>,
    #[serde(default)]
    pub optional_fields: BTreeSet<String>,
}

/// Fields that must resolve to a single value or extraction fails; `items`
/// is deliberately excluded — it is the sole field that preserves duplicates
/// and order (spec.md §4.2).
pub const UNIQUE_VALUE_FIELDS: &[&str] = &[
    "amount",
    "document_number",
    "archive_number",
    "return_number",
    "agreement_number",
    "supplier",
    "subtotals",
    "identifier",
    "branch",
    "zip",
];

impl Template {
    /// Structural validation per the registry's load contract (spec.md
    /// §4.1). Normalizes `issuer` upper-case, `kind` is already a closed
    /// enum, `template_id` is normalized by its own parser.
    pub fn validate(&self) -> Result<(), ClaimError> {
        let fail = |detail: String| ClaimError::TemplateLoad {
            path: self.template_id.to_string(),
            detail,
        };

        if self.issuer.trim().is_empty() {
            return Err(fail("issuer is required".into()));
        }
        if self.name.trim().is_empty() {
            return Err(fail("name is required".into()));
        }
        if matches!(self.kind, Kind::Debit) && self.allowed_categories.is_empty() {
            return Err(fail("category is required when kind = debit".into()));
        }
        if self.inclusive_keywords.is_empty() {
            return Err(fail("inclusive_keywords must not be empty".into()));
        }
        for name in &self.optional_fields {
            if !self.fields.contains_key(name) {
                return Err(fail(format!(
                    "optional_fields entry '{name}' does not name a declared field"
                )));
            }
        }
        for pattern in self
            .inclusive_keywords
            .iter()
            .chain(self.exclusive_keywords.iter())
            .chain(self.fields.values().flat_map(|p| p.patterns()))
        {
            Regex::new(pattern).map_err(|e| fail(format!("invalid regex '{pattern}': {e}")))?;
        }
        Ok(())
    }

    pub fn issuer_upper(&self) -> String {
        self.issuer.to_ascii_uppercase()
    }

    /// Required fields = declared fields minus `optional_fields` (spec.md
    /// §4.2 step 6).
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .keys()
            .filter(|name| !self.optional_fields.contains(*name))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_template() -> Template {
        Template {
            template_id: TemplateId::parse("OBI_DE_0001").unwrap(),
            issuer: "OBI_DE".into(),
            kind: Kind::Debit,
            name: "Retoure".into(),
            allowed_categories: BTreeSet::from([Category::Return]),
            inclusive_keywords: vec!["Retoure".into()],
            exclusive_keywords: vec![],
            options: TemplateOptions::default(),
            fields: BTreeMap::from([("amount".to_string(), FieldPattern::Single(r"\d+".into()))]),
            optional_fields: BTreeSet::new(),
        }
    }

    #[test]
    fn valid_template_passes() {
        assert!(minimal_template().validate().is_ok());
    }

    #[test]
    fn debit_without_category_fails() {
        let mut t = minimal_template();
        t.allowed_categories.clear();
        assert!(t.validate().is_err());
    }

    #[test]
    fn optional_field_must_be_declared() {
        let mut t = minimal_template();
        t.optional_fields.insert("not_declared".into());
        assert!(t.validate().is_err());
    }

    #[test]
    fn empty_inclusive_keywords_fails() {
        let mut t = minimal_template();
        t.inclusive_keywords.clear();
        assert!(t.validate().is_err());
    }
}
