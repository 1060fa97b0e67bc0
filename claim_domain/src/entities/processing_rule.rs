use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::value_objects::{Category, CompanyCode, ReferenceBy, Threshold, Tolerance};

/// One named ruleset (`claim_create`, `case_add`, or `case_update`) within a
/// processing rule file (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub description: String,
    #[serde(default)]
    pub reference_by: Option<ReferenceBy>,
    pub processor: String,
    pub coordinator: String,
    #[serde(default)]
    pub responsible: Option<String>,
    #[serde(default)]
    pub status_sales: Option<String>,
    #[serde(default)]
    pub status_ac: Option<String>,
    pub attachment_name: String,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

/// Alias kept for the common case where callers only mean the
/// `claim_create` ruleset; distinguished by name at call sites.
pub type ClaimCreateRule = RuleSet;

/// Immutable per-load processing rule, keyed by (issuer, template_id,
/// optional category) (spec.md §3, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingRule {
    pub template_id: String,
    pub company_code: CompanyCode,
    pub threshold: Threshold,
    pub tolerance: Tolerance,
    /// Forbidden for credit notes.
    #[serde(default)]
    pub category: BTreeSet<Category>,
    pub claim_create: RuleSet,
    /// Forbidden for bonus/promo/quality categories.
    #[serde(default)]
    pub case_add: Option<RuleSet>,
    #[serde(default)]
    pub case_update: Option<RuleSet>,
}

impl ProcessingRule {
    /// `case_add` is forbidden for bonus/promo/quality (spec.md §6); those
    /// categories skip straight to ZQM creation, never an add-case path.
    pub fn case_add_forbidden_for(&self, category: Option<Category>) -> bool {
        matches!(
            category,
            Some(Category::Bonus | Category::Promo | Category::Quality)
        )
    }

    pub fn tolerance_decimal(&self) -> Decimal {
        self.tolerance.value()
    }
}
