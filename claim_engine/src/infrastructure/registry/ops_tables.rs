use std::collections::HashMap;
use std::path::Path;

use claim_domain::entities::account_map::AccountMapKeying;
use claim_domain::error::ClaimError;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::infrastructure::services::claim_compiler_service::TaxCodeTable;

/// Small operational tables the compiler/reconciler need at construction
/// time: per-issuer account-map keying strategy, per-company tax-rate →
/// Status-AC code table, and per-priority CS task responsible. Unlike
/// templates/rules/account maps (one file per issuer, loaded via the
/// `Yaml*Registry` family), these are few enough rows to keep in one file.
#[derive(Debug, Deserialize)]
pub struct OpsTables {
    #[serde(default)]
    pub account_keying: HashMap<String, AccountMapKeying>,
    #[serde(default)]
    pub tax_codes: HashMap<u16, Vec<(Decimal, String)>>,
    #[serde(default)]
    pub cs_task_responsible: HashMap<String, String>,
    #[serde(default)]
    pub category_priority: Vec<CategoryPriorityRow>,
}

/// One row of the category-code/priority table (spec.md §4.6): keyed on
/// `company_code` × `shipping_point` × over/under threshold. `shipping_point:
/// None` is a wildcard row, matched when no more specific row (or no
/// shipping point at all) is available.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPriorityRow {
    pub company_code: u16,
    #[serde(default)]
    pub shipping_point: Option<String>,
    pub over_threshold: bool,
    pub category_code: String,
    pub priority: String,
}

impl OpsTables {
    pub fn load(path: &Path) -> Result<Self, ClaimError> {
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| ClaimError::TemplateLoad {
            path: path.display().to_string(),
            detail: e.to_string(),
        })
    }

    pub fn tax_code_table(&self) -> TaxCodeTable {
        self.tax_codes.clone()
    }
}
