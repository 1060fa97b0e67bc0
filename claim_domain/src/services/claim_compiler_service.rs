use async_trait::async_trait;

use crate::aggregates::ClaimContext;
use crate::entities::{AccountMap, ExtractedData, ProcessingRule, Template};
use crate::error::ClaimError;
use crate::value_objects::Category;

/// Assembles the immutable [`ClaimContext`] from extracted data, a
/// processing rule, and account maps (spec.md §4.5). Accounting-document
/// resolution may need to query the ERP (`find_accounting_documents`), so
/// this is async.
#[async_trait]
pub trait ClaimCompilerService: Send + Sync {
    async fn compile(
        &self,
        template: &Template,
        category: Option<Category>,
        data: &ExtractedData,
        rule: &ProcessingRule,
        account_map: Option<&AccountMap>,
    ) -> Result<ClaimContext, ClaimError>;
}
