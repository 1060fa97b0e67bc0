use crate::entities::{ExtractedData, Template};
use crate::error::ClaimError;
use crate::value_objects::Category;

/// Collapses an ambiguous template-allowed category list into a single
/// [`Category`] for debit notes (spec.md §4.3). Credit notes never call
/// this — they have no category.
pub trait CategorizationService: Send + Sync {
    fn categorize(
        &self,
        template: &Template,
        applied_message_category: Option<&str>,
        data: &ExtractedData,
        record_id: i64,
    ) -> Result<Category, ClaimError>;
}
