use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::entities::{DocumentRecord, ExtractedData, LineItem};
use crate::error::ClaimError;
use crate::value_objects::TemplateId;

/// Per-template/per-customer line-item arithmetic strategy (spec.md §4.2,
/// §9's "interchangeable strategies keyed by template_id"). `(rows,
/// doc_total) → rows' | None`: returns `None` — not an error — when the
/// arithmetic doesn't reconcile, so the caller drops `items` without failing
/// extraction overall.
pub trait LineItemReconciler: Send + Sync {
    fn reconcile(&self, rows: &[LineItem], doc_total: Decimal) -> Option<Vec<LineItem>>;
}

/// Result of a successful extraction: the typed data plus the template that
/// matched. Downstream stages (categorizer, compiler) key their own lookups
/// off `template_id`, so it has to travel with the data rather than be
/// re-derived by re-running template selection.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub template_id: TemplateId,
    pub data: ExtractedData,
}

/// Turns a PDF's text into a typed [`ExtractedData`] record (spec.md §4.2).
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// Runs the full algorithm: OCR (cached on the record unless
    /// `force_reextract`), template selection, normalization, field
    /// extraction, type coercion, line-item reconciliation.
    async fn extract(&self, record: &DocumentRecord, issuer: &str, force_reextract: bool) -> Result<ExtractionOutcome, ClaimError>;
}
