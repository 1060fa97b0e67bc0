use std::sync::Arc;

use claim_domain::entities::document_record::DocumentStatus;
use claim_domain::error::ClaimError;
use claim_domain::repositories::DocumentRepository;
use claim_domain::services::extraction_service::{ExtractionOutcome, ExtractionService};
use serde_json::json;
use tracing::instrument;

use crate::application::commands::ExtractCommand;

/// Extractor stage (spec.md §4.8's `registered` → `extracted` /
/// `extraction_error` transition). Persists the matched template alongside
/// the typed data so later stages don't have to re-run template selection.
pub struct ExtractDocumentUseCase {
    extraction: Arc<dyn ExtractionService>,
    repo: Arc<dyn DocumentRepository>,
}

impl ExtractDocumentUseCase {
    pub fn new(extraction: Arc<dyn ExtractionService>, repo: Arc<dyn DocumentRepository>) -> Self {
        Self { extraction, repo }
    }

    #[instrument(skip(self))]
    pub async fn run(&self, cmd: &ExtractCommand) -> Result<ExtractionOutcome, ClaimError> {
        let record = self
            .repo
            .get_record(cmd.record_id)
            .await?
            .ok_or_else(|| ClaimError::InvalidConfiguration(format!("no document record {}", cmd.record_id)))?;

        match self.extraction.extract(&record, &cmd.issuer, cmd.force_reextract).await {
            Ok(outcome) => {
                let mut updated = record;
                updated.status = DocumentStatus::Extracted;
                updated.extracted_data = Some(json!({
                    "template_id": outcome.template_id.as_str(),
                    "data": outcome.data,
                }));
                self.repo.update_record(updated).await?;
                Ok(outcome)
            }
            Err(error) => {
                let mut updated = record;
                updated.status = DocumentStatus::ExtractionError;
                updated.append_log(&error.to_string());
                self.repo.update_record(updated).await?;
                Err(error)
            }
        }
    }
}
