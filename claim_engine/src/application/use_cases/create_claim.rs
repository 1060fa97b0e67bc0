use std::sync::Arc;

use claim_domain::entities::document_record::DocumentStatus;
use claim_domain::entities::{DocumentRecord, ExtractedData};
use claim_domain::error::ClaimError;
use claim_domain::repositories::{AccountMapRegistry, DocumentRepository, ProcessingRuleRegistry, TemplateRegistry};
use claim_domain::services::{CategorizationService, ClaimCompilerService, ErpReconcilerService, ReconcileOutcome};
use claim_domain::value_objects::{Kind, TemplateId};
use tracing::instrument;

use crate::application::commands::CreateClaimCommand;

/// Categorizes (debit notes only), compiles, and reconciles one extracted
/// document against the ERP (spec.md §4.8's `extracted` → `completed` /
/// `duplicate` / `processing_error` / `claim_case_unmatched` transition).
pub struct CreateClaimUseCase {
    templates: Arc<dyn TemplateRegistry>,
    rules: Arc<dyn ProcessingRuleRegistry>,
    accounts: Arc<dyn AccountMapRegistry>,
    categorizer: Arc<dyn CategorizationService>,
    compiler: Arc<dyn ClaimCompilerService>,
    reconciler: Arc<dyn ErpReconcilerService>,
    repo: Arc<dyn DocumentRepository>,
}

impl CreateClaimUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        templates: Arc<dyn TemplateRegistry>,
        rules: Arc<dyn ProcessingRuleRegistry>,
        accounts: Arc<dyn AccountMapRegistry>,
        categorizer: Arc<dyn CategorizationService>,
        compiler: Arc<dyn ClaimCompilerService>,
        reconciler: Arc<dyn ErpReconcilerService>,
        repo: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self { templates, rules, accounts, categorizer, compiler, reconciler, repo }
    }

    /// Reads back the `{template_id, data}` envelope the extractor stage
    /// wrote into `extracted_data` (spec.md §3's "extracted structured
    /// data" carries whatever shape the engine needs; the template_id has to
    /// travel with the fields since template selection isn't repeated here).
    fn load_extraction(record: &DocumentRecord) -> Result<(TemplateId, ExtractedData), ClaimError> {
        let value = record
            .extracted_data
            .clone()
            .ok_or_else(|| ClaimError::InvalidConfiguration(format!("document {} has no extracted data", record.id)))?;

        let template_id = value
            .get("template_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ClaimError::InvalidConfiguration(format!("document {} is missing its matched template_id", record.id)))?;
        let template_id = TemplateId::parse(template_id)?;

        let data: ExtractedData = serde_json::from_value(value.get("data").cloned().unwrap_or(serde_json::Value::Null))
            .map_err(|e| ClaimError::InvalidConfiguration(format!("document {} has malformed extracted data: {e}", record.id)))?;

        Ok((template_id, data))
    }

    /// The account map registry keys on `"{CUSTOMER}_{COUNTRY}"`; an
    /// issuer like `OBI_DE` splits cleanly on its first underscore.
    fn account_map_key(issuer: &str) -> String {
        match issuer.split_once('_') {
            Some((customer, country)) => format!("{}_{}", customer.to_ascii_uppercase(), country.to_ascii_uppercase()),
            None => issuer.to_ascii_uppercase(),
        }
    }

    #[instrument(skip(self))]
    pub async fn run(&self, cmd: &CreateClaimCommand) -> Result<ReconcileOutcome, ClaimError> {
        let record = self
            .repo
            .get_record(cmd.record_id)
            .await?
            .ok_or_else(|| ClaimError::InvalidConfiguration(format!("no document record {}", cmd.record_id)))?;

        let (template_id, data) = Self::load_extraction(&record)?;
        let template = self
            .templates
            .get(&template_id)
            .ok_or_else(|| ClaimError::TemplateNotFound { issuer: template_id.to_string() })?;

        let category = match template.kind {
            Kind::Credit => None,
            Kind::Debit => Some(self.categorizer.categorize(template, cmd.applied_message_category.as_deref(), &data, record.id)?),
        };

        let rule = self
            .rules
            .get(&template_id, category)
            .ok_or_else(|| ClaimError::InvalidConfiguration(format!("no processing rule for template {template_id} / category {category:?}")))?;

        let account_map = self.accounts.get(&Self::account_map_key(&template.issuer));

        let ctx = self.compiler.compile(template, category, &data, rule, account_map).await?;
        let pdf_bytes = tokio::fs::read(&record.file_location).await?;
        let outcome = self.reconciler.reconcile(&ctx, &pdf_bytes, cmd.ignore_already_existing).await;

        let mut updated = record;
        updated.status = match &outcome {
            ReconcileOutcome::Created { case_id } => {
                updated.case_id = Some(case_id.clone());
                DocumentStatus::Completed
            }
            ReconcileOutcome::Duplicated { case_id } => {
                updated.case_id = case_id.clone();
                DocumentStatus::Duplicate
            }
            ReconcileOutcome::NotApplicable { reason } => {
                updated.append_log(reason);
                DocumentStatus::ClaimCaseUnmatched
            }
            ReconcileOutcome::Failed(error) => {
                updated.append_log(&error.to_string());
                DocumentStatus::ProcessingError
            }
        };
        self.repo.update_record(updated).await?;

        Ok(outcome)
    }
}
