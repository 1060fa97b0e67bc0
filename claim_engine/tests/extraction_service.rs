use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use claim_domain::entities::template::{FieldPattern, Template, TemplateOptions};
use claim_domain::entities::{DocumentRecord, FieldValue};
use claim_domain::error::ClaimError;
use claim_domain::repositories::template_registry::TemplateRegistry;
use claim_domain::services::extraction_service::ExtractionService;
use claim_domain::value_objects::{Category, DocumentHash, Kind, TemplateId};
use claim_engine::infrastructure::adapters::OcrClient;
use claim_engine::infrastructure::services::extraction_service::DefaultExtractionService;
use claim_engine::infrastructure::services::line_item_reconcilers::LineItemReconcilerRegistry;
use claim_engine::infrastructure::services::DefaultNumericParser;

struct UnusedOcrClient;

#[async_trait]
impl OcrClient for UnusedOcrClient {
    async fn extract_text(&self, _pdf_bytes: &[u8], _route: &str) -> Result<String, ClaimError> {
        panic!("OCR should not be called when the document record already carries raw_text");
    }
}

struct FixedTemplateRegistry {
    templates: Vec<Template>,
}

impl TemplateRegistry for FixedTemplateRegistry {
    fn candidates(&self, issuer: &str) -> Vec<&Template> {
        self.templates.iter().filter(|t| t.issuer_upper() == issuer.to_ascii_uppercase()).collect()
    }

    fn get(&self, template_id: &TemplateId) -> Option<&Template> {
        self.templates.iter().find(|t| &t.template_id == template_id)
    }
}

fn obi_return_template() -> Template {
    Template {
        template_id: TemplateId::parse("OBI_DE_0001").unwrap(),
        issuer: "OBI_DE".into(),
        kind: Kind::Debit,
        name: "Retoure".into(),
        allowed_categories: BTreeSet::from([Category::Return]),
        inclusive_keywords: vec!["Retoure".into()],
        exclusive_keywords: vec![],
        options: TemplateOptions::default(),
        fields: BTreeMap::from([
            ("amount".to_string(), FieldPattern::Single(r"Amount: (\d+,\d{2})".into())),
            ("document_number".to_string(), FieldPattern::Single(r"Doc: (\d+)".into())),
        ]),
        optional_fields: BTreeSet::from(["document_number".to_string()]),
    }
}

fn obi_invoice_template() -> Template {
    let mut t = obi_return_template();
    t.template_id = TemplateId::parse("OBI_DE_0002").unwrap();
    t.name = "Rechnung".into();
    t.allowed_categories = BTreeSet::from([Category::Invoice]);
    t.inclusive_keywords = vec!["Rechnung".into()];
    t
}

fn service(templates: Vec<Template>) -> DefaultExtractionService {
    DefaultExtractionService::new(
        Arc::new(UnusedOcrClient),
        Arc::new(FixedTemplateRegistry { templates }),
        Arc::new(DefaultNumericParser),
        Arc::new(LineItemReconcilerRegistry::new()),
        "ocr-route".into(),
    )
}

fn record_with_text(text: &str) -> DocumentRecord {
    let mut record = DocumentRecord::new_received(DocumentHash::of(text.as_bytes()), "INBOX".into(), "input/x.pdf".into());
    record.raw_text = Some(text.to_string());
    record
}

#[tokio::test]
async fn extracts_required_and_optional_fields() {
    let svc = service(vec![obi_return_template()]);
    let record = record_with_text("Retoure Amount: 123,45 Doc: 987");

    let outcome = svc.extract(&record, "OBI_DE", false).await.unwrap();

    assert_eq!(outcome.template_id.as_str(), "OBI_DE_0001");
    assert_eq!(outcome.data.amount(), Some("123.45".parse().unwrap()));
    assert_eq!(outcome.data.get("document_number"), Some(&FieldValue::Integer(987)));
}

#[tokio::test]
async fn missing_required_field_fails_extraction() {
    let svc = service(vec![obi_return_template()]);
    let record = record_with_text("Retoure Doc: 987");

    let result = svc.extract(&record, "OBI_DE", false).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn no_matching_template_fails_extraction() {
    let svc = service(vec![obi_return_template()]);
    let record = record_with_text("Gutschrift ohne Schluesselwort");

    let result = svc.extract(&record, "OBI_DE", false).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn ambiguous_templates_fail_extraction() {
    let mut return_and_invoice = obi_return_template();
    return_and_invoice.inclusive_keywords.push("Rechnung".into());
    let svc = service(vec![return_and_invoice, obi_invoice_template()]);
    let record = record_with_text("Retoure Rechnung Amount: 123,45 Doc: 987");

    let result = svc.extract(&record, "OBI_DE", false).await;
    assert!(matches!(result, Err(ClaimError::AmbiguousTemplate { .. })));
}

#[tokio::test]
async fn unknown_issuer_fails_with_template_not_found() {
    let svc = service(vec![obi_return_template()]);
    let record = record_with_text("Retoure Amount: 123,45 Doc: 987");

    let result = svc.extract(&record, "UNKNOWN_ISSUER", false).await;
    assert!(matches!(result, Err(ClaimError::TemplateNotFound { .. })));
}
