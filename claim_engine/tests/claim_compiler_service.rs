use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use claim_domain::entities::account_map::{AccountMapKeying, AccountMapRow};
use claim_domain::entities::template::{FieldPattern, Template, TemplateOptions};
use claim_domain::entities::{AccountMap, ExtractedData, FieldValue, ProcessingRule, RuleSet};
use claim_domain::error::ClaimError;
use claim_domain::services::claim_compiler_service::ClaimCompilerService;
use claim_domain::value_objects::{Category, CompanyCode, Kind, ReferenceBy, ReferenceField, TemplateId, Threshold, Tolerance, TransactionTag};
use claim_engine::infrastructure::adapters::erp_client::{CreateNotificationRequest, DisputeDetail, NotificationHeader, TableRow};
use claim_engine::infrastructure::adapters::ErpClient;
use claim_engine::infrastructure::services::claim_compiler_service::DefaultClaimCompilerService;
use rust_decimal_macros::dec;

struct UnusedErpClient;

#[async_trait]
impl ErpClient for UnusedErpClient {
    async fn read_table(&self, _table: &str, _filter: &str, _fields: &[&str]) -> Result<Vec<TableRow>, ClaimError> {
        panic!("not expected when both invoice and delivery numbers are already present")
    }
    async fn create_notification(&self, _req: &CreateNotificationRequest) -> Result<String, ClaimError> {
        unreachable!()
    }
    async fn get_notification(&self, _notification_id: &str) -> Result<NotificationHeader, ClaimError> {
        unreachable!()
    }
    async fn reactivate_notification(&self, _notification_id: &str) -> Result<(), ClaimError> {
        unreachable!()
    }
    async fn post_claim_dispute(&self, _notification_id: &str) -> Result<String, ClaimError> {
        unreachable!()
    }
    async fn get_dispute_detail(&self, _case_id: &str) -> Result<DisputeDetail, ClaimError> {
        unreachable!()
    }
    async fn change_dispute_attributes(&self, _case_id: &str, _attrs: &HashMap<String, String>) -> Result<(), ClaimError> {
        unreachable!()
    }
    async fn create_task(&self, _case_id: &str, _task_kind: &str, _responsible: Option<&str>) -> Result<String, ClaimError> {
        unreachable!()
    }
    async fn change_task_status(&self, _task_id: &str, _status: u8) -> Result<(), ClaimError> {
        unreachable!()
    }
    async fn create_binary_relation(&self, _case_id: &str, _document_id: &str) -> Result<(), ClaimError> {
        unreachable!()
    }
    async fn upload_office_document(&self, _bytes: &[u8], _name: &str) -> Result<String, ClaimError> {
        unreachable!()
    }
    async fn find_accounting_documents(&self, _reference: &str, _account: Option<&str>) -> Result<Vec<String>, ClaimError> {
        Ok(Vec::new())
    }
    async fn shipping_point_for_delivery(&self, _delivery_number: &str) -> Result<Option<String>, ClaimError> {
        unreachable!()
    }
}

fn return_template() -> Template {
    Template {
        template_id: TemplateId::parse("OBI_DE_0001").unwrap(),
        issuer: "OBI_DE".into(),
        kind: Kind::Debit,
        name: "Retoure".into(),
        allowed_categories: BTreeSet::from([Category::Return]),
        inclusive_keywords: vec!["Retoure".into()],
        exclusive_keywords: vec![],
        options: TemplateOptions::default(),
        fields: Default::default(),
        optional_fields: Default::default(),
    }
}

fn credit_template() -> Template {
    let mut t = return_template();
    t.kind = Kind::Credit;
    t.allowed_categories = BTreeSet::new();
    t
}

fn qm_rule() -> ProcessingRule {
    ProcessingRule {
        template_id: "OBI_DE_0001".into(),
        company_code: CompanyCode::new(1001).unwrap(),
        threshold: Threshold::new(dec!(500)).unwrap(),
        tolerance: Tolerance::new(dec!(0.01)).unwrap(),
        category: BTreeSet::from([Category::Return]),
        claim_create: RuleSet {
            description: "Retoure <amount>".into(),
            reference_by: Some(ReferenceBy(vec![ReferenceField::InvoiceNumber])),
            processor: "P1".into(),
            coordinator: "C1".into(),
            responsible: None,
            status_sales: None,
            status_ac: None,
            attachment_name: "claim.pdf".into(),
            amount: None,
            user: None,
        },
        case_add: None,
        case_update: None,
    }
}

fn data_with_invoice_and_delivery() -> ExtractedData {
    let mut data = ExtractedData::default();
    data.set("amount", FieldValue::Decimal(dec!(123.45)));
    data.set("invoice_number", FieldValue::Text("123456789".into()));
    data.set("delivery_number", FieldValue::Text("312345678".into()));
    data
}

fn compiler() -> DefaultClaimCompilerService {
    DefaultClaimCompilerService::new(Arc::new(UnusedErpClient), HashMap::new(), HashMap::new())
}

#[tokio::test]
async fn debit_return_compiles_to_qm_notification_create() {
    let template = return_template();
    let rule = qm_rule();
    let data = data_with_invoice_and_delivery();

    let ctx = compiler().compile(&template, Some(Category::Return), &data, &rule, None).await.unwrap();

    assert!(matches!(ctx.header.transaction, TransactionTag::Qm));
    let notification = ctx.notification_create.expect("QM claims carry notification_create");
    assert_eq!(notification.reference_field, ReferenceField::InvoiceNumber);
    assert_eq!(notification.reference_value, "123456789");
    assert_eq!(notification.description, "Retoure 123.45");
}

#[tokio::test]
async fn bonus_category_routes_to_zqm() {
    let mut template = return_template();
    template.allowed_categories = BTreeSet::from([Category::Bonus]);
    let mut rule = qm_rule();
    rule.category = BTreeSet::from([Category::Bonus]);
    let data = data_with_invoice_and_delivery();

    let ctx = compiler().compile(&template, Some(Category::Bonus), &data, &rule, None).await.unwrap();

    assert!(matches!(ctx.header.transaction, TransactionTag::Zqm));
}

#[tokio::test]
async fn credit_note_requires_case_update_ruleset() {
    let template = credit_template();
    let rule = qm_rule(); // no case_update section
    let data = data_with_invoice_and_delivery();

    let result = compiler().compile(&template, None, &data, &rule, None).await;
    assert!(matches!(result, Err(ClaimError::InvalidClaimContext { .. })));
}

#[tokio::test]
async fn credit_note_with_case_update_compiles_to_dms() {
    let template = credit_template();
    let mut rule = qm_rule();
    rule.case_update = Some(RuleSet {
        description: "n/a".into(),
        reference_by: None,
        processor: "P1".into(),
        coordinator: "C1".into(),
        responsible: Some("R1".into()),
        status_sales: None,
        status_ac: None,
        attachment_name: "credit.pdf".into(),
        amount: None,
        user: None,
    });
    let data = data_with_invoice_and_delivery();

    let ctx = compiler().compile(&template, None, &data, &rule, None).await.unwrap();

    assert!(matches!(ctx.header.transaction, TransactionTag::Dms));
    let update = ctx.case_update.expect("DMS claims carry case_update");
    assert_eq!(update.amount, dec!(123.45));
}

fn obi_account_map() -> AccountMap {
    AccountMap {
        customer: "OBI".into(),
        country_code: "DE".into(),
        rows: vec![AccountMapRow {
            supplier: Some("4711".into()),
            business_unit: Some("100".into()),
            account: 800123,
        }],
    }
}

#[tokio::test]
async fn account_number_reference_resolves_from_the_account_map_not_extracted_data() {
    let template = return_template();
    let mut rule = qm_rule();
    rule.claim_create.reference_by = Some(ReferenceBy(vec![ReferenceField::AccountNumber]));

    let mut data = data_with_invoice_and_delivery();
    data.set("supplier", FieldValue::Text("4711".into()));
    data.set("business_unit", FieldValue::Text("100".into()));
    // An `account_number` field from the Extraction Engine must be ignored:
    // that field never exists in real extracted data, only the account map
    // does.
    data.set("account_number", FieldValue::Text("999999".into()));

    let mut account_keying = HashMap::new();
    account_keying.insert("OBI_DE".to_string(), AccountMapKeying::SupplierAndBusinessUnit);
    let compiler = DefaultClaimCompilerService::new(Arc::new(UnusedErpClient), HashMap::new(), account_keying);

    let account_map = obi_account_map();
    let ctx = compiler.compile(&template, Some(Category::Return), &data, &rule, Some(&account_map)).await.unwrap();

    let notification = ctx.notification_create.expect("QM claims carry notification_create");
    assert_eq!(notification.reference_field, ReferenceField::AccountNumber);
    assert_eq!(notification.reference_value, "800123");
    assert_eq!(notification.account_number, Some(800123));
}

#[tokio::test]
async fn missing_reference_data_fails_with_descriptive_error() {
    let template = return_template();
    let rule = qm_rule();
    let mut data = data_with_invoice_and_delivery();
    data.remove("invoice_number");
    data.remove("delivery_number");

    let result = compiler().compile(&template, Some(Category::Return), &data, &rule, None).await;
    assert!(matches!(result, Err(ClaimError::NoReferenceableData { .. })));
}
