use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use claim_domain::aggregates::{CaseSearch, CaseUpdate, ClaimContext, ClaimHeader, NotificationCreate};
use claim_domain::error::ClaimError;
use claim_domain::services::erp_reconciler_service::ReconcileOutcome;
use claim_domain::value_objects::{Category, CompanyCode, Kind, ReferenceField, TemplateId, Threshold, Tolerance, TransactionTag};
use claim_engine::infrastructure::adapters::erp_client::{CreateNotificationRequest, DisputeDetail, NotificationHeader, TableRow};
use claim_engine::infrastructure::adapters::{ErpClient, ErpSession};
use claim_engine::infrastructure::services::erp_reconciler_service::{DefaultErpReconcilerService, DuplicatePolicy};
use claim_domain::services::erp_reconciler_service::ErpReconcilerService;
use rust_decimal_macros::dec;

/// Scriptable [`ErpClient`] test double: canned table rows and dispute/
/// notification lookups, everything else a thin success stub.
#[derive(Default)]
struct ScriptedErpClient {
    dms_case_search_rows: Vec<TableRow>,
    notification_search_rows: Vec<TableRow>,
    dispute_details: HashMap<String, DisputeDetail>,
    notifications: HashMap<String, NotificationHeader>,
    created_notification_id: Mutex<Option<String>>,
    shipping_points: HashMap<String, String>,
}

fn row(case_id: &str) -> TableRow {
    HashMap::from([("CASE_ID".to_string(), case_id.to_string())])
}

#[async_trait]
impl ErpClient for ScriptedErpClient {
    async fn read_table(&self, table: &str, _filter: &str, _fields: &[&str]) -> Result<Vec<TableRow>, ClaimError> {
        match table {
            "DMS_CASE_SEARCH" => Ok(self.dms_case_search_rows.clone()),
            "NOTIFICATION_SEARCH" => Ok(self.notification_search_rows.clone()),
            other => panic!("unexpected table read: {other}"),
        }
    }

    async fn create_notification(&self, _req: &CreateNotificationRequest) -> Result<String, ClaimError> {
        let id = "NOTIF-NEW".to_string();
        *self.created_notification_id.lock().unwrap() = Some(id.clone());
        Ok(id)
    }

    async fn get_notification(&self, notification_id: &str) -> Result<NotificationHeader, ClaimError> {
        self.notifications.get(notification_id).cloned().ok_or_else(|| ClaimError::ErpCall {
            operation: "get_notification".into(),
            detail: format!("no such notification: {notification_id}"),
        })
    }

    async fn reactivate_notification(&self, _notification_id: &str) -> Result<(), ClaimError> {
        Ok(())
    }

    async fn post_claim_dispute(&self, _notification_id: &str) -> Result<String, ClaimError> {
        Ok("CASE-NEW".to_string())
    }

    async fn get_dispute_detail(&self, case_id: &str) -> Result<DisputeDetail, ClaimError> {
        self.dispute_details.get(case_id).cloned().ok_or_else(|| ClaimError::ErpCall {
            operation: "get_dispute_detail".into(),
            detail: format!("no attribute row for {case_id}"),
        })
    }

    async fn change_dispute_attributes(&self, _case_id: &str, _attrs: &HashMap<String, String>) -> Result<(), ClaimError> {
        Ok(())
    }

    async fn create_task(&self, _case_id: &str, _task_kind: &str, _responsible: Option<&str>) -> Result<String, ClaimError> {
        Ok("TASK-1".to_string())
    }

    async fn change_task_status(&self, _task_id: &str, _status: u8) -> Result<(), ClaimError> {
        Ok(())
    }

    async fn create_binary_relation(&self, _case_id: &str, _document_id: &str) -> Result<(), ClaimError> {
        Ok(())
    }

    async fn upload_office_document(&self, _bytes: &[u8], _name: &str) -> Result<String, ClaimError> {
        Ok("DOC-1".to_string())
    }

    async fn find_accounting_documents(&self, _reference: &str, _account: Option<&str>) -> Result<Vec<String>, ClaimError> {
        Ok(Vec::new())
    }

    async fn shipping_point_for_delivery(&self, delivery_number: &str) -> Result<Option<String>, ClaimError> {
        Ok(self.shipping_points.get(delivery_number).cloned())
    }
}

fn session(client: ScriptedErpClient) -> Arc<ErpSession> {
    Arc::new(ErpSession::new(Box::new(client), 1, Duration::from_millis(1)))
}

fn reconciler(client: ScriptedErpClient) -> DefaultErpReconcilerService {
    DefaultErpReconcilerService::new(session(client), DuplicatePolicy::First, HashMap::new(), Vec::new())
}

fn header(issuer: &str, transaction: TransactionTag) -> ClaimHeader {
    ClaimHeader {
        issuer: issuer.into(),
        kind: if matches!(transaction, TransactionTag::Dms) { Kind::Credit } else { Kind::Debit },
        category: if matches!(transaction, TransactionTag::Dms) { None } else { Some(Category::Bonus) },
        template_id: TemplateId::parse("OBI_DE_0001").unwrap(),
        transaction,
        company_code: CompanyCode::new(1001).unwrap(),
        threshold: Threshold::new(dec!(500)).unwrap(),
        tolerance: Tolerance::new(dec!(0.01)).unwrap(),
    }
}

fn zqm_context(issuer: &str) -> ClaimContext {
    ClaimContext::assemble(
        header(issuer, TransactionTag::Zqm),
        CaseSearch { title: "OBI_DE bonus".into(), customer_disputed_amount: Some(dec!(100)) },
        None,
        Some(NotificationCreate {
            reference_field: ReferenceField::InvoiceNumber,
            reference_value: "123456789".into(),
            description: "Bonus 100,00".into(),
            processor: "P1".into(),
            coordinator: "C1".into(),
            responsible: None,
            attachment_name: "claim.pdf".into(),
            status_ac: None,
            account_number: None,
            delivery_number: None,
        }),
        None,
    )
    .unwrap()
}

fn dms_context() -> ClaimContext {
    ClaimContext::assemble(
        header("OBI_DE", TransactionTag::Dms),
        CaseSearch { title: "OBI_DE credit".into(), customer_disputed_amount: Some(dec!(100)) },
        Some(CaseUpdate {
            status_sales_append: "100,00".into(),
            attachment_name: "credit.pdf".into(),
            amount: dec!(100),
            processor: None,
            coordinator: None,
            responsible: None,
        }),
        None,
        None,
    )
    .unwrap()
}

#[tokio::test]
async fn zqm_with_no_existing_case_creates_a_notification() {
    let client = ScriptedErpClient::default();
    let outcome = reconciler(client).reconcile(&zqm_context("OBI_DE"), b"%PDF", false).await;
    assert!(matches!(outcome, ReconcileOutcome::Created { .. }));
}

#[tokio::test]
async fn zqm_with_existing_case_is_duplicated() {
    let client = ScriptedErpClient {
        dms_case_search_rows: vec![row("CASE-1")],
        dispute_details: HashMap::from([(
            "CASE-1".to_string(),
            DisputeDetail {
                case_id: "CASE-1".into(),
                status: 1,
                disputed_amount: dec!(100),
                root_cause: None,
                status_sales: String::new(),
                status_ac: String::new(),
            },
        )]),
        ..Default::default()
    };
    let outcome = reconciler(client).reconcile(&zqm_context("OBI_DE"), b"%PDF", false).await;
    assert!(matches!(outcome, ReconcileOutcome::Duplicated { case_id: Some(ref id) } if id == "CASE-1"));
}

#[tokio::test]
async fn zqm_duplicate_for_bahag_issuer_is_a_hard_block() {
    let client = ScriptedErpClient {
        dms_case_search_rows: vec![row("CASE-1")],
        dispute_details: HashMap::from([(
            "CASE-1".to_string(),
            DisputeDetail {
                case_id: "CASE-1".into(),
                status: 1,
                disputed_amount: dec!(100),
                root_cause: None,
                status_sales: String::new(),
                status_ac: String::new(),
            },
        )]),
        ..Default::default()
    };
    let outcome = reconciler(client).reconcile(&zqm_context("BAHAG_DE"), b"%PDF", false).await;
    assert!(matches!(outcome, ReconcileOutcome::Failed(ClaimError::BahagDuplicateBlock { .. })));
}

#[tokio::test]
async fn zqm_duplicate_ignored_when_flag_set() {
    let client = ScriptedErpClient {
        dms_case_search_rows: vec![row("CASE-1")],
        dispute_details: HashMap::from([(
            "CASE-1".to_string(),
            DisputeDetail {
                case_id: "CASE-1".into(),
                status: 1,
                disputed_amount: dec!(100),
                root_cause: None,
                status_sales: String::new(),
                status_ac: String::new(),
            },
        )]),
        ..Default::default()
    };
    let outcome = reconciler(client).reconcile(&zqm_context("OBI_DE"), b"%PDF", true).await;
    assert!(matches!(outcome, ReconcileOutcome::Created { .. }));
}

#[tokio::test]
async fn dms_credit_with_no_matching_case_is_not_applicable() {
    let client = ScriptedErpClient::default();
    let outcome = reconciler(client).reconcile(&dms_context(), b"%PDF", false).await;
    assert!(matches!(outcome, ReconcileOutcome::NotApplicable { .. }));
}

#[tokio::test]
async fn dms_credit_records_against_matching_case() {
    let client = ScriptedErpClient {
        dms_case_search_rows: vec![row("CASE-2")],
        dispute_details: HashMap::from([(
            "CASE-2".to_string(),
            DisputeDetail {
                case_id: "CASE-2".into(),
                status: 1,
                disputed_amount: dec!(500),
                root_cause: None,
                status_sales: "Retoure".into(),
                status_ac: String::new(),
            },
        )]),
        ..Default::default()
    };
    let outcome = reconciler(client).reconcile(&dms_context(), b"%PDF", false).await;
    assert!(matches!(outcome, ReconcileOutcome::Created { case_id } if case_id == "CASE-2"));
}

#[tokio::test]
async fn dms_credit_already_recorded_is_idempotent() {
    let client = ScriptedErpClient {
        dms_case_search_rows: vec![row("CASE-2")],
        dispute_details: HashMap::from([(
            "CASE-2".to_string(),
            DisputeDetail {
                case_id: "CASE-2".into(),
                status: 1,
                disputed_amount: dec!(500),
                root_cause: None,
                status_sales: "Retoure 100,00 rest".into(),
                status_ac: String::new(),
            },
        )]),
        ..Default::default()
    };
    let outcome = reconciler(client).reconcile(&dms_context(), b"%PDF", false).await;
    assert!(matches!(outcome, ReconcileOutcome::Duplicated { case_id: Some(ref id) } if id == "CASE-2"));
}
