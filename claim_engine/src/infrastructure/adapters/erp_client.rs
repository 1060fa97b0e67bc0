use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use claim_domain::error::ClaimError;
use parking_lot::Mutex;
use tracing::{info, warn};

/// One row read back via `RFC_READ_TABLE`-style projection.
pub type TableRow = HashMap<String, String>;

#[derive(Debug, Clone)]
pub struct NotificationHeader {
    pub notification_id: String,
    pub case_ids: Vec<String>,
    pub shipping_point: Option<String>,
    pub partner: Option<String>,
    pub marked_for_deletion: bool,
}

#[derive(Debug, Clone)]
pub struct DisputeDetail {
    pub case_id: String,
    pub status: u8,
    pub disputed_amount: rust_decimal::Decimal,
    pub root_cause: Option<String>,
    pub status_sales: String,
    pub status_ac: String,
}

#[derive(Debug, Clone)]
pub struct CreateNotificationRequest {
    pub company_code: String,
    pub reference: Option<String>,
    pub coordinator: String,
    pub processor: String,
    pub shipping_point: Option<String>,
    pub currency: String,
    pub category_code: String,
    pub priority: String,
    pub title: String,
}

/// ERP RPC boundary (spec.md §6). Named calls mirror the RFC modules the
/// source relies on; implementations model only the operations the
/// reconciler drives, not the full ABAP surface.
#[async_trait]
pub trait ErpClient: Send + Sync {
    async fn read_table(
        &self,
        table: &str,
        filter: &str,
        fields: &[&str],
    ) -> Result<Vec<TableRow>, ClaimError>;

    async fn create_notification(&self, req: &CreateNotificationRequest) -> Result<String, ClaimError>;

    async fn get_notification(&self, notification_id: &str) -> Result<NotificationHeader, ClaimError>;

    /// Re-activates a notification ("put in process"); tolerates an
    /// "already-in-process" warning (spec.md §4.6 add-case protocol).
    async fn reactivate_notification(&self, notification_id: &str) -> Result<(), ClaimError>;

    /// Composite "claim-dispute-post" call: creates the paired DMS case for
    /// a notification and returns its case id.
    async fn post_claim_dispute(&self, notification_id: &str) -> Result<String, ClaimError>;

    async fn get_dispute_detail(&self, case_id: &str) -> Result<DisputeDetail, ClaimError>;

    async fn change_dispute_attributes(&self, case_id: &str, attrs: &HashMap<String, String>) -> Result<(), ClaimError>;

    async fn create_task(&self, case_id: &str, task_kind: &str, responsible: Option<&str>) -> Result<String, ClaimError>;

    async fn change_task_status(&self, task_id: &str, status: u8) -> Result<(), ClaimError>;

    async fn create_binary_relation(&self, case_id: &str, document_id: &str) -> Result<(), ClaimError>;

    async fn upload_office_document(&self, bytes: &[u8], name: &str) -> Result<String, ClaimError>;

    /// `find_accounting_documents(po|invoice|delivery, account?) -> docs`
    /// (spec.md §4.5, §8).
    async fn find_accounting_documents(&self, reference: &str, account: Option<&str>) -> Result<Vec<String>, ClaimError>;

    /// Warehouse/shipping-point lookup for a delivery note (spec.md §4.6
    /// step 1: "shipping point derived from delivery"); mirrors the
    /// original's generic-table-browser read (`se16.get_shipping_point`).
    async fn shipping_point_for_delivery(&self, delivery_number: &str) -> Result<Option<String>, ClaimError>;
}

/// Stub implementation: every call returns "not found" or an empty result.
/// Stands in until a real RFC/SOAP client is wired up at the composition
/// root, mirroring [`StubMailboxClient`](super::mailbox_client::StubMailboxClient).
pub struct StubErpClient;

#[async_trait]
impl ErpClient for StubErpClient {
    async fn read_table(&self, _table: &str, _filter: &str, _fields: &[&str]) -> Result<Vec<TableRow>, ClaimError> {
        Ok(Vec::new())
    }

    async fn create_notification(&self, _req: &CreateNotificationRequest) -> Result<String, ClaimError> {
        Err(ClaimError::ErpCall { operation: "create_notification".into(), detail: "no ERP client configured".into() })
    }

    async fn get_notification(&self, notification_id: &str) -> Result<NotificationHeader, ClaimError> {
        Err(ClaimError::ErpCall {
            operation: "get_notification".into(),
            detail: format!("no ERP client configured ({notification_id})"),
        })
    }

    async fn reactivate_notification(&self, _notification_id: &str) -> Result<(), ClaimError> {
        Ok(())
    }

    async fn post_claim_dispute(&self, _notification_id: &str) -> Result<String, ClaimError> {
        Err(ClaimError::ErpCall { operation: "post_claim_dispute".into(), detail: "no ERP client configured".into() })
    }

    async fn get_dispute_detail(&self, case_id: &str) -> Result<DisputeDetail, ClaimError> {
        Err(ClaimError::ErpCall {
            operation: "get_dispute_detail".into(),
            detail: format!("no ERP client configured ({case_id})"),
        })
    }

    async fn change_dispute_attributes(&self, _case_id: &str, _attrs: &HashMap<String, String>) -> Result<(), ClaimError> {
        Ok(())
    }

    async fn create_task(&self, _case_id: &str, _task_kind: &str, _responsible: Option<&str>) -> Result<String, ClaimError> {
        Err(ClaimError::ErpCall { operation: "create_task".into(), detail: "no ERP client configured".into() })
    }

    async fn change_task_status(&self, _task_id: &str, _status: u8) -> Result<(), ClaimError> {
        Ok(())
    }

    async fn create_binary_relation(&self, _case_id: &str, _document_id: &str) -> Result<(), ClaimError> {
        Ok(())
    }

    async fn upload_office_document(&self, _bytes: &[u8], _name: &str) -> Result<String, ClaimError> {
        Err(ClaimError::ErpCall { operation: "upload_office_document".into(), detail: "no ERP client configured".into() })
    }

    async fn find_accounting_documents(&self, _reference: &str, _account: Option<&str>) -> Result<Vec<String>, ClaimError> {
        Ok(Vec::new())
    }

    async fn shipping_point_for_delivery(&self, _delivery_number: &str) -> Result<Option<String>, ClaimError> {
        Ok(None)
    }
}

/// Owns retry/backoff and the "reset connection on company-code change"
/// policy (spec.md §5, §9's session-object redesign). One instance per
/// pipeline run; `Mutex` enforces the single-writer-per-stage discipline.
pub struct ErpSession {
    client: Box<dyn ErpClient>,
    current_company_code: Mutex<Option<String>>,
    lock_retry_attempts: u32,
    lock_retry_backoff: Duration,
}

impl ErpSession {
    pub fn new(client: Box<dyn ErpClient>, lock_retry_attempts: u32, lock_retry_backoff: Duration) -> Self {
        Self {
            client,
            current_company_code: Mutex::new(None),
            lock_retry_attempts,
            lock_retry_backoff,
        }
    }

    /// Resets the logical connection whenever `company_code` differs from
    /// the previous document's (spec.md §5: "the ERP's case-id sequence is
    /// per-connection/company-code").
    pub fn ensure_company_code(&self, company_code: &str) {
        let mut current = self.current_company_code.lock();
        if current.as_deref() != Some(company_code) {
            info!(company_code, "resetting ERP session for new company code");
            *current = Some(company_code.to_string());
        }
    }

    pub fn client(&self) -> &dyn ErpClient {
        self.client.as_ref()
    }

    /// Runs `op` with the lock-retry loop (spec.md §4.6, §9): retries
    /// `RetryableErpError` up to `lock_retry_attempts` times with
    /// `lock_retry_backoff` between attempts, then surfaces
    /// `RetryExhausted`.
    pub async fn with_lock_retry<T, F, Fut>(&self, mut op: F) -> Result<T, ClaimError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ClaimError>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(ClaimError::Retryable(retryable)) => {
                    if attempt > self.lock_retry_attempts {
                        return Err(ClaimError::RetryExhausted {
                            attempts: attempt - 1,
                            source: retryable,
                        });
                    }
                    warn!(attempt, error = %retryable, "retrying after transient ERP condition");
                    tokio::time::sleep(self.lock_retry_backoff).await;
                }
                Err(other) => return Err(other),
            }
        }
    }
}
