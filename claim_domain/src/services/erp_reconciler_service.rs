use async_trait::async_trait;

use crate::aggregates::ClaimContext;
use crate::error::ClaimError;

/// Result of reconciling a [`ClaimContext`] against the ERP. Per spec.md
/// §9's redesign note, "duplicate" and "not applicable" are **not**
/// exceptions: the reconciler returns this sum type and the pipeline
/// controller maps it to the file-move / email-annotation / DB-status side
/// effects (spec.md §7's propagation table), rather than catching a
/// `RuntimeWarning`.
#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// A notification, case, or credit update was created/extended/recorded.
    Created { case_id: String },
    /// An equivalent case/notification already exists; no ERP write made
    /// (or blocked outright for a BAHAG issuer — see `Failed`).
    Duplicated { case_id: Option<String> },
    /// E.g. a credit note found no matching case within the retention
    /// window (`claim_case_unmatched`, spec.md §4.8).
    NotApplicable { reason: String },
    /// A hard failure: retry budget exhausted, ERP call error, BAHAG
    /// hard-block, or similar.
    Failed(ClaimError),
}

/// Given a [`ClaimContext`], searches the ERP for existing notifications/
/// cases, decides create-new vs. extend-existing vs. record-credit vs.
/// duplicate, and executes the decided transaction with retries (spec.md
/// §4.6).
#[async_trait]
pub trait ErpReconcilerService: Send + Sync {
    /// `pdf_bytes` is the claim document itself: every create/add/record
    /// protocol attaches it as the final step (spec.md §5).
    async fn reconcile(&self, ctx: &ClaimContext, pdf_bytes: &[u8], ignore_already_existing: bool) -> ReconcileOutcome;
}
