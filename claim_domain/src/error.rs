// /////////////////////////////////////////////////////////////////////////////
// Claim Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Domain error taxonomy.
//!
//! One enum per failure category (spec ties these to: retry-with-backoff,
//! fail-and-file, or surface-as-warning). [`RetryableErpError`] is split out
//! because the ERP reconciler's lock-retry loop needs to match on it alone
//! without touching the rest of [`ClaimError`].

use thiserror::Error;

/// Errors the ERP reconciler's retry loop recognizes as transient.
///
/// Kept as its own enum (rather than variants buried in [`ClaimError`]) so the
/// retry loop can be written once and shared by every create/add-case/
/// record-credit protocol.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RetryableErpError {
    #[error("case {case_id} is locked by another user")]
    CaseLocked { case_id: String },

    #[error("notification {notification_id} is locked by another user")]
    NotificationLocked { notification_id: String },

    #[error("notification {notification_id} does not exist (yet)")]
    NotificationDoesNotExist { notification_id: String },

    #[error("OCR service returned 502 Bad Gateway")]
    OcrBadGateway,
}

#[derive(Debug, Error)]
pub enum ClaimError {
    // --- Template registry ---------------------------------------------
    #[error("template load error in {path}: {detail}")]
    TemplateLoad { path: String, detail: String },

    #[error("no template registered for issuer '{issuer}'")]
    TemplateNotFound { issuer: String },

    #[error("document text matched no template for issuer '{issuer}'")]
    PatternMatch { issuer: String, detail: String },

    #[error("document matched more than one template for issuer '{issuer}': {candidates:?}")]
    AmbiguousTemplate { issuer: String, candidates: Vec<String> },

    #[error("numeric parse error: {0}")]
    NumericParse(String),

    // --- Categorizer ------------------------------------------------------
    #[error("message category '{applied}' is not among the template's allowed categories {allowed:?}")]
    InvalidCategoryApplied { applied: String, allowed: Vec<String> },

    #[error("unable to determine a category for document {record_id}")]
    CategoryNotFound { record_id: i64 },

    // --- Claim compiler -----------------------------------------------
    #[error("processing rule references unbound required token '<{token}>'")]
    UnboundToken { token: String },

    #[error("reference selection misconfigured: none of {candidates:?} are valid reference fields")]
    MisconfiguredReferenceRule { candidates: Vec<String> },

    #[error("no referenceable data present among {candidates:?}")]
    NoReferenceableData { candidates: Vec<String> },

    #[error("claim context failed post-compile validation: {detail}")]
    InvalidClaimContext { detail: String },

    #[error("more than one accounting document matches without an account filter")]
    AmbiguousAccountingDocument,

    // --- ERP reconciler -----------------------------------------------
    #[error("issuer '{issuer}' contains BAHAG; duplicate notifications require manual review")]
    BahagDuplicateBlock { issuer: String },

    #[error(transparent)]
    Retryable(#[from] RetryableErpError),

    #[error("retry budget exhausted after {attempts} attempts: {source}")]
    RetryExhausted { attempts: u32, source: RetryableErpError },

    #[error("ERP call '{operation}' failed: {detail}")]
    ErpCall { operation: String, detail: String },

    // --- External collaborators -----------------------------------------
    #[error("OCR service returned non-2xx status {status}")]
    OcrServer { status: u16 },

    #[error("mailbox operation failed: {0}")]
    Mailbox(String),

    #[error("blob store operation failed: {0}")]
    Blob(String),

    #[error("undelivered recipients: {0:?}")]
    Undelivered(Vec<String>),

    // --- Persistence / infrastructure -----------------------------------
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    // --- Business warnings (non-fatal; see propagation table in 4.0) ---
    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("documents not found: {0}")]
    DocumentsNotFound(String),

    #[error("identical folder: {0}")]
    IdenticalFolder(String),
}

impl ClaimError {
    /// True for the `BusinessWarning` category: surface without corrupting
    /// state, advance deterministically (spec.md §7).
    pub fn is_business_warning(&self) -> bool {
        matches!(
            self,
            ClaimError::Duplicate(_)
                | ClaimError::DocumentsNotFound(_)
                | ClaimError::IdenticalFolder(_)
        )
    }
}
