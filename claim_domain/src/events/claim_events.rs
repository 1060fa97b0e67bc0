use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::DocumentStatus;

/// A significant, past occurrence in a document's lifecycle (spec.md §4.8).
/// Consumed by the logging/metrics infrastructure; never by other domain
/// logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClaimEvent {
    StatusChanged {
        record_id: i64,
        from: DocumentStatus,
        to: DocumentStatus,
        at: DateTime<Utc>,
    },
    DuplicateDetected {
        record_id: i64,
        case_id: Option<String>,
        at: DateTime<Utc>,
    },
    ExtractionFailed {
        record_id: i64,
        detail: String,
        at: DateTime<Utc>,
    },
    ErpRetryExhausted {
        record_id: i64,
        attempts: u32,
        at: DateTime<Utc>,
    },
}
