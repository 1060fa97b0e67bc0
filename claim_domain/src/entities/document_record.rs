use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::DocumentHash;

/// Persisted processing status, closed set per spec.md §6. Transitions are
/// monotonic within one run (spec.md §3, §4.8); the pipeline controller is
/// the only writer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    DocumentRegistrationSuccess,
    Extracted,
    ExtractionError,
    Completed,
    Duplicate,
    ProcessingError,
    ClaimCaseUnmatched,
    MailCompletedMoved,
    MailFailedMoved,
    MailDuplicateMoved,
    MailExtractionerrorMoved,
    MailCaseUnmatchedMoved,
    Archived,
}

impl DocumentStatus {
    /// Terminal for the pipeline run; the controller has nothing further to
    /// do until a new run observes the document again.
    pub fn is_mail_filed(&self) -> bool {
        matches!(
            self,
            DocumentStatus::MailCompletedMoved
                | DocumentStatus::MailFailedMoved
                | DocumentStatus::MailDuplicateMoved
                | DocumentStatus::MailExtractionerrorMoved
                | DocumentStatus::MailCaseUnmatchedMoved
                | DocumentStatus::Archived
        )
    }

    /// Statuses the downloader idempotence check (spec.md §4.8) treats as
    /// "already done" — skip re-queuing unless `IGNORE_ALREADY_EXISTING` is
    /// applied.
    pub fn is_already_handled(&self) -> bool {
        matches!(self, DocumentStatus::Completed | DocumentStatus::Duplicate) || self.is_mail_filed()
    }
}

/// One row per unique PDF (spec.md §3). Identity is [`DocumentHash`]; `id` is
/// the monotonic integer assigned by the store on first insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: i64,
    pub hash: DocumentHash,
    pub mailbox_subfolder: String,
    pub message_category: Option<String>,
    /// E.g. `IGNORE_ALREADY_EXISTING`; overrides default duplicate/skip
    /// behavior (spec.md glossary).
    pub control_category: Option<String>,
    pub status: DocumentStatus,
    pub external_message_id: Option<String>,
    pub file_location: String,
    pub raw_text: Option<String>,
    pub extracted_data: Option<serde_json::Value>,
    pub log_text: String,
    pub case_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    /// Reserved for future migrations; always `1` today.
    pub schema_version: i32,
}

impl DocumentRecord {
    /// Builds a fresh record for a PDF the downloader has not seen before.
    pub fn new_received(hash: DocumentHash, mailbox_subfolder: String, file_location: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            hash,
            mailbox_subfolder,
            message_category: None,
            control_category: None,
            status: DocumentStatus::DocumentRegistrationSuccess,
            external_message_id: None,
            file_location,
            raw_text: None,
            extracted_data: None,
            log_text: String::new(),
            case_id: None,
            created_at: now,
            last_update: now,
            schema_version: 1,
        }
    }

    /// Whether the downloader should re-queue a re-seen document for further
    /// processing rather than treat it as a no-op (spec.md §4.8, §8).
    pub fn should_requeue(&self) -> bool {
        let override_requested = self
            .control_category
            .as_deref()
            .map(|c| c == "IGNORE_ALREADY_EXISTING")
            .unwrap_or(false);
        override_requested || !self.status.is_already_handled()
    }

    pub fn append_log(&mut self, line: &str) {
        if !self.log_text.is_empty() {
            self.log_text.push('\n');
        }
        self.log_text.push_str(line);
        self.last_update = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_document_requeues() {
        let record = DocumentRecord::new_received(
            DocumentHash::of(b"x"),
            "INBOX".into(),
            "input/x.pdf".into(),
        );
        assert!(record.should_requeue());
    }

    #[test]
    fn completed_document_does_not_requeue_by_default() {
        let mut record =
            DocumentRecord::new_received(DocumentHash::of(b"x"), "INBOX".into(), "input/x.pdf".into());
        record.status = DocumentStatus::Completed;
        assert!(!record.should_requeue());
    }

    #[test]
    fn ignore_already_existing_forces_requeue() {
        let mut record =
            DocumentRecord::new_received(DocumentHash::of(b"x"), "INBOX".into(), "input/x.pdf".into());
        record.status = DocumentStatus::Completed;
        record.control_category = Some("IGNORE_ALREADY_EXISTING".into());
        assert!(record.should_requeue());
    }
}
