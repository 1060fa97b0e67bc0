use std::sync::Arc;

use claim_domain::entities::document_record::DocumentStatus;
use claim_domain::error::ClaimError;
use claim_domain::repositories::DocumentRepository;
use tracing::instrument;

use crate::application::commands::DispatchCommand;
use crate::infrastructure::adapters::MailboxClient;

/// Maps a terminal processing status to the mailbox subfolder it's filed
/// under, the severity word used in the annotation line, and the
/// `mail_*_moved` status recorded once the move completes (spec.md §4.8, §7).
fn destination_for(status: DocumentStatus) -> Option<(&'static str, &'static str, DocumentStatus)> {
    match status {
        DocumentStatus::Completed => Some(("Completed", "INFO", DocumentStatus::MailCompletedMoved)),
        DocumentStatus::Duplicate => Some(("Duplicate", "WARNING", DocumentStatus::MailDuplicateMoved)),
        DocumentStatus::ProcessingError => Some(("Failed", "ERROR", DocumentStatus::MailFailedMoved)),
        DocumentStatus::ClaimCaseUnmatched => Some(("CaseUnmatched", "WARNING", DocumentStatus::MailCaseUnmatchedMoved)),
        DocumentStatus::ExtractionError => Some(("ExtractionError", "ERROR", DocumentStatus::MailExtractionerrorMoved)),
        _ => None,
    }
}

/// Dispatcher stage: files the source email next to the outcome the earlier
/// stages recorded, annotating it with the run's log text first (spec.md
/// §4.8's `mail_*_moved` transitions, §7's annotation format).
pub struct DispatchDocumentsUseCase {
    mailbox: Arc<dyn MailboxClient>,
    repo: Arc<dyn DocumentRepository>,
}

impl DispatchDocumentsUseCase {
    pub fn new(mailbox: Arc<dyn MailboxClient>, repo: Arc<dyn DocumentRepository>) -> Self {
        Self { mailbox, repo }
    }

    #[instrument(skip(self))]
    pub async fn run(&self, cmd: &DispatchCommand) -> Result<DocumentStatus, ClaimError> {
        let mut record = self
            .repo
            .get_record(cmd.record_id)
            .await?
            .ok_or_else(|| ClaimError::InvalidConfiguration(format!("no document record {}", cmd.record_id)))?;

        let Some((destination, severity, moved_status)) = destination_for(record.status) else {
            return Ok(record.status);
        };

        let Some(message_id) = record.external_message_id.clone() else {
            return Ok(record.status);
        };

        if !record.log_text.is_empty() {
            self.mailbox
                .annotate(&message_id, &format!("G.ROBOT_RFC ({severity}): {}", record.log_text))
                .await?;
        }

        self.mailbox.move_message(&message_id, destination).await?;
        self.mailbox.mark_completed(&message_id).await?;

        record.status = moved_status;
        self.repo.update_record(record).await?;

        Ok(moved_status)
    }
}
