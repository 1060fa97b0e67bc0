use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, Utc};
use claim_domain::entities::document_record::DocumentStatus;
use claim_domain::error::ClaimError;
use claim_domain::repositories::DocumentRepository;
use tracing::instrument;

use crate::application::commands::ArchiveCommand;
use crate::infrastructure::adapters::BlobStore;

/// Archiver stage: once a completed credit note's PDF has sat in `done`
/// for at least `retention`, uploads it to cold storage and drops the
/// local copy (spec.md §4.8's `completed → archived` transition, §6's
/// "exactly one location at a time" invariant — the local file is removed
/// only after the upload succeeds).
pub struct ArchiveDocumentsUseCase {
    blob: Arc<dyn BlobStore>,
    repo: Arc<dyn DocumentRepository>,
    retention: Duration,
}

impl ArchiveDocumentsUseCase {
    pub fn new(blob: Arc<dyn BlobStore>, repo: Arc<dyn DocumentRepository>, retention: Duration) -> Self {
        Self { blob, repo, retention }
    }

    #[instrument(skip(self))]
    pub async fn run(&self, cmd: &ArchiveCommand) -> Result<bool, ClaimError> {
        let mut record = self
            .repo
            .get_record(cmd.record_id)
            .await?
            .ok_or_else(|| ClaimError::InvalidConfiguration(format!("no document record {}", cmd.record_id)))?;

        if record.status != DocumentStatus::MailCompletedMoved {
            return Ok(false);
        }

        if Utc::now() - record.last_update < self.retention {
            return Ok(false);
        }

        self.blob.upload(Path::new(&record.file_location), &cmd.archive_virtual_path, false).await?;
        tokio::fs::remove_file(&record.file_location).await?;

        record.status = DocumentStatus::Archived;
        record.file_location = cmd.archive_virtual_path.clone();
        self.repo.update_record(record).await?;

        Ok(true)
    }
}
