use std::path::PathBuf;
use std::sync::Arc;

use claim_domain::entities::DocumentRecord;
use claim_domain::error::ClaimError;
use claim_domain::repositories::DocumentRepository;
use claim_domain::value_objects::DocumentHash;
use tracing::{info, instrument};

use crate::application::commands::DownloadCommand;
use crate::infrastructure::adapters::MailboxClient;

/// Downloader stage (spec.md §4.8's `received` → `registered` transition).
/// A PDF re-seen with the same hash never creates a second record; it is
/// either re-queued or marked complete, per [`DocumentRecord::should_requeue`].
pub struct DownloadDocumentsUseCase {
    mailbox: Arc<dyn MailboxClient>,
    repo: Arc<dyn DocumentRepository>,
    input_dir: PathBuf,
}

impl DownloadDocumentsUseCase {
    pub fn new(mailbox: Arc<dyn MailboxClient>, repo: Arc<dyn DocumentRepository>, input_dir: PathBuf) -> Self {
        Self { mailbox, repo, input_dir }
    }

    #[instrument(skip(self))]
    pub async fn run(&self, cmd: &DownloadCommand) -> Result<Vec<DocumentRecord>, ClaimError> {
        let messages = self.mailbox.fetch_new_messages(&cmd.subfolder).await?;
        let mut registered = Vec::new();

        for (message_id, pdf_bytes) in messages {
            let hash = DocumentHash::of(&pdf_bytes);

            match self.repo.find_by_hash(&hash).await? {
                Some(mut existing) => {
                    existing.mailbox_subfolder = cmd.subfolder.clone();
                    existing.external_message_id = Some(message_id.clone());
                    if existing.should_requeue() {
                        existing.append_log("re-seen by downloader, re-queued for processing");
                        self.repo.update_record(existing.clone()).await?;
                        registered.push(existing);
                    } else {
                        self.repo.update_record(existing).await?;
                        self.mailbox.mark_completed(&message_id).await?;
                    }
                }
                None => {
                    let file_location = self.input_dir.join(format!("{hash}.pdf"));
                    tokio::fs::write(&file_location, &pdf_bytes).await?;
                    let record = DocumentRecord::new_received(hash, cmd.subfolder.clone(), file_location.to_string_lossy().into_owned());
                    let mut record = self.repo.create_record(record).await?;
                    record.external_message_id = Some(message_id);
                    self.repo.update_record(record.clone()).await?;
                    info!(record_id = record.id, "registered new document");
                    registered.push(record);
                }
            }
        }

        Ok(registered)
    }
}
