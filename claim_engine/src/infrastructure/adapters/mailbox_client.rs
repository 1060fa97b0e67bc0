use async_trait::async_trait;
use claim_domain::error::ClaimError;

/// Shared-mailbox boundary (spec.md §6). Full EWS/OAuth2 is out of scope
/// (spec.md §1); this trait captures the folder operations the pipeline
/// controller drives so it can be tested against a fake, and a stub
/// implementation stands in for the real EWS client.
#[async_trait]
pub trait MailboxClient: Send + Sync {
    /// Walks the inbox tree under `subfolder`, returning `(message_id, pdf_bytes)`
    /// pairs for messages with a PDF attachment.
    async fn fetch_new_messages(&self, subfolder: &str) -> Result<Vec<(String, Vec<u8>)>, ClaimError>;

    /// Moves a message (by id) to `destination_path` (subfolder-by-name path).
    async fn move_message(&self, message_id: &str, destination_path: &str) -> Result<(), ClaimError>;

    /// Appends an HTML-formatted annotation line to the message body, e.g.
    /// `G.ROBOT_RFC (INFO|WARNING|ERROR): …` (spec.md §7).
    async fn annotate(&self, message_id: &str, html_line: &str) -> Result<(), ClaimError>;

    /// Marks the completion flag (extended property tag `0x1090`, Integer).
    async fn mark_completed(&self, message_id: &str) -> Result<(), ClaimError>;
}

/// Stub implementation: every operation is a documented no-op. Stands in
/// until a real EWS/OAuth2 client is wired up at the composition root.
pub struct StubMailboxClient;

#[async_trait]
impl MailboxClient for StubMailboxClient {
    async fn fetch_new_messages(&self, _subfolder: &str) -> Result<Vec<(String, Vec<u8>)>, ClaimError> {
        Ok(Vec::new())
    }

    async fn move_message(&self, _message_id: &str, _destination_path: &str) -> Result<(), ClaimError> {
        Ok(())
    }

    async fn annotate(&self, _message_id: &str, _html_line: &str) -> Result<(), ClaimError> {
        Ok(())
    }

    async fn mark_completed(&self, _message_id: &str) -> Result<(), ClaimError> {
        Ok(())
    }
}
