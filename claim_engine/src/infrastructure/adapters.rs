pub mod blob_store;
pub mod erp_client;
pub mod mailbox_client;
pub mod ocr_client;

pub use blob_store::{BlobStore, LocalBlobStore};
pub use erp_client::{ErpClient, ErpSession, StubErpClient};
pub use mailbox_client::{MailboxClient, StubMailboxClient};
pub use ocr_client::{OcrClient, ReqwestOcrClient};
