pub mod archive_documents;
pub mod create_claim;
pub mod dispatch_documents;
pub mod download_documents;
pub mod extract_document;
