use async_trait::async_trait;

use crate::entities::DocumentRecord;
use crate::error::ClaimError;
use crate::value_objects::DocumentHash;

/// Dedup & persistence store contract (spec.md §4.7). A relational table
/// keyed by monotonic id with a unique index on [`DocumentHash`]; every
/// operation commits on success and rolls back on failure.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create_record(&self, record: DocumentRecord) -> Result<DocumentRecord, ClaimError>;

    /// Looks a record up by its content hash; the only way the downloader
    /// can tell whether a PDF has already been seen.
    async fn find_by_hash(&self, hash: &DocumentHash) -> Result<Option<DocumentRecord>, ClaimError>;

    async fn get_record(&self, id: i64) -> Result<Option<DocumentRecord>, ClaimError>;

    /// `get_records(column, value)` in spec.md terms: records whose named
    /// column equals one of `values`.
    async fn get_records_by(&self, column: &str, values: &[String]) -> Result<Vec<DocumentRecord>, ClaimError>;

    /// Persists a full record; stamps `last_update`.
    async fn update_record(&self, record: DocumentRecord) -> Result<(), ClaimError>;

    /// Bulk-updates multiple ids with the same field set, automatically
    /// stamping `last_update` (spec.md §4.7).
    async fn bulk_update_status(&self, ids: &[i64], status: crate::entities::DocumentStatus) -> Result<(), ClaimError>;

    async fn delete_by_hash(&self, hash: &DocumentHash) -> Result<(), ClaimError>;
}
