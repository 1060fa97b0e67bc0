use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use claim_domain::entities::{DocumentRecord, DocumentStatus};
use claim_domain::error::ClaimError;
use claim_domain::repositories::DocumentRepository;
use claim_domain::value_objects::DocumentHash;

/// `sqlx`-backed implementation of [`DocumentRepository`] (spec.md §4.7).
/// One row per [`DocumentHash`]; `hash` carries a unique index so
/// `find_by_hash` doubles as the downloader's dedup check.
pub struct SqliteDocumentRepository {
    pool: SqlitePool,
}

impl SqliteDocumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: sqlx::sqlite::SqliteRow) -> Result<DocumentRecord, ClaimError> {
    let hash: String = row.try_get("hash")?;
    let status: String = row.try_get("status")?;
    let extracted_data: Option<String> = row.try_get("extracted_data")?;
    let created_at: String = row.try_get("created_at")?;
    let last_update: String = row.try_get("last_update")?;

    Ok(DocumentRecord {
        id: row.try_get("id")?,
        hash: DocumentHash::from_hex(&hash)?,
        mailbox_subfolder: row.try_get("mailbox_subfolder")?,
        message_category: row.try_get("message_category")?,
        control_category: row.try_get("control_category")?,
        status: parse_status(&status)?,
        external_message_id: row.try_get("external_message_id")?,
        file_location: row.try_get("file_location")?,
        raw_text: row.try_get("raw_text")?,
        extracted_data: extracted_data
            .map(|s| serde_json::from_str(&s))
            .transpose()?,
        log_text: row.try_get("log_text")?,
        case_id: row.try_get("case_id")?,
        created_at: created_at
            .parse::<DateTime<Utc>>()
            .map_err(|e| ClaimError::InvalidConfiguration(format!("bad created_at: {e}")))?,
        last_update: last_update
            .parse::<DateTime<Utc>>()
            .map_err(|e| ClaimError::InvalidConfiguration(format!("bad last_update: {e}")))?,
        schema_version: row.try_get("schema_version")?,
    })
}

fn parse_status(s: &str) -> Result<DocumentStatus, ClaimError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| ClaimError::InvalidConfiguration(format!("unknown status '{s}': {e}")))
}

fn status_str(status: DocumentStatus) -> String {
    match serde_json::to_value(status).expect("DocumentStatus always serializes") {
        serde_json::Value::String(s) => s,
        _ => unreachable!("DocumentStatus serializes to a string"),
    }
}

#[async_trait]
impl DocumentRepository for SqliteDocumentRepository {
    async fn create_record(&self, record: DocumentRecord) -> Result<DocumentRecord, ClaimError> {
        let id = sqlx::query(
            r#"
            INSERT INTO document_records
                (hash, mailbox_subfolder, message_category, control_category, status,
                 external_message_id, file_location, raw_text, extracted_data, log_text,
                 case_id, created_at, last_update, schema_version)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.hash.as_str())
        .bind(&record.mailbox_subfolder)
        .bind(&record.message_category)
        .bind(&record.control_category)
        .bind(status_str(record.status))
        .bind(&record.external_message_id)
        .bind(&record.file_location)
        .bind(&record.raw_text)
        .bind(
            record
                .extracted_data
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
        )
        .bind(&record.log_text)
        .bind(&record.case_id)
        .bind(record.created_at.to_rfc3339())
        .bind(record.last_update.to_rfc3339())
        .bind(record.schema_version)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(DocumentRecord { id, ..record })
    }

    async fn find_by_hash(&self, hash: &DocumentHash) -> Result<Option<DocumentRecord>, ClaimError> {
        let row = sqlx::query("SELECT * FROM document_records WHERE hash = ?")
            .bind(hash.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_record).transpose()
    }

    async fn get_record(&self, id: i64) -> Result<Option<DocumentRecord>, ClaimError> {
        let row = sqlx::query("SELECT * FROM document_records WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_record).transpose()
    }

    async fn get_records_by(&self, column: &str, values: &[String]) -> Result<Vec<DocumentRecord>, ClaimError> {
        if values.is_empty() {
            return Ok(Vec::new());
        }
        if !is_allowed_column(column) {
            return Err(ClaimError::InvalidConfiguration(format!(
                "'{column}' is not a queryable column"
            )));
        }
        let placeholders = std::iter::repeat("?").take(values.len()).collect::<Vec<_>>().join(", ");
        let sql = format!("SELECT * FROM document_records WHERE {column} IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for v in values {
            query = query.bind(v);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_record).collect()
    }

    async fn update_record(&self, mut record: DocumentRecord) -> Result<(), ClaimError> {
        record.last_update = Utc::now();
        sqlx::query(
            r#"
            UPDATE document_records
            SET mailbox_subfolder = ?, message_category = ?, control_category = ?, status = ?,
                external_message_id = ?, file_location = ?, raw_text = ?, extracted_data = ?,
                log_text = ?, case_id = ?, last_update = ?, schema_version = ?
            WHERE id = ?
            "#,
        )
        .bind(&record.mailbox_subfolder)
        .bind(&record.message_category)
        .bind(&record.control_category)
        .bind(status_str(record.status))
        .bind(&record.external_message_id)
        .bind(&record.file_location)
        .bind(&record.raw_text)
        .bind(
            record
                .extracted_data
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
        )
        .bind(&record.log_text)
        .bind(&record.case_id)
        .bind(record.last_update.to_rfc3339())
        .bind(record.schema_version)
        .bind(record.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn bulk_update_status(&self, ids: &[i64], status: DocumentStatus) -> Result<(), ClaimError> {
        if ids.is_empty() {
            return Ok(());
        }
        let placeholders = std::iter::repeat("?").take(ids.len()).collect::<Vec<_>>().join(", ");
        let sql = format!(
            "UPDATE document_records SET status = ?, last_update = ? WHERE id IN ({placeholders})"
        );
        let mut query = sqlx::query(&sql).bind(status_str(status)).bind(Utc::now().to_rfc3339());
        for id in ids {
            query = query.bind(id);
        }
        query.execute(&self.pool).await?;
        Ok(())
    }

    async fn delete_by_hash(&self, hash: &DocumentHash) -> Result<(), ClaimError> {
        sqlx::query("DELETE FROM document_records WHERE hash = ?")
            .bind(hash.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn is_allowed_column(column: &str) -> bool {
    matches!(
        column,
        "status" | "case_id" | "mailbox_subfolder" | "message_category" | "control_category" | "external_message_id"
    )
}
