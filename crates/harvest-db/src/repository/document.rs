use chrono::{DateTime, Utc};
use harvest_core::models::document::Document;
use surrealdb_types::SurrealValue;

use super::{SurrealEntity, parse_record_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub struct DocumentRow {
    record_id: String,
    tenant_id: String,
    name: String,
    file_path: String,
    kind: Option<String>,
    version: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for Document {
    type Row = DocumentRow;

    fn from_row(row: DocumentRow) -> Result<Self, DbError> {
        Ok(Document {
            id: parse_record_id("document", &row.record_id)?,
            tenant_id: row.tenant_id,
            name: row.name,
            file_path: row.file_path,
            kind: row.kind,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
