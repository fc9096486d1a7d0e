use chrono::{DateTime, Utc};
use harvest_core::models::partnership::{Partnership, PartnershipKind, PartnershipStatus};
use surrealdb_types::SurrealValue;

use super::{SurrealEntity, parse_record_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub struct PartnershipRow {
    record_id: String,
    tenant_id: String,
    name: String,
    kind: Option<String>,
    contact_person: Option<String>,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for Partnership {
    type Row = PartnershipRow;

    fn from_row(row: PartnershipRow) -> Result<Self, DbError> {
        let kind = row
            .kind
            .as_deref()
            .map(PartnershipKind::parse)
            .transpose()
            .map_err(|e| DbError::invalid_record("partnership", &row.record_id, e))?;
        let status = PartnershipStatus::parse(&row.status)
            .map_err(|e| DbError::invalid_record("partnership", &row.record_id, e))?;
        Ok(Partnership {
            id: parse_record_id("partnership", &row.record_id)?,
            tenant_id: row.tenant_id,
            name: row.name,
            kind,
            contact_person: row.contact_person,
            status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
