use chrono::{DateTime, Utc};
use harvest_core::models::transaction::{Transaction, TransactionKind};
use surrealdb_types::SurrealValue;

use super::{SurrealEntity, parse_record_id, parse_ref};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub struct TransactionRow {
    record_id: String,
    tenant_id: String,
    date: DateTime<Utc>,
    kind: String,
    description: String,
    amount: f64,
    related_entity_id: Option<String>,
    related_entity_type: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for Transaction {
    type Row = TransactionRow;

    fn from_row(row: TransactionRow) -> Result<Self, DbError> {
        let kind = TransactionKind::parse(&row.kind)
            .map_err(|e| DbError::invalid_record("financial_transaction", &row.record_id, e))?;
        let related_entity_id = row
            .related_entity_id
            .as_deref()
            .map(|id| {
                parse_ref(
                    "financial_transaction",
                    &row.record_id,
                    "related_entity_id",
                    id,
                )
            })
            .transpose()?;
        Ok(Transaction {
            id: parse_record_id("financial_transaction", &row.record_id)?,
            tenant_id: row.tenant_id,
            date: row.date,
            kind,
            description: row.description,
            amount: row.amount,
            related_entity_id,
            related_entity_type: row.related_entity_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
