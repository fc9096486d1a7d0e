use chrono::{DateTime, Utc};
use harvest_core::models::invoice::{Invoice, InvoiceStatus};
use surrealdb_types::SurrealValue;

use super::{SurrealEntity, parse_record_id, parse_ref};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub struct InvoiceRow {
    record_id: String,
    tenant_id: String,
    order_id: String,
    customer_id: String,
    invoice_date: DateTime<Utc>,
    due_date: DateTime<Utc>,
    total_amount: f64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for Invoice {
    type Row = InvoiceRow;

    fn from_row(row: InvoiceRow) -> Result<Self, DbError> {
        let status = InvoiceStatus::parse(&row.status)
            .map_err(|e| DbError::invalid_record("invoice", &row.record_id, e))?;
        Ok(Invoice {
            id: parse_record_id("invoice", &row.record_id)?,
            order_id: parse_ref("invoice", &row.record_id, "order_id", &row.order_id)?,
            customer_id: parse_ref("invoice", &row.record_id, "customer_id", &row.customer_id)?,
            tenant_id: row.tenant_id,
            invoice_date: row.invoice_date,
            due_date: row.due_date,
            total_amount: row.total_amount,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
