use chrono::{DateTime, Utc};
use harvest_core::models::supplier::{Supplier, SupplierPayment};
use surrealdb_types::SurrealValue;

use super::{SurrealEntity, parse_record_id, parse_ref};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub struct SupplierRow {
    record_id: String,
    tenant_id: String,
    name: String,
    contact_person: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    product_specialties: Vec<String>,
    pickup_schedule: serde_json::Value,
    performance_notes: Option<String>,
    training_needs: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for Supplier {
    type Row = SupplierRow;

    fn from_row(row: SupplierRow) -> Result<Self, DbError> {
        Ok(Supplier {
            id: parse_record_id("supplier", &row.record_id)?,
            tenant_id: row.tenant_id,
            name: row.name,
            contact_person: row.contact_person,
            phone: row.phone,
            email: row.email,
            address: row.address,
            product_specialties: row.product_specialties,
            pickup_schedule: row.pickup_schedule,
            performance_notes: row.performance_notes,
            training_needs: row.training_needs,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
pub struct SupplierPaymentRow {
    record_id: String,
    tenant_id: String,
    supplier_id: String,
    payment_date: DateTime<Utc>,
    amount: f64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for SupplierPayment {
    type Row = SupplierPaymentRow;

    fn from_row(row: SupplierPaymentRow) -> Result<Self, DbError> {
        Ok(SupplierPayment {
            id: parse_record_id("supplier_payment", &row.record_id)?,
            supplier_id: parse_ref(
                "supplier_payment",
                &row.record_id,
                "supplier_id",
                &row.supplier_id,
            )?,
            tenant_id: row.tenant_id,
            payment_date: row.payment_date,
            amount: row.amount,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
