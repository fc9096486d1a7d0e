use chrono::{DateTime, Utc};
use harvest_core::models::customer::Customer;
use surrealdb_types::SurrealValue;

use super::{SurrealEntity, parse_record_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub struct CustomerRow {
    record_id: String,
    tenant_id: String,
    name: String,
    contact_person: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    preferences: serde_json::Value,
    satisfaction_score: Option<i64>,
    feedback: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for Customer {
    type Row = CustomerRow;

    fn from_row(row: CustomerRow) -> Result<Self, DbError> {
        Ok(Customer {
            id: parse_record_id("customer", &row.record_id)?,
            tenant_id: row.tenant_id,
            name: row.name,
            contact_person: row.contact_person,
            phone: row.phone,
            email: row.email,
            address: row.address,
            preferences: row.preferences,
            satisfaction_score: row.satisfaction_score,
            feedback: row.feedback,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
