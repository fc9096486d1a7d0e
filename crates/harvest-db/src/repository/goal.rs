use chrono::{DateTime, Utc};
use harvest_core::models::goal::{Goal, GoalStatus};
use surrealdb_types::SurrealValue;

use super::{SurrealEntity, parse_record_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub struct GoalRow {
    record_id: String,
    tenant_id: String,
    name: String,
    description: Option<String>,
    target_value: f64,
    current_value: f64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for Goal {
    type Row = GoalRow;

    fn from_row(row: GoalRow) -> Result<Self, DbError> {
        let status = GoalStatus::parse(&row.status)
            .map_err(|e| DbError::invalid_record("goal", &row.record_id, e))?;
        Ok(Goal {
            id: parse_record_id("goal", &row.record_id)?,
            tenant_id: row.tenant_id,
            name: row.name,
            description: row.description,
            target_value: row.target_value,
            current_value: row.current_value,
            start_date: row.start_date,
            end_date: row.end_date,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
