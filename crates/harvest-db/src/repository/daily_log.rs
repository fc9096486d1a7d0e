use chrono::{DateTime, NaiveDate, Utc};
use harvest_core::models::daily_log::DailyLog;
use surrealdb_types::SurrealValue;

use super::{SurrealEntity, parse_record_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub struct DailyLogRow {
    record_id: String,
    tenant_id: String,
    log_date: String,
    orders_fulfilled: i64,
    quality_control_notes: Option<String>,
    temperature_logs: serde_json::Value,
    delivery_route_notes: Option<String>,
    issues: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for DailyLog {
    type Row = DailyLogRow;

    fn from_row(row: DailyLogRow) -> Result<Self, DbError> {
        let log_date = NaiveDate::parse_from_str(&row.log_date, "%Y-%m-%d").map_err(|e| {
            DbError::invalid_record("daily_log", &row.record_id, format!("log_date: {e}"))
        })?;
        Ok(DailyLog {
            id: parse_record_id("daily_log", &row.record_id)?,
            tenant_id: row.tenant_id,
            log_date,
            orders_fulfilled: row.orders_fulfilled,
            quality_control_notes: row.quality_control_notes,
            temperature_logs: row.temperature_logs,
            delivery_route_notes: row.delivery_route_notes,
            issues: row.issues,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
