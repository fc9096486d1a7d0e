use chrono::{DateTime, Utc};
use harvest_core::models::performance_metric::PerformanceMetric;
use surrealdb_types::SurrealValue;

use super::{SurrealEntity, parse_record_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub struct PerformanceMetricRow {
    record_id: String,
    tenant_id: String,
    name: String,
    metric_value: f64,
    date: DateTime<Utc>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for PerformanceMetric {
    type Row = PerformanceMetricRow;

    fn from_row(row: PerformanceMetricRow) -> Result<Self, DbError> {
        Ok(PerformanceMetric {
            id: parse_record_id("performance_metric", &row.record_id)?,
            tenant_id: row.tenant_id,
            name: row.name,
            value: row.metric_value,
            date: row.date,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
