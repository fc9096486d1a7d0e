//! Daily operations log. One log per calendar day per business.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HarvestResult;
use crate::repository::{FieldValue, FieldWrite, Predicate, ScopedEntity};
use crate::validation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLog {
    pub id: Uuid,
    pub tenant_id: String,
    pub log_date: NaiveDate,
    pub orders_fulfilled: i64,
    pub quality_control_notes: Option<String>,
    /// Cold-chain readings, e.g. `[{"time": "06:00", "celsius": 4.0}]`.
    pub temperature_logs: serde_json::Value,
    pub delivery_route_notes: Option<String>,
    pub issues: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDailyLog {
    pub log_date: NaiveDate,
    pub orders_fulfilled: i64,
    pub quality_control_notes: Option<String>,
    pub temperature_logs: Option<serde_json::Value>,
    pub delivery_route_notes: Option<String>,
    pub issues: Option<serde_json::Value>,
}

impl CreateDailyLog {
    pub fn for_date(log_date: NaiveDate) -> Self {
        Self {
            log_date,
            orders_fulfilled: 0,
            quality_control_notes: None,
            temperature_logs: None,
            delivery_route_notes: None,
            issues: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateDailyLog {
    pub orders_fulfilled: Option<i64>,
    pub quality_control_notes: Option<Option<String>>,
    pub temperature_logs: Option<serde_json::Value>,
    pub delivery_route_notes: Option<Option<String>>,
    pub issues: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct DailyLogFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Dates are stored as ISO `YYYY-MM-DD` text, which sorts chronologically.
pub fn date_value(date: NaiveDate) -> FieldValue {
    FieldValue::Text(date.format("%Y-%m-%d").to_string())
}

fn empty_list() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

impl ScopedEntity for DailyLog {
    const KIND: &'static str = "daily_log";
    const UNIQUE_FIELD: Option<&'static str> = Some("log_date");

    type Create = CreateDailyLog;
    type Update = UpdateDailyLog;
    type Filter = DailyLogFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreateDailyLog) -> HarvestResult<()> {
        validation::require_non_negative("orders_fulfilled", input.orders_fulfilled as f64)
    }

    fn validate_update(input: &UpdateDailyLog) -> HarvestResult<()> {
        if let Some(n) = input.orders_fulfilled {
            validation::require_non_negative("orders_fulfilled", n as f64)?;
        }
        Ok(())
    }

    fn create_fields(input: CreateDailyLog) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("log_date", date_value(input.log_date)),
            FieldWrite::new("orders_fulfilled", FieldValue::Int(input.orders_fulfilled)),
            FieldWrite::new(
                "quality_control_notes",
                FieldValue::OptText(input.quality_control_notes),
            ),
            FieldWrite::new(
                "temperature_logs",
                FieldValue::Json(input.temperature_logs.unwrap_or_else(empty_list)),
            ),
            FieldWrite::new(
                "delivery_route_notes",
                FieldValue::OptText(input.delivery_route_notes),
            ),
            FieldWrite::new(
                "issues",
                FieldValue::Json(input.issues.unwrap_or_else(empty_list)),
            ),
        ]
    }

    fn update_fields(input: UpdateDailyLog) -> Vec<FieldWrite> {
        let mut fields = Vec::new();
        if let Some(n) = input.orders_fulfilled {
            fields.push(FieldWrite::new("orders_fulfilled", FieldValue::Int(n)));
        }
        if let Some(v) = input.quality_control_notes {
            fields.push(FieldWrite::new("quality_control_notes", FieldValue::OptText(v)));
        }
        if let Some(v) = input.temperature_logs {
            fields.push(FieldWrite::new("temperature_logs", FieldValue::Json(v)));
        }
        if let Some(v) = input.delivery_route_notes {
            fields.push(FieldWrite::new("delivery_route_notes", FieldValue::OptText(v)));
        }
        if let Some(v) = input.issues {
            fields.push(FieldWrite::new("issues", FieldValue::Json(v)));
        }
        fields
    }

    fn filter_predicates(filter: DailyLogFilter) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(from) = filter.from {
            predicates.push(Predicate::gte("log_date", "date_from", date_value(from)));
        }
        if let Some(to) = filter.to {
            predicates.push(Predicate::lte("log_date", "date_to", date_value(to)));
        }
        predicates
    }
}
