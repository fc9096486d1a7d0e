//! Key performance indicators, one named metric per business.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HarvestResult;
use crate::repository::{FieldValue, FieldWrite, Predicate, ScopedEntity};
use crate::validation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetric {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    /// Stored as `metric_value`.
    pub value: f64,
    /// When the value was measured.
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePerformanceMetric {
    pub name: String,
    pub value: f64,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePerformanceMetric {
    pub name: Option<String>,
    pub value: Option<f64>,
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<Option<String>>,
}

/// Both bounds of the date range are inclusive.
#[derive(Debug, Clone, Default)]
pub struct PerformanceMetricFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ScopedEntity for PerformanceMetric {
    const KIND: &'static str = "performance_metric";
    const UNIQUE_FIELD: Option<&'static str> = Some("name");

    type Create = CreatePerformanceMetric;
    type Update = UpdatePerformanceMetric;
    type Filter = PerformanceMetricFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreatePerformanceMetric) -> HarvestResult<()> {
        validation::require_non_empty("name", &input.name)?;
        validation::require_finite("value", input.value)
    }

    fn validate_update(input: &UpdatePerformanceMetric) -> HarvestResult<()> {
        if let Some(name) = &input.name {
            validation::require_non_empty("name", name)?;
        }
        if let Some(value) = input.value {
            validation::require_finite("value", value)?;
        }
        Ok(())
    }

    fn create_fields(input: CreatePerformanceMetric) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("name", FieldValue::Text(input.name.trim().to_string())),
            FieldWrite::new("metric_value", FieldValue::Float(input.value)),
            FieldWrite::new("date", FieldValue::Timestamp(input.date)),
            FieldWrite::new("notes", FieldValue::OptText(input.notes)),
        ]
    }

    fn update_fields(input: UpdatePerformanceMetric) -> Vec<FieldWrite> {
        let mut fields = Vec::new();
        if let Some(name) = input.name {
            fields.push(FieldWrite::new("name", FieldValue::Text(name.trim().to_string())));
        }
        if let Some(v) = input.value {
            fields.push(FieldWrite::new("metric_value", FieldValue::Float(v)));
        }
        if let Some(v) = input.date {
            fields.push(FieldWrite::new("date", FieldValue::Timestamp(v)));
        }
        if let Some(v) = input.notes {
            fields.push(FieldWrite::new("notes", FieldValue::OptText(v)));
        }
        fields
    }

    fn filter_predicates(filter: PerformanceMetricFilter) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(from) = filter.from {
            predicates.push(Predicate::gte("date", "date_from", FieldValue::Timestamp(from)));
        }
        if let Some(to) = filter.to {
            predicates.push(Predicate::lte("date", "date_to", FieldValue::Timestamp(to)));
        }
        predicates
    }
}
