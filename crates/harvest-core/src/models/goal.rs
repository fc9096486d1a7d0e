//! Business goal tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HarvestError, HarvestResult};
use crate::repository::{FieldValue, FieldWrite, Predicate, ScopedEntity};
use crate::validation;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GoalStatus {
    InProgress,
    Completed,
    OnHold,
    Cancelled,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::OnHold => "On Hold",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> HarvestResult<Self> {
        match s {
            "In Progress" => Ok(Self::InProgress),
            "Completed" => Ok(Self::Completed),
            "On Hold" => Ok(Self::OnHold),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(HarvestError::validation(format!(
                "unknown goal status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub target_value: f64,
    pub current_value: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Progress towards the target, capped at 100.
    pub fn progress_percentage(&self) -> f64 {
        if self.target_value <= 0.0 {
            return 0.0;
        }
        (self.current_value / self.target_value * 100.0).min(100.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGoal {
    pub name: String,
    pub description: Option<String>,
    pub target_value: f64,
    pub current_value: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateGoal {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<GoalStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct GoalFilter {
    pub status: Option<GoalStatus>,
}

impl ScopedEntity for Goal {
    const KIND: &'static str = "goal";
    const UNIQUE_FIELD: Option<&'static str> = Some("name");

    type Create = CreateGoal;
    type Update = UpdateGoal;
    type Filter = GoalFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreateGoal) -> HarvestResult<()> {
        validation::require_non_empty("name", &input.name)?;
        validation::require_positive("target_value", input.target_value)?;
        validation::require_finite("current_value", input.current_value)?;
        validation::require_ordered("start_date", input.start_date, "end_date", input.end_date)
    }

    fn validate_update(input: &UpdateGoal) -> HarvestResult<()> {
        if let Some(name) = &input.name {
            validation::require_non_empty("name", name)?;
        }
        if let Some(target) = input.target_value {
            validation::require_positive("target_value", target)?;
        }
        if let Some(current) = input.current_value {
            validation::require_finite("current_value", current)?;
        }
        Ok(())
    }

    fn validate_update_of(&self, input: &UpdateGoal) -> HarvestResult<()> {
        match input.end_date {
            Some(end) => validation::require_ordered("start_date", self.start_date, "end_date", end),
            None => Ok(()),
        }
    }

    fn create_fields(input: CreateGoal) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("name", FieldValue::Text(input.name.trim().to_string())),
            FieldWrite::new("description", FieldValue::OptText(input.description)),
            FieldWrite::new("target_value", FieldValue::Float(input.target_value)),
            FieldWrite::new("current_value", FieldValue::Float(input.current_value)),
            FieldWrite::new("start_date", FieldValue::Timestamp(input.start_date)),
            FieldWrite::new("end_date", FieldValue::Timestamp(input.end_date)),
            FieldWrite::new(
                "status",
                FieldValue::Text(GoalStatus::InProgress.as_str().into()),
            ),
        ]
    }

    fn update_fields(input: UpdateGoal) -> Vec<FieldWrite> {
        let mut fields = Vec::new();
        if let Some(name) = input.name {
            fields.push(FieldWrite::new("name", FieldValue::Text(name.trim().to_string())));
        }
        if let Some(v) = input.description {
            fields.push(FieldWrite::new("description", FieldValue::OptText(v)));
        }
        if let Some(v) = input.target_value {
            fields.push(FieldWrite::new("target_value", FieldValue::Float(v)));
        }
        if let Some(v) = input.current_value {
            fields.push(FieldWrite::new("current_value", FieldValue::Float(v)));
        }
        if let Some(v) = input.end_date {
            fields.push(FieldWrite::new("end_date", FieldValue::Timestamp(v)));
        }
        if let Some(status) = input.status {
            fields.push(FieldWrite::new("status", FieldValue::Text(status.as_str().into())));
        }
        fields
    }

    fn filter_predicates(filter: GoalFilter) -> Vec<Predicate> {
        filter
            .status
            .map(|s| Predicate::eq("status", FieldValue::Text(s.as_str().into())))
            .into_iter()
            .collect()
    }
}
