//! Follow-up tasks, optionally tied to another record of the business.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HarvestError, HarvestResult};
use crate::repository::{FieldValue, FieldWrite, Predicate, ScopedEntity};
use crate::validation;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> HarvestResult<Self> {
        match s {
            "Pending" => Ok(Self::Pending),
            "In Progress" => Ok(Self::InProgress),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(HarvestError::validation(format!(
                "unknown task status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpTask {
    pub id: Uuid,
    pub tenant_id: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub assigned_to: Option<String>,
    /// Record the task is about, e.g. a customer or an order. Not checked
    /// as a reference since the target table varies.
    pub related_entity_id: Option<Uuid>,
    pub related_entity_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FollowUpTask {
    /// Still pending and due before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Pending && self.due_date.is_some_and(|due| due < now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFollowUpTask {
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub related_entity_id: Option<Uuid>,
    pub related_entity_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateFollowUpTask {
    pub description: Option<String>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct FollowUpTaskFilter {
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<String>,
    pub related_entity_id: Option<Uuid>,
}

impl ScopedEntity for FollowUpTask {
    const KIND: &'static str = "follow_up_task";

    type Create = CreateFollowUpTask;
    type Update = UpdateFollowUpTask;
    type Filter = FollowUpTaskFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreateFollowUpTask) -> HarvestResult<()> {
        validation::require_non_empty("description", &input.description)?;
        if input.related_entity_id.is_some() && input.related_entity_type.is_none() {
            return Err(HarvestError::validation(
                "related_entity_type is required with related_entity_id",
            ));
        }
        Ok(())
    }

    fn validate_update(input: &UpdateFollowUpTask) -> HarvestResult<()> {
        if let Some(description) = &input.description {
            validation::require_non_empty("description", description)?;
        }
        Ok(())
    }

    fn create_fields(input: CreateFollowUpTask) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("description", FieldValue::Text(input.description)),
            FieldWrite::new("due_date", FieldValue::OptTimestamp(input.due_date)),
            FieldWrite::new(
                "status",
                FieldValue::Text(TaskStatus::Pending.as_str().into()),
            ),
            FieldWrite::new("assigned_to", FieldValue::OptText(input.assigned_to)),
            FieldWrite::new(
                "related_entity_id",
                FieldValue::OptText(input.related_entity_id.map(|id| id.to_string())),
            ),
            FieldWrite::new(
                "related_entity_type",
                FieldValue::OptText(input.related_entity_type),
            ),
        ]
    }

    fn update_fields(input: UpdateFollowUpTask) -> Vec<FieldWrite> {
        let mut fields = Vec::new();
        if let Some(v) = input.description {
            fields.push(FieldWrite::new("description", FieldValue::Text(v)));
        }
        if let Some(v) = input.due_date {
            fields.push(FieldWrite::new("due_date", FieldValue::OptTimestamp(v)));
        }
        if let Some(status) = input.status {
            fields.push(FieldWrite::new("status", FieldValue::Text(status.as_str().into())));
        }
        if let Some(v) = input.assigned_to {
            fields.push(FieldWrite::new("assigned_to", FieldValue::OptText(v)));
        }
        fields
    }

    fn filter_predicates(filter: FollowUpTaskFilter) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(status) = filter.status {
            predicates.push(Predicate::eq("status", FieldValue::Text(status.as_str().into())));
        }
        if let Some(assignee) = filter.assigned_to {
            predicates.push(Predicate::eq("assigned_to", FieldValue::Text(assignee)));
        }
        if let Some(id) = filter.related_entity_id {
            predicates.push(Predicate::eq(
                "related_entity_id",
                FieldValue::Text(id.to_string()),
            ));
        }
        predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task(status: TaskStatus, due_date: Option<DateTime<Utc>>) -> FollowUpTask {
        let now = Utc::now();
        FollowUpTask {
            id: Uuid::now_v7(),
            tenant_id: "island_harvest".into(),
            description: "Call about weekly produce order".into(),
            due_date,
            status,
            assigned_to: None,
            related_entity_id: None,
            related_entity_type: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn only_pending_past_due_tasks_are_overdue() {
        let now = Utc::now();
        let yesterday = Some(now - Duration::days(1));
        assert!(task(TaskStatus::Pending, yesterday).is_overdue(now));
        assert!(!task(TaskStatus::Completed, yesterday).is_overdue(now));
        assert!(!task(TaskStatus::Pending, Some(now + Duration::days(1))).is_overdue(now));
        assert!(!task(TaskStatus::Pending, None).is_overdue(now));
    }

    #[test]
    fn related_id_requires_type() {
        let input = CreateFollowUpTask {
            description: "Send revised invoice".into(),
            due_date: None,
            assigned_to: None,
            related_entity_id: Some(Uuid::now_v7()),
            related_entity_type: None,
        };
        assert!(FollowUpTask::validate_create(&input).is_err());
    }
}
