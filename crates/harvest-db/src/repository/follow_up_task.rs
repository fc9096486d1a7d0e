use chrono::{DateTime, Utc};
use harvest_core::models::follow_up_task::{FollowUpTask, TaskStatus};
use surrealdb_types::SurrealValue;

use super::{SurrealEntity, parse_record_id, parse_ref};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub struct FollowUpTaskRow {
    record_id: String,
    tenant_id: String,
    description: String,
    due_date: Option<DateTime<Utc>>,
    status: String,
    assigned_to: Option<String>,
    related_entity_id: Option<String>,
    related_entity_type: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for FollowUpTask {
    type Row = FollowUpTaskRow;

    fn from_row(row: FollowUpTaskRow) -> Result<Self, DbError> {
        let status = TaskStatus::parse(&row.status)
            .map_err(|e| DbError::invalid_record("follow_up_task", &row.record_id, e))?;
        let related_entity_id = row
            .related_entity_id
            .as_deref()
            .map(|id| parse_ref("follow_up_task", &row.record_id, "related_entity_id", id))
            .transpose()?;
        Ok(FollowUpTask {
            id: parse_record_id("follow_up_task", &row.record_id)?,
            tenant_id: row.tenant_id,
            description: row.description,
            due_date: row.due_date,
            status,
            assigned_to: row.assigned_to,
            related_entity_id,
            related_entity_type: row.related_entity_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
