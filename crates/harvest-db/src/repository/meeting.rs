use chrono::{DateTime, Utc};
use harvest_core::models::meeting::Meeting;
use surrealdb_types::SurrealValue;

use super::{SurrealEntity, parse_record_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub struct MeetingRow {
    record_id: String,
    tenant_id: String,
    title: String,
    date_time: DateTime<Utc>,
    attendees: Vec<String>,
    notes: Option<String>,
    reminders_sent: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for Meeting {
    type Row = MeetingRow;

    fn from_row(row: MeetingRow) -> Result<Self, DbError> {
        Ok(Meeting {
            id: parse_record_id("meeting", &row.record_id)?,
            tenant_id: row.tenant_id,
            title: row.title,
            date_time: row.date_time,
            attendees: row.attendees,
            notes: row.notes,
            reminders_sent: row.reminders_sent,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
