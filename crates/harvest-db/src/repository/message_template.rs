use chrono::{DateTime, Utc};
use harvest_core::models::message_template::{Channel, MessageTemplate};
use surrealdb_types::SurrealValue;

use super::{SurrealEntity, parse_record_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub struct MessageTemplateRow {
    record_id: String,
    tenant_id: String,
    name: String,
    channel: String,
    subject: Option<String>,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for MessageTemplate {
    type Row = MessageTemplateRow;

    fn from_row(row: MessageTemplateRow) -> Result<Self, DbError> {
        let channel = Channel::parse(&row.channel)
            .map_err(|e| DbError::invalid_record("message_template", &row.record_id, e))?;
        Ok(MessageTemplate {
            id: parse_record_id("message_template", &row.record_id)?,
            tenant_id: row.tenant_id,
            name: row.name,
            channel,
            subject: row.subject,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
