use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HarvestError, HarvestResult};
use crate::repository::{FieldValue, FieldWrite, Predicate, ScopedEntity};
use crate::validation;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Channel {
    Email,
    WhatsApp,
    Sms,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::WhatsApp => "WhatsApp",
            Self::Sms => "SMS",
        }
    }

    pub fn parse(s: &str) -> HarvestResult<Self> {
        match s {
            "Email" => Ok(Self::Email),
            "WhatsApp" => Ok(Self::WhatsApp),
            "SMS" => Ok(Self::Sms),
            other => Err(HarvestError::validation(format!("unknown channel: {other}"))),
        }
    }
}

/// Reusable outbound message with `{placeholder}` slots in its body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub channel: Channel,
    pub subject: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageTemplate {
    pub name: String,
    pub channel: Channel,
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateMessageTemplate {
    pub name: Option<String>,
    pub subject: Option<Option<String>>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MessageTemplateFilter {
    pub channel: Option<Channel>,
}

impl ScopedEntity for MessageTemplate {
    const KIND: &'static str = "message_template";
    const UNIQUE_FIELD: Option<&'static str> = Some("name");

    type Create = CreateMessageTemplate;
    type Update = UpdateMessageTemplate;
    type Filter = MessageTemplateFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreateMessageTemplate) -> HarvestResult<()> {
        validation::require_non_empty("name", &input.name)?;
        validation::require_non_empty("body", &input.body)?;
        if input.channel == Channel::Email && input.subject.is_none() {
            return Err(HarvestError::validation("email templates need a subject"));
        }
        Ok(())
    }

    fn validate_update(input: &UpdateMessageTemplate) -> HarvestResult<()> {
        if let Some(name) = &input.name {
            validation::require_non_empty("name", name)?;
        }
        if let Some(body) = &input.body {
            validation::require_non_empty("body", body)?;
        }
        Ok(())
    }

    fn create_fields(input: CreateMessageTemplate) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("name", FieldValue::Text(input.name.trim().to_string())),
            FieldWrite::new("channel", FieldValue::Text(input.channel.as_str().into())),
            FieldWrite::new("subject", FieldValue::OptText(input.subject)),
            FieldWrite::new("body", FieldValue::Text(input.body)),
        ]
    }

    fn update_fields(input: UpdateMessageTemplate) -> Vec<FieldWrite> {
        let mut fields = Vec::new();
        if let Some(name) = input.name {
            fields.push(FieldWrite::new("name", FieldValue::Text(name.trim().to_string())));
        }
        if let Some(subject) = input.subject {
            fields.push(FieldWrite::new("subject", FieldValue::OptText(subject)));
        }
        if let Some(body) = input.body {
            fields.push(FieldWrite::new("body", FieldValue::Text(body)));
        }
        fields
    }

    fn filter_predicates(filter: MessageTemplateFilter) -> Vec<Predicate> {
        filter
            .channel
            .map(|c| Predicate::eq("channel", FieldValue::Text(c.as_str().into())))
            .into_iter()
            .collect()
    }
}
