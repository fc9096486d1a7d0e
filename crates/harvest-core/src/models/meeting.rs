//! Scheduled meetings with customers, suppliers or partners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HarvestResult;
use crate::repository::{FieldValue, FieldWrite, Predicate, ScopedEntity};
use crate::validation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: Uuid,
    pub tenant_id: String,
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub attendees: Vec<String>,
    pub notes: Option<String>,
    pub reminders_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meeting {
    /// Whether the meeting starts within `[from, to]`.
    pub fn falls_within(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.date_time >= from && self.date_time <= to
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMeeting {
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub attendees: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateMeeting {
    pub title: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
    pub attendees: Option<Vec<String>>,
    pub notes: Option<Option<String>>,
    pub reminders_sent: Option<bool>,
}

/// Both bounds of the date range are inclusive.
#[derive(Debug, Clone, Default)]
pub struct MeetingFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub reminders_sent: Option<bool>,
}

impl ScopedEntity for Meeting {
    const KIND: &'static str = "meeting";

    type Create = CreateMeeting;
    type Update = UpdateMeeting;
    type Filter = MeetingFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreateMeeting) -> HarvestResult<()> {
        validation::require_non_empty("title", &input.title)?;
        for attendee in &input.attendees {
            validation::require_non_empty("attendees", attendee)?;
        }
        Ok(())
    }

    fn validate_update(input: &UpdateMeeting) -> HarvestResult<()> {
        if let Some(title) = &input.title {
            validation::require_non_empty("title", title)?;
        }
        for attendee in input.attendees.iter().flatten() {
            validation::require_non_empty("attendees", attendee)?;
        }
        Ok(())
    }

    fn create_fields(input: CreateMeeting) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("title", FieldValue::Text(input.title.trim().to_string())),
            FieldWrite::new("date_time", FieldValue::Timestamp(input.date_time)),
            FieldWrite::new("attendees", FieldValue::TextList(input.attendees)),
            FieldWrite::new("notes", FieldValue::OptText(input.notes)),
            FieldWrite::new("reminders_sent", FieldValue::Bool(false)),
        ]
    }

    fn update_fields(input: UpdateMeeting) -> Vec<FieldWrite> {
        let mut fields = Vec::new();
        if let Some(title) = input.title {
            fields.push(FieldWrite::new("title", FieldValue::Text(title.trim().to_string())));
        }
        if let Some(v) = input.date_time {
            fields.push(FieldWrite::new("date_time", FieldValue::Timestamp(v)));
        }
        if let Some(v) = input.attendees {
            fields.push(FieldWrite::new("attendees", FieldValue::TextList(v)));
        }
        if let Some(v) = input.notes {
            fields.push(FieldWrite::new("notes", FieldValue::OptText(v)));
        }
        if let Some(v) = input.reminders_sent {
            fields.push(FieldWrite::new("reminders_sent", FieldValue::Bool(v)));
        }
        fields
    }

    fn filter_predicates(filter: MeetingFilter) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(from) = filter.from {
            predicates.push(Predicate::gte(
                "date_time",
                "date_from",
                FieldValue::Timestamp(from),
            ));
        }
        if let Some(to) = filter.to {
            predicates.push(Predicate::lte("date_time", "date_to", FieldValue::Timestamp(to)));
        }
        if let Some(sent) = filter.reminders_sent {
            predicates.push(Predicate::eq("reminders_sent", FieldValue::Bool(sent)));
        }
        predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::field_value;

    #[test]
    fn new_meetings_have_no_reminders_sent() {
        let fields = Meeting::create_fields(CreateMeeting {
            title: " Supplier review ".into(),
            date_time: Utc::now(),
            attendees: vec!["Marcia".into(), "Devon".into()],
            notes: None,
        });
        assert_eq!(
            field_value(&fields, "reminders_sent"),
            Some(&FieldValue::Bool(false))
        );
        assert_eq!(
            field_value(&fields, "title"),
            Some(&FieldValue::Text("Supplier review".into()))
        );
    }

    #[test]
    fn blank_attendees_are_rejected() {
        let input = CreateMeeting {
            title: "Menu tasting".into(),
            date_time: Utc::now(),
            attendees: vec!["Chef Ricardo".into(), "  ".into()],
            notes: None,
        };
        assert!(Meeting::validate_create(&input).is_err());
    }
}
