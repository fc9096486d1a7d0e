//! Business partnerships and their lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HarvestError, HarvestResult};
use crate::repository::{FieldValue, FieldWrite, Predicate, ScopedEntity};
use crate::validation;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PartnershipKind {
    Supplier,
    Customer,
    ServiceProvider,
    Other,
}

impl PartnershipKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Supplier => "Supplier",
            Self::Customer => "Customer",
            Self::ServiceProvider => "Service Provider",
            Self::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> HarvestResult<Self> {
        match s {
            "Supplier" => Ok(Self::Supplier),
            "Customer" => Ok(Self::Customer),
            "Service Provider" => Ok(Self::ServiceProvider),
            "Other" => Ok(Self::Other),
            other => Err(HarvestError::validation(format!(
                "unknown partnership type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PartnershipStatus {
    Prospect,
    Active,
    Inactive,
    Terminated,
}

impl PartnershipStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prospect => "Prospect",
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Terminated => "Terminated",
        }
    }

    pub fn parse(s: &str) -> HarvestResult<Self> {
        match s {
            "Prospect" => Ok(Self::Prospect),
            "Active" => Ok(Self::Active),
            "Inactive" => Ok(Self::Inactive),
            "Terminated" => Ok(Self::Terminated),
            other => Err(HarvestError::validation(format!(
                "unknown partnership status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partnership {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub kind: Option<PartnershipKind>,
    pub contact_person: Option<String>,
    pub status: PartnershipStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePartnership {
    pub name: String,
    pub kind: Option<PartnershipKind>,
    pub contact_person: Option<String>,
    pub status: PartnershipStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePartnership {
    pub name: Option<String>,
    pub kind: Option<Option<PartnershipKind>>,
    pub contact_person: Option<Option<String>>,
    pub status: Option<PartnershipStatus>,
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct PartnershipFilter {
    pub status: Option<PartnershipStatus>,
    pub kind: Option<PartnershipKind>,
}

impl ScopedEntity for Partnership {
    const KIND: &'static str = "partnership";

    type Create = CreatePartnership;
    type Update = UpdatePartnership;
    type Filter = PartnershipFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreatePartnership) -> HarvestResult<()> {
        validation::require_non_empty("name", &input.name)
    }

    fn validate_update(input: &UpdatePartnership) -> HarvestResult<()> {
        if let Some(name) = &input.name {
            validation::require_non_empty("name", name)?;
        }
        Ok(())
    }

    fn create_fields(input: CreatePartnership) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("name", FieldValue::Text(input.name.trim().to_string())),
            FieldWrite::new(
                "kind",
                FieldValue::OptText(input.kind.map(|k| k.as_str().to_string())),
            ),
            FieldWrite::new("contact_person", FieldValue::OptText(input.contact_person)),
            FieldWrite::new("status", FieldValue::Text(input.status.as_str().into())),
            FieldWrite::new("notes", FieldValue::OptText(input.notes)),
        ]
    }

    fn update_fields(input: UpdatePartnership) -> Vec<FieldWrite> {
        let mut fields = Vec::new();
        if let Some(name) = input.name {
            fields.push(FieldWrite::new("name", FieldValue::Text(name.trim().to_string())));
        }
        if let Some(kind) = input.kind {
            fields.push(FieldWrite::new(
                "kind",
                FieldValue::OptText(kind.map(|k| k.as_str().to_string())),
            ));
        }
        if let Some(v) = input.contact_person {
            fields.push(FieldWrite::new("contact_person", FieldValue::OptText(v)));
        }
        if let Some(status) = input.status {
            fields.push(FieldWrite::new("status", FieldValue::Text(status.as_str().into())));
        }
        if let Some(v) = input.notes {
            fields.push(FieldWrite::new("notes", FieldValue::OptText(v)));
        }
        fields
    }

    fn filter_predicates(filter: PartnershipFilter) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(status) = filter.status {
            predicates.push(Predicate::eq("status", FieldValue::Text(status.as_str().into())));
        }
        if let Some(kind) = filter.kind {
            predicates.push(Predicate::eq("kind", FieldValue::Text(kind.as_str().into())));
        }
        predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_provider_is_stored_with_a_space() {
        assert_eq!(PartnershipKind::ServiceProvider.as_str(), "Service Provider");
        assert_eq!(
            PartnershipKind::parse("Service Provider").unwrap(),
            PartnershipKind::ServiceProvider
        );
        assert!(PartnershipStatus::parse("Dormant").is_err());
    }
}
