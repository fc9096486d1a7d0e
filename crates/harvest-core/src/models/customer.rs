//! Customer domain model.
//!
//! Customers are the hotels and restaurants a business sells to. A
//! customer name identifies the record within its tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HarvestResult;
use crate::repository::{Dependent, FieldValue, FieldWrite, Predicate, ScopedEntity};
use crate::validation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Free-form delivery and product preferences.
    pub preferences: serde_json::Value,
    /// 1 (poor) to 10 (excellent).
    pub satisfaction_score: Option<i64>,
    /// Timestamped feedback notes, newest last.
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomer {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

impl CreateCustomer {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact_person: None,
            phone: None,
            email: None,
            address: None,
            preferences: None,
        }
    }
}

/// `Some(None)` clears an optional field, `None` leaves it unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub contact_person: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub preferences: Option<serde_json::Value>,
    pub satisfaction_score: Option<Option<i64>>,
    pub feedback: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub name: Option<String>,
}

impl ScopedEntity for Customer {
    const KIND: &'static str = "customer";
    const UNIQUE_FIELD: Option<&'static str> = Some("name");
    const DEPENDENTS: &'static [Dependent] = &[
        Dependent {
            kind: "sales_order",
            field: "customer_id",
            dependents: super::order::ORDER_DEPENDENTS,
        },
        Dependent {
            kind: "invoice",
            field: "customer_id",
            dependents: &[],
        },
    ];

    type Create = CreateCustomer;
    type Update = UpdateCustomer;
    type Filter = CustomerFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreateCustomer) -> HarvestResult<()> {
        validation::require_non_empty("name", &input.name)?;
        validation::validate_optional_phone(input.phone.as_deref())?;
        validation::validate_optional_email(input.email.as_deref())
    }

    fn validate_update(input: &UpdateCustomer) -> HarvestResult<()> {
        if let Some(name) = &input.name {
            validation::require_non_empty("name", name)?;
        }
        validation::validate_optional_phone(input.phone.as_ref().and_then(|p| p.as_deref()))?;
        validation::validate_optional_email(input.email.as_ref().and_then(|e| e.as_deref()))?;
        if let Some(Some(score)) = input.satisfaction_score {
            validation::require_in_range("satisfaction_score", score, 1, 10)?;
        }
        Ok(())
    }

    fn create_fields(input: CreateCustomer) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("name", FieldValue::Text(input.name.trim().to_string())),
            FieldWrite::new("contact_person", FieldValue::OptText(input.contact_person)),
            FieldWrite::new("phone", FieldValue::OptText(input.phone)),
            FieldWrite::new("email", FieldValue::OptText(input.email)),
            FieldWrite::new("address", FieldValue::OptText(input.address)),
            FieldWrite::new(
                "preferences",
                FieldValue::Json(
                    input
                        .preferences
                        .unwrap_or(serde_json::Value::Object(Default::default())),
                ),
            ),
        ]
    }

    fn update_fields(input: UpdateCustomer) -> Vec<FieldWrite> {
        let mut fields = Vec::new();
        if let Some(name) = input.name {
            fields.push(FieldWrite::new("name", FieldValue::Text(name.trim().to_string())));
        }
        if let Some(v) = input.contact_person {
            fields.push(FieldWrite::new("contact_person", FieldValue::OptText(v)));
        }
        if let Some(v) = input.phone {
            fields.push(FieldWrite::new("phone", FieldValue::OptText(v)));
        }
        if let Some(v) = input.email {
            fields.push(FieldWrite::new("email", FieldValue::OptText(v)));
        }
        if let Some(v) = input.address {
            fields.push(FieldWrite::new("address", FieldValue::OptText(v)));
        }
        if let Some(v) = input.preferences {
            fields.push(FieldWrite::new("preferences", FieldValue::Json(v)));
        }
        if let Some(v) = input.satisfaction_score {
            fields.push(FieldWrite::new("satisfaction_score", FieldValue::OptInt(v)));
        }
        if let Some(v) = input.feedback {
            fields.push(FieldWrite::new("feedback", FieldValue::OptText(v)));
        }
        fields
    }

    fn filter_predicates(filter: CustomerFilter) -> Vec<Predicate> {
        filter
            .name
            .map(|name| Predicate::eq("name", FieldValue::Text(name)))
            .into_iter()
            .collect()
    }
}
