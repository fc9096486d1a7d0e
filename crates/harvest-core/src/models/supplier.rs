//! Supplier (local farmer) and supplier payment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HarvestResult;
use crate::repository::{Dependent, FieldValue, FieldWrite, Predicate, Reference, ScopedEntity};
use crate::validation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Products this supplier grows or provides (e.g. `callaloo`).
    pub product_specialties: Vec<String>,
    /// Pickup days and windows, as entered by staff.
    pub pickup_schedule: serde_json::Value,
    pub performance_notes: Option<String>,
    pub training_needs: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSupplier {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub product_specialties: Vec<String>,
    pub pickup_schedule: Option<serde_json::Value>,
}

impl CreateSupplier {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact_person: None,
            phone: None,
            email: None,
            address: None,
            product_specialties: Vec::new(),
            pickup_schedule: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateSupplier {
    pub name: Option<String>,
    pub contact_person: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub product_specialties: Option<Vec<String>>,
    pub pickup_schedule: Option<serde_json::Value>,
    pub performance_notes: Option<Option<String>>,
    pub training_needs: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct SupplierFilter {
    pub name: Option<String>,
    /// Suppliers offering this product.
    pub product: Option<String>,
}

impl ScopedEntity for Supplier {
    const KIND: &'static str = "supplier";
    const UNIQUE_FIELD: Option<&'static str> = Some("name");
    const DEPENDENTS: &'static [Dependent] = &[Dependent {
        kind: "supplier_payment",
        field: "supplier_id",
        dependents: &[],
    }];

    type Create = CreateSupplier;
    type Update = UpdateSupplier;
    type Filter = SupplierFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreateSupplier) -> HarvestResult<()> {
        validation::require_non_empty("name", &input.name)?;
        validation::validate_optional_phone(input.phone.as_deref())?;
        validation::validate_optional_email(input.email.as_deref())
    }

    fn validate_update(input: &UpdateSupplier) -> HarvestResult<()> {
        if let Some(name) = &input.name {
            validation::require_non_empty("name", name)?;
        }
        validation::validate_optional_phone(input.phone.as_ref().and_then(|p| p.as_deref()))?;
        validation::validate_optional_email(input.email.as_ref().and_then(|e| e.as_deref()))
    }

    fn create_fields(input: CreateSupplier) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("name", FieldValue::Text(input.name.trim().to_string())),
            FieldWrite::new("contact_person", FieldValue::OptText(input.contact_person)),
            FieldWrite::new("phone", FieldValue::OptText(input.phone)),
            FieldWrite::new("email", FieldValue::OptText(input.email)),
            FieldWrite::new("address", FieldValue::OptText(input.address)),
            FieldWrite::new(
                "product_specialties",
                FieldValue::TextList(input.product_specialties),
            ),
            FieldWrite::new(
                "pickup_schedule",
                FieldValue::Json(
                    input
                        .pickup_schedule
                        .unwrap_or(serde_json::Value::Object(Default::default())),
                ),
            ),
        ]
    }

    fn update_fields(input: UpdateSupplier) -> Vec<FieldWrite> {
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
        if let Some(v) = input.product_specialties {
            fields.push(FieldWrite::new("product_specialties", FieldValue::TextList(v)));
        }
        if let Some(v) = input.pickup_schedule {
            fields.push(FieldWrite::new("pickup_schedule", FieldValue::Json(v)));
        }
        if let Some(v) = input.performance_notes {
            fields.push(FieldWrite::new("performance_notes", FieldValue::OptText(v)));
        }
        if let Some(v) = input.training_needs {
            fields.push(FieldWrite::new("training_needs", FieldValue::OptText(v)));
        }
        fields
    }

    fn filter_predicates(filter: SupplierFilter) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(name) = filter.name {
            predicates.push(Predicate::eq("name", FieldValue::Text(name)));
        }
        if let Some(product) = filter.product {
            predicates.push(Predicate::contains(
                "product_specialties",
                FieldValue::Text(product),
            ));
        }
        predicates
    }
}

/// A payment made to a supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierPayment {
    pub id: Uuid,
    pub tenant_id: String,
    pub supplier_id: Uuid,
    pub payment_date: DateTime<Utc>,
    pub amount: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSupplierPayment {
    pub supplier_id: Uuid,
    pub payment_date: DateTime<Utc>,
    pub amount: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateSupplierPayment {
    pub amount: Option<f64>,
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct SupplierPaymentFilter {
    pub supplier_id: Option<Uuid>,
}

impl ScopedEntity for SupplierPayment {
    const KIND: &'static str = "supplier_payment";
    const REFERENCES: &'static [Reference] = &[Reference {
        field: "supplier_id",
        kind: "supplier",
    }];

    type Create = CreateSupplierPayment;
    type Update = UpdateSupplierPayment;
    type Filter = SupplierPaymentFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreateSupplierPayment) -> HarvestResult<()> {
        validation::require_positive("amount", input.amount)
    }

    fn validate_update(input: &UpdateSupplierPayment) -> HarvestResult<()> {
        if let Some(amount) = input.amount {
            validation::require_positive("amount", amount)?;
        }
        Ok(())
    }

    fn create_fields(input: CreateSupplierPayment) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("supplier_id", FieldValue::Ref(input.supplier_id)),
            FieldWrite::new("payment_date", FieldValue::Timestamp(input.payment_date)),
            FieldWrite::new("amount", FieldValue::Float(input.amount)),
            FieldWrite::new("notes", FieldValue::OptText(input.notes)),
        ]
    }

    fn update_fields(input: UpdateSupplierPayment) -> Vec<FieldWrite> {
        let mut fields = Vec::new();
        if let Some(amount) = input.amount {
            fields.push(FieldWrite::new("amount", FieldValue::Float(amount)));
        }
        if let Some(notes) = input.notes {
            fields.push(FieldWrite::new("notes", FieldValue::OptText(notes)));
        }
        fields
    }

    fn filter_predicates(filter: SupplierPaymentFilter) -> Vec<Predicate> {
        filter
            .supplier_id
            .map(|id| Predicate::eq("supplier_id", FieldValue::Ref(id)))
            .into_iter()
            .collect()
    }
}
