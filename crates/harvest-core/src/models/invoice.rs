//! Invoice domain model. Each order is billed by at most one invoice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HarvestError, HarvestResult};
use crate::repository::{FieldValue, FieldWrite, Predicate, Reference, ScopedEntity};
use crate::validation;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Overdue => "Overdue",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> HarvestResult<Self> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Overdue" => Ok(Self::Overdue),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(HarvestError::validation(format!(
                "unknown invoice status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub tenant_id: String,
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub invoice_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub total_amount: f64,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoice {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub invoice_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateInvoice {
    pub due_date: Option<DateTime<Utc>>,
    pub total_amount: Option<f64>,
    pub status: Option<InvoiceStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub customer_id: Option<Uuid>,
    pub status: Option<InvoiceStatus>,
}

impl ScopedEntity for Invoice {
    const KIND: &'static str = "invoice";
    const UNIQUE_FIELD: Option<&'static str> = Some("order_id");
    const REFERENCES: &'static [Reference] = &[
        Reference {
            field: "order_id",
            kind: "sales_order",
        },
        Reference {
            field: "customer_id",
            kind: "customer",
        },
    ];

    type Create = CreateInvoice;
    type Update = UpdateInvoice;
    type Filter = InvoiceFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreateInvoice) -> HarvestResult<()> {
        validation::require_ordered(
            "invoice_date",
            input.invoice_date,
            "due_date",
            input.due_date,
        )?;
        validation::require_non_negative("total_amount", input.total_amount)
    }

    fn validate_update(input: &UpdateInvoice) -> HarvestResult<()> {
        if let Some(total) = input.total_amount {
            validation::require_non_negative("total_amount", total)?;
        }
        Ok(())
    }

    fn create_fields(input: CreateInvoice) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("order_id", FieldValue::Ref(input.order_id)),
            FieldWrite::new("customer_id", FieldValue::Ref(input.customer_id)),
            FieldWrite::new("invoice_date", FieldValue::Timestamp(input.invoice_date)),
            FieldWrite::new("due_date", FieldValue::Timestamp(input.due_date)),
            FieldWrite::new("total_amount", FieldValue::Float(input.total_amount)),
            FieldWrite::new(
                "status",
                FieldValue::Text(InvoiceStatus::Pending.as_str().into()),
            ),
        ]
    }

    fn update_fields(input: UpdateInvoice) -> Vec<FieldWrite> {
        let mut fields = Vec::new();
        if let Some(due) = input.due_date {
            fields.push(FieldWrite::new("due_date", FieldValue::Timestamp(due)));
        }
        if let Some(total) = input.total_amount {
            fields.push(FieldWrite::new("total_amount", FieldValue::Float(total)));
        }
        if let Some(status) = input.status {
            fields.push(FieldWrite::new("status", FieldValue::Text(status.as_str().into())));
        }
        fields
    }

    fn filter_predicates(filter: InvoiceFilter) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(customer_id) = filter.customer_id {
            predicates.push(Predicate::eq("customer_id", FieldValue::Ref(customer_id)));
        }
        if let Some(status) = filter.status {
            predicates.push(Predicate::eq(
                "status",
                FieldValue::Text(status.as_str().into()),
            ));
        }
        predicates
    }
}
