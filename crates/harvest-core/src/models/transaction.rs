//! Financial transaction model (income and expenses).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HarvestError, HarvestResult};
use crate::repository::{FieldValue, FieldWrite, Predicate, ScopedEntity};
use crate::validation;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    pub fn parse(s: &str) -> HarvestResult<Self> {
        match s {
            "Income" => Ok(Self::Income),
            "Expense" => Ok(Self::Expense),
            other => Err(HarvestError::validation(format!(
                "unknown transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub tenant_id: String,
    pub date: DateTime<Utc>,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: f64,
    /// Entity this transaction relates to, e.g. an invoice or payment.
    pub related_entity_id: Option<Uuid>,
    pub related_entity_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Amount with income positive and expenses negative.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransaction {
    pub date: DateTime<Utc>,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: f64,
    pub related_entity_id: Option<Uuid>,
    pub related_entity_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTransaction {
    pub date: Option<DateTime<Utc>>,
    pub kind: Option<TransactionKind>,
    pub description: Option<String>,
    pub amount: Option<f64>,
}

/// Both bounds of the date range are inclusive.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ScopedEntity for Transaction {
    const KIND: &'static str = "financial_transaction";

    type Create = CreateTransaction;
    type Update = UpdateTransaction;
    type Filter = TransactionFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreateTransaction) -> HarvestResult<()> {
        validation::require_non_empty("description", &input.description)?;
        validation::require_positive("amount", input.amount)?;
        if input.related_entity_id.is_some() && input.related_entity_type.is_none() {
            return Err(HarvestError::validation(
                "related_entity_type is required with related_entity_id",
            ));
        }
        Ok(())
    }

    fn validate_update(input: &UpdateTransaction) -> HarvestResult<()> {
        if let Some(description) = &input.description {
            validation::require_non_empty("description", description)?;
        }
        if let Some(amount) = input.amount {
            validation::require_positive("amount", amount)?;
        }
        Ok(())
    }

    fn create_fields(input: CreateTransaction) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("date", FieldValue::Timestamp(input.date)),
            FieldWrite::new("kind", FieldValue::Text(input.kind.as_str().into())),
            FieldWrite::new("description", FieldValue::Text(input.description)),
            FieldWrite::new("amount", FieldValue::Float(input.amount)),
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

    fn update_fields(input: UpdateTransaction) -> Vec<FieldWrite> {
        let mut fields = Vec::new();
        if let Some(date) = input.date {
            fields.push(FieldWrite::new("date", FieldValue::Timestamp(date)));
        }
        if let Some(kind) = input.kind {
            fields.push(FieldWrite::new("kind", FieldValue::Text(kind.as_str().into())));
        }
        if let Some(description) = input.description {
            fields.push(FieldWrite::new("description", FieldValue::Text(description)));
        }
        if let Some(amount) = input.amount {
            fields.push(FieldWrite::new("amount", FieldValue::Float(amount)));
        }
        fields
    }

    fn filter_predicates(filter: TransactionFilter) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(kind) = filter.kind {
            predicates.push(Predicate::eq("kind", FieldValue::Text(kind.as_str().into())));
        }
        if let Some(from) = filter.from {
            predicates.push(Predicate::gte("date", "date_from", FieldValue::Timestamp(from)));
        }
        if let Some(to) = filter.to {
            predicates.push(Predicate::lte("date", "date_to", FieldValue::Timestamp(to)));
        }
        predicates
    }
}
