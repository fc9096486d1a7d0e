//! Customer order and order line models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HarvestError, HarvestResult};
use crate::repository::{Dependent, FieldValue, FieldWrite, Predicate, Reference, ScopedEntity};
use crate::validation;

/// Records that hang off an order: its lines and its invoice.
pub(crate) const ORDER_DEPENDENTS: &[Dependent] = &[
    Dependent {
        kind: "order_item",
        field: "order_id",
        dependents: &[],
    },
    Dependent {
        kind: "invoice",
        field: "order_id",
        dependents: &[],
    },
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> HarvestResult<Self> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(HarvestError::validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub tenant_id: String,
    pub customer_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    pub customer_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    pub total_amount: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateOrder {
    pub status: Option<OrderStatus>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub total_amount: Option<Option<f64>>,
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

impl ScopedEntity for Order {
    const KIND: &'static str = "sales_order";
    const REFERENCES: &'static [Reference] = &[Reference {
        field: "customer_id",
        kind: "customer",
    }];
    const DEPENDENTS: &'static [Dependent] = ORDER_DEPENDENTS;

    type Create = CreateOrder;
    type Update = UpdateOrder;
    type Filter = OrderFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreateOrder) -> HarvestResult<()> {
        validation::require_ordered(
            "order_date",
            input.order_date,
            "delivery_date",
            input.delivery_date,
        )?;
        if let Some(total) = input.total_amount {
            validation::require_non_negative("total_amount", total)?;
        }
        Ok(())
    }

    fn validate_update(input: &UpdateOrder) -> HarvestResult<()> {
        if let Some(Some(total)) = input.total_amount {
            validation::require_non_negative("total_amount", total)?;
        }
        Ok(())
    }

    fn validate_update_of(&self, input: &UpdateOrder) -> HarvestResult<()> {
        match input.delivery_date {
            Some(delivery) => {
                validation::require_ordered("order_date", self.order_date, "delivery_date", delivery)
            }
            None => Ok(()),
        }
    }

    fn create_fields(input: CreateOrder) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("customer_id", FieldValue::Ref(input.customer_id)),
            FieldWrite::new("order_date", FieldValue::Timestamp(input.order_date)),
            FieldWrite::new("delivery_date", FieldValue::Timestamp(input.delivery_date)),
            FieldWrite::new(
                "status",
                FieldValue::Text(OrderStatus::Pending.as_str().into()),
            ),
            FieldWrite::new("total_amount", FieldValue::OptFloat(input.total_amount)),
            FieldWrite::new("notes", FieldValue::OptText(input.notes)),
        ]
    }

    fn update_fields(input: UpdateOrder) -> Vec<FieldWrite> {
        let mut fields = Vec::new();
        if let Some(status) = input.status {
            fields.push(FieldWrite::new("status", FieldValue::Text(status.as_str().into())));
        }
        if let Some(date) = input.delivery_date {
            fields.push(FieldWrite::new("delivery_date", FieldValue::Timestamp(date)));
        }
        if let Some(total) = input.total_amount {
            fields.push(FieldWrite::new("total_amount", FieldValue::OptFloat(total)));
        }
        if let Some(notes) = input.notes {
            fields.push(FieldWrite::new("notes", FieldValue::OptText(notes)));
        }
        fields
    }

    fn filter_predicates(filter: OrderFilter) -> Vec<Predicate> {
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

/// One product line of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub tenant_id: String,
    pub order_id: Uuid,
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn subtotal(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderItem {
    pub order_id: Uuid,
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateOrderItem {
    pub product_name: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderItemFilter {
    pub order_id: Option<Uuid>,
}

impl ScopedEntity for OrderItem {
    const KIND: &'static str = "order_item";
    const REFERENCES: &'static [Reference] = &[Reference {
        field: "order_id",
        kind: "sales_order",
    }];

    type Create = CreateOrderItem;
    type Update = UpdateOrderItem;
    type Filter = OrderItemFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn validate_create(input: &CreateOrderItem) -> HarvestResult<()> {
        validation::require_non_empty("product_name", &input.product_name)?;
        validation::require_positive("quantity", input.quantity)?;
        validation::require_non_negative("unit_price", input.unit_price)
    }

    fn validate_update(input: &UpdateOrderItem) -> HarvestResult<()> {
        if let Some(name) = &input.product_name {
            validation::require_non_empty("product_name", name)?;
        }
        if let Some(quantity) = input.quantity {
            validation::require_positive("quantity", quantity)?;
        }
        if let Some(price) = input.unit_price {
            validation::require_non_negative("unit_price", price)?;
        }
        Ok(())
    }

    fn create_fields(input: CreateOrderItem) -> Vec<FieldWrite> {
        vec![
            FieldWrite::new("order_id", FieldValue::Ref(input.order_id)),
            FieldWrite::new("product_name", FieldValue::Text(input.product_name)),
            FieldWrite::new("quantity", FieldValue::Float(input.quantity)),
            FieldWrite::new("unit_price", FieldValue::Float(input.unit_price)),
        ]
    }

    fn update_fields(input: UpdateOrderItem) -> Vec<FieldWrite> {
        let mut fields = Vec::new();
        if let Some(name) = input.product_name {
            fields.push(FieldWrite::new("product_name", FieldValue::Text(name)));
        }
        if let Some(quantity) = input.quantity {
            fields.push(FieldWrite::new("quantity", FieldValue::Float(quantity)));
        }
        if let Some(price) = input.unit_price {
            fields.push(FieldWrite::new("unit_price", FieldValue::Float(price)));
        }
        fields
    }

    fn filter_predicates(filter: OrderItemFilter) -> Vec<Predicate> {
        filter
            .order_id
            .map(|id| Predicate::eq("order_id", FieldValue::Ref(id)))
            .into_iter()
            .collect()
    }
}
