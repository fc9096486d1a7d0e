use chrono::{DateTime, Utc};
use harvest_core::models::order::{Order, OrderItem, OrderStatus};
use surrealdb_types::SurrealValue;

use super::{SurrealEntity, parse_record_id, parse_ref};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub struct OrderRow {
    record_id: String,
    tenant_id: String,
    customer_id: String,
    order_date: DateTime<Utc>,
    delivery_date: DateTime<Utc>,
    status: String,
    total_amount: Option<f64>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for Order {
    type Row = OrderRow;

    fn from_row(row: OrderRow) -> Result<Self, DbError> {
        let status = OrderStatus::parse(&row.status)
            .map_err(|e| DbError::invalid_record("sales_order", &row.record_id, e))?;
        Ok(Order {
            id: parse_record_id("sales_order", &row.record_id)?,
            customer_id: parse_ref("sales_order", &row.record_id, "customer_id", &row.customer_id)?,
            tenant_id: row.tenant_id,
            order_date: row.order_date,
            delivery_date: row.delivery_date,
            status,
            total_amount: row.total_amount,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
pub struct OrderItemRow {
    record_id: String,
    tenant_id: String,
    order_id: String,
    product_name: String,
    quantity: f64,
    unit_price: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SurrealEntity for OrderItem {
    type Row = OrderItemRow;

    fn from_row(row: OrderItemRow) -> Result<Self, DbError> {
        Ok(OrderItem {
            id: parse_record_id("order_item", &row.record_id)?,
            order_id: parse_ref("order_item", &row.record_id, "order_id", &row.order_id)?,
            tenant_id: row.tenant_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
