//! Tenant snapshot of every business table.
//!
//! The backfill planner and the tenancy audit both work on the same
//! read-only picture of the store: for each record its key, its stored
//! tenant (if any) and the targets of its references.

use std::collections::HashMap;

use harvest_core::models::customer::Customer;
use harvest_core::models::daily_log::DailyLog;
use harvest_core::models::document::Document;
use harvest_core::models::follow_up_task::FollowUpTask;
use harvest_core::models::goal::Goal;
use harvest_core::models::invoice::Invoice;
use harvest_core::models::meeting::Meeting;
use harvest_core::models::message_template::MessageTemplate;
use harvest_core::models::order::{Order, OrderItem};
use harvest_core::models::partnership::Partnership;
use harvest_core::models::performance_metric::PerformanceMetric;
use harvest_core::models::supplier::{Supplier, SupplierPayment};
use harvest_core::models::transaction::Transaction;
use harvest_core::repository::{Reference, ScopedEntity};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

/// Storage layout of one tenant-scoped table.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub table: &'static str,
    pub unique_field: Option<&'static str>,
    /// The first reference is the parent a legacy record inherits its
    /// tenant from.
    pub references: &'static [Reference],
}

impl TableSpec {
    pub const fn of<E: ScopedEntity>() -> Self {
        Self {
            table: E::KIND,
            unique_field: E::UNIQUE_FIELD,
            references: E::REFERENCES,
        }
    }
}

/// Every tenant-scoped table, parents before children.
pub static TENANT_TABLES: [TableSpec; 15] = [
    TableSpec::of::<Customer>(),
    TableSpec::of::<Supplier>(),
    TableSpec::of::<MessageTemplate>(),
    TableSpec::of::<Meeting>(),
    TableSpec::of::<FollowUpTask>(),
    TableSpec::of::<Document>(),
    TableSpec::of::<Goal>(),
    TableSpec::of::<PerformanceMetric>(),
    TableSpec::of::<Partnership>(),
    TableSpec::of::<DailyLog>(),
    TableSpec::of::<Transaction>(),
    TableSpec::of::<Order>(),
    TableSpec::of::<OrderItem>(),
    TableSpec::of::<Invoice>(),
    TableSpec::of::<SupplierPayment>(),
];

/// One stored record as seen by the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: String,
    /// `None` for records written before tenant scoping. Empty strings
    /// are read as `None`.
    pub tenant_id: Option<String>,
    /// Reference targets, aligned with [`TableSpec::references`].
    pub references: Vec<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct TableSnapshot {
    pub spec: TableSpec,
    pub records: Vec<StoredRecord>,
}

#[derive(Debug, SurrealValue)]
struct TenantRow {
    record_id: String,
    tenant_id: Option<String>,
}

#[derive(Debug, SurrealValue)]
struct ReferenceRow {
    record_id: String,
    target: Option<String>,
}

/// Read every record of every table in [`TENANT_TABLES`].
pub async fn load_snapshot<C: Connection>(db: &Surreal<C>) -> Result<Vec<TableSnapshot>, DbError> {
    let mut snapshot = Vec::with_capacity(TENANT_TABLES.len());
    for spec in &TENANT_TABLES {
        snapshot.push(load_table(db, *spec).await?);
    }
    Ok(snapshot)
}

async fn load_table<C: Connection>(db: &Surreal<C>, spec: TableSpec) -> Result<TableSnapshot, DbError> {
    // Keys are cast so that non-UUID legacy keys still decode and can be
    // reported.
    let sql = format!(
        "SELECT <string> meta::id(id) AS record_id, tenant_id FROM {}",
        spec.table
    );
    let mut result = db.query(sql.as_str()).await?.check()?;
    let rows: Vec<TenantRow> = result.take(0)?;

    let mut targets: Vec<HashMap<String, String>> = Vec::with_capacity(spec.references.len());
    for reference in spec.references {
        let sql = format!(
            "SELECT <string> meta::id(id) AS record_id, {} AS target FROM {}",
            reference.field, spec.table
        );
        let mut result = db.query(sql.as_str()).await?.check()?;
        let refs: Vec<ReferenceRow> = result.take(0)?;
        targets.push(
            refs.into_iter()
                .filter_map(|r| r.target.map(|t| (r.record_id, t)))
                .collect(),
        );
    }

    let mut records: Vec<StoredRecord> = rows
        .into_iter()
        .map(|row| StoredRecord {
            references: targets.iter().map(|m| m.get(&row.record_id).cloned()).collect(),
            tenant_id: row.tenant_id.filter(|t| !t.is_empty()),
            id: row.record_id,
        })
        .collect();
    // UUIDv7 keys sort in insertion order.
    records.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(TableSnapshot { spec, records })
}
