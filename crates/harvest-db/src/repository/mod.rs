//! SurrealDB implementation of the tenant-scoped repository.
//!
//! A single generic [`SurrealScopedRepository`] serves every entity type.
//! Each model module only supplies the row struct SurrealDB decodes into
//! and the conversion back to the domain model ([`SurrealEntity`]).
//!
//! Every statement built here starts its `WHERE` clause with
//! `tenant_id = $tenant_id`. Table and field names are compile-time
//! constants taken from [`ScopedEntity`]; all values are bound parameters.

mod customer;
mod daily_log;
mod document;
mod follow_up_task;
mod goal;
mod invoice;
mod meeting;
mod message_template;
mod order;
mod partnership;
mod performance_metric;
mod supplier;
mod transaction;

use std::marker::PhantomData;
use std::sync::Arc;

use harvest_core::error::{HarvestError, HarvestResult};
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
use harvest_core::repository::{
    Dependent, FieldValue, FieldWrite, FilterOp, PaginatedResult, Pagination, ScopedEntity,
    ScopedRepository, field_value,
};
use harvest_core::tenant::TenantRegistry;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;
use crate::retry::with_retry;

pub type CustomerRepository<C> = SurrealScopedRepository<C, Customer>;
pub type SupplierRepository<C> = SurrealScopedRepository<C, Supplier>;
pub type SupplierPaymentRepository<C> = SurrealScopedRepository<C, SupplierPayment>;
pub type OrderRepository<C> = SurrealScopedRepository<C, Order>;
pub type OrderItemRepository<C> = SurrealScopedRepository<C, OrderItem>;
pub type InvoiceRepository<C> = SurrealScopedRepository<C, Invoice>;
pub type TransactionRepository<C> = SurrealScopedRepository<C, Transaction>;
pub type DailyLogRepository<C> = SurrealScopedRepository<C, DailyLog>;
pub type GoalRepository<C> = SurrealScopedRepository<C, Goal>;
pub type MessageTemplateRepository<C> = SurrealScopedRepository<C, MessageTemplate>;
pub type MeetingRepository<C> = SurrealScopedRepository<C, Meeting>;
pub type FollowUpTaskRepository<C> = SurrealScopedRepository<C, FollowUpTask>;
pub type DocumentRepository<C> = SurrealScopedRepository<C, Document>;
pub type PerformanceMetricRepository<C> = SurrealScopedRepository<C, PerformanceMetric>;
pub type PartnershipRepository<C> = SurrealScopedRepository<C, Partnership>;

/// Storage mapping for a [`ScopedEntity`].
///
/// `Row` is selected with `meta::id(id) AS record_id, *` and must carry
/// a `record_id: String` field.
pub trait SurrealEntity: ScopedEntity {
    type Row: SurrealValue + Send;

    fn from_row(row: Self::Row) -> Result<Self, DbError>;
}

/// Row struct for id-only lookups.
#[derive(Debug, SurrealValue)]
struct IdRow {
    record_id: String,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Bind a [`FieldValue`] under `$name`, keeping its storage type.
macro_rules! bind_field {
    ($query:expr, $name:expr, $value:expr) => {
        match $value {
            FieldValue::Text(v) => $query.bind(($name, v)),
            FieldValue::Bool(v) => $query.bind(($name, v)),
            FieldValue::OptText(v) => $query.bind(($name, v)),
            FieldValue::TextList(v) => $query.bind(($name, v)),
            FieldValue::Int(v) => $query.bind(($name, v)),
            FieldValue::OptInt(v) => $query.bind(($name, v)),
            FieldValue::Float(v) => $query.bind(($name, v)),
            FieldValue::OptFloat(v) => $query.bind(($name, v)),
            FieldValue::Timestamp(v) => $query.bind(($name, v)),
            FieldValue::OptTimestamp(v) => $query.bind(($name, v)),
            FieldValue::Ref(v) => $query.bind(($name, v.to_string())),
            FieldValue::Json(v) => $query.bind(($name, v)),
        }
    };
}

/// Parse a stored record key back into the entity id.
pub(crate) fn parse_record_id(entity: &'static str, record_id: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(record_id)
        .map_err(|e| DbError::invalid_record(entity, record_id, format!("invalid UUID: {e}")))
}

/// Parse a stored reference field.
pub(crate) fn parse_ref(
    entity: &'static str,
    record_id: &str,
    field: &str,
    value: &str,
) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| {
        DbError::invalid_record(entity, record_id, format!("{field} is not a UUID: {e}"))
    })
}

fn op_sql(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Eq => "=",
        FilterOp::Contains => "CONTAINS",
        FilterOp::Gte => ">=",
        FilterOp::Lte => "<=",
    }
}

/// Delete statements for every transitive dependent, deepest first.
///
/// `selector` is the condition matching the parent ids, either `= $id`
/// for direct dependents or an `IN (...)` sub-select further down.
fn cascade_statements(dependents: &[Dependent], selector: &str, out: &mut Vec<String>) {
    for dependent in dependents {
        let condition = format!(
            "tenant_id = $tenant_id AND {} {selector}",
            dependent.field
        );
        if !dependent.dependents.is_empty() {
            let nested = format!(
                "IN (SELECT VALUE meta::id(id) FROM {} WHERE {condition})",
                dependent.kind
            );
            cascade_statements(dependent.dependents, &nested, out);
        }
        out.push(format!(
            "DELETE {} WHERE {condition} RETURN NONE;",
            dependent.kind
        ));
    }
}

/// Tenant-enforcing SurrealDB repository for entity type `E`.
pub struct SurrealScopedRepository<C: Connection, E> {
    db: Surreal<C>,
    registry: Arc<TenantRegistry>,
    _entity: PhantomData<fn() -> E>,
}

impl<C: Connection, E> Clone for SurrealScopedRepository<C, E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            registry: Arc::clone(&self.registry),
            _entity: PhantomData,
        }
    }
}

impl<C: Connection, E: SurrealEntity> SurrealScopedRepository<C, E> {
    pub fn new(db: Surreal<C>, registry: Arc<TenantRegistry>) -> Self {
        Self {
            db,
            registry,
            _entity: PhantomData,
        }
    }

    pub fn registry(&self) -> &TenantRegistry {
        &self.registry
    }

    /// Id of another record of the tenant holding the same identifying
    /// value, if any.
    async fn unique_conflict(
        &self,
        tenant_id: &str,
        fields: &[FieldWrite],
        exclude: Option<Uuid>,
    ) -> Result<Option<Uuid>, DbError> {
        let Some(field) = E::UNIQUE_FIELD else {
            return Ok(None);
        };
        let Some(value) = field_value(fields, field) else {
            return Ok(None);
        };

        let exclusion = if exclude.is_some() {
            " AND meta::id(id) != $id"
        } else {
            ""
        };
        let sql = format!(
            "SELECT meta::id(id) AS record_id FROM {} \
             WHERE tenant_id = $tenant_id AND {field} = $unique_value{exclusion} \
             LIMIT 1",
            E::KIND
        );
        let exclude = exclude.map(|id| id.to_string()).unwrap_or_default();

        let db = &self.db;
        let sql = sql.as_str();
        let rows: Vec<IdRow> = with_retry("unique_conflict", move || {
            let exclude = exclude.clone();
            async move {
                let query = db
                    .query(sql)
                    .bind(("tenant_id", tenant_id.to_string()))
                    .bind(("id", exclude));
                let query = bind_field!(query, "unique_value", value.clone());
                let mut result = query.await?.check()?;
                let rows: Vec<IdRow> = result.take(0)?;
                Ok::<_, DbError>(rows)
            }
        })
        .await?;

        rows.into_iter()
            .next()
            .map(|row| parse_record_id(E::KIND, &row.record_id))
            .transpose()
    }

    /// Every reference in `fields` must name a record of the same tenant.
    async fn resolve_references(&self, tenant_id: &str, fields: &[FieldWrite]) -> HarvestResult<()> {
        for reference in E::REFERENCES {
            let Some(FieldValue::Ref(target)) = field_value(fields, reference.field) else {
                continue;
            };
            let target = *target;
            let sql = format!(
                "SELECT meta::id(id) AS record_id FROM type::record('{}', $target) \
                 WHERE tenant_id = $tenant_id",
                reference.kind
            );

            let db = &self.db;
            let sql = sql.as_str();
            let rows: Vec<IdRow> = with_retry("resolve_reference", move || async move {
                let mut result = db
                    .query(sql)
                    .bind(("target", target.to_string()))
                    .bind(("tenant_id", tenant_id.to_string()))
                    .await?
                    .check()?;
                let rows: Vec<IdRow> = result.take(0)?;
                Ok::<_, DbError>(rows)
            })
            .await?;

            if rows.is_empty() {
                return Err(HarvestError::ReferenceNotFound {
                    entity: reference.kind,
                    field: reference.field,
                    id: target,
                });
            }
        }
        Ok(())
    }

    async fn fetch(&self, tenant_id: &str, id: Uuid) -> Result<Option<E>, DbError> {
        let sql = format!(
            "SELECT meta::id(id) AS record_id, * FROM type::record('{}', $id) \
             WHERE tenant_id = $tenant_id",
            E::KIND
        );

        let db = &self.db;
        let sql = sql.as_str();
        let rows: Vec<E::Row> = with_retry("get", move || async move {
            let mut result = db
                .query(sql)
                .bind(("id", id.to_string()))
                .bind(("tenant_id", tenant_id.to_string()))
                .await?
                .check()?;
            let rows: Vec<E::Row> = result.take(0)?;
            Ok::<_, DbError>(rows)
        })
        .await?;

        rows.into_iter().next().map(E::from_row).transpose()
    }

    async fn insert(&self, tenant_id: &str, id: Uuid, fields: &[FieldWrite]) -> Result<E, DbError> {
        let assignments: String = fields
            .iter()
            .map(|f| format!("{0} = ${0}, ", f.name))
            .collect();
        let sql = format!(
            "CREATE type::record('{kind}', $id) SET tenant_id = $tenant_id, {assignments}\
             created_at = time::now(), updated_at = time::now() RETURN NONE; \
             SELECT meta::id(id) AS record_id, * FROM type::record('{kind}', $id);",
            kind = E::KIND
        );

        let db = &self.db;
        let sql = sql.as_str();
        let rows: Vec<E::Row> = with_retry("create", move || async move {
            let mut query = db
                .query(sql)
                .bind(("id", id.to_string()))
                .bind(("tenant_id", tenant_id.to_string()));
            for field in fields {
                query = bind_field!(query, field.name, field.value.clone());
            }
            let mut result = query.await?.check()?;
            let rows: Vec<E::Row> = result.take(1)?;
            Ok::<_, DbError>(rows)
        })
        .await?;

        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: E::KIND.into(),
            id: id.to_string(),
        })?;
        E::from_row(row)
    }

    async fn apply_update(
        &self,
        tenant_id: &str,
        id: Uuid,
        fields: &[FieldWrite],
    ) -> Result<Option<E>, DbError> {
        let assignments: String = fields
            .iter()
            .map(|f| format!("{0} = ${0}, ", f.name))
            .collect();
        let sql = format!(
            "UPDATE type::record('{kind}', $id) SET {assignments}updated_at = time::now() \
             WHERE tenant_id = $tenant_id RETURN NONE; \
             SELECT meta::id(id) AS record_id, * FROM type::record('{kind}', $id) \
             WHERE tenant_id = $tenant_id;",
            kind = E::KIND
        );

        let db = &self.db;
        let sql = sql.as_str();
        let rows: Vec<E::Row> = with_retry("update", move || async move {
            let mut query = db
                .query(sql)
                .bind(("id", id.to_string()))
                .bind(("tenant_id", tenant_id.to_string()));
            for field in fields {
                query = bind_field!(query, field.name, field.value.clone());
            }
            let mut result = query.await?.check()?;
            let rows: Vec<E::Row> = result.take(1)?;
            Ok::<_, DbError>(rows)
        })
        .await?;

        rows.into_iter().next().map(E::from_row).transpose()
    }

    async fn count_dependents(
        &self,
        tenant_id: &str,
        id: Uuid,
        dependent: &Dependent,
    ) -> Result<u64, DbError> {
        let sql = format!(
            "SELECT count() AS total FROM {} \
             WHERE tenant_id = $tenant_id AND {} = $id GROUP ALL",
            dependent.kind, dependent.field
        );

        let db = &self.db;
        let sql = sql.as_str();
        let rows: Vec<CountRow> = with_retry("count_dependents", move || async move {
            let mut result = db
                .query(sql)
                .bind(("tenant_id", tenant_id.to_string()))
                .bind(("id", id.to_string()))
                .await?
                .check()?;
            let rows: Vec<CountRow> = result.take(0)?;
            Ok::<_, DbError>(rows)
        })
        .await?;

        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn run_delete(&self, tenant_id: &str, id: Uuid, sql: &str) -> Result<(), DbError> {
        let db = &self.db;
        with_retry("delete", move || async move {
            db.query(sql)
                .bind(("tenant_id", tenant_id.to_string()))
                .bind(("id", id.to_string()))
                .await?
                .check()?;
            Ok::<_, DbError>(())
        })
        .await
    }

    fn not_found(id: Uuid) -> HarvestError {
        HarvestError::NotFound {
            entity: E::KIND.into(),
            id: id.to_string(),
        }
    }

    fn duplicate(existing_id: Uuid) -> HarvestError {
        HarvestError::DuplicateEntity {
            entity: E::KIND,
            existing_id,
        }
    }
}

impl<C: Connection, E: SurrealEntity> ScopedRepository<E> for SurrealScopedRepository<C, E> {
    async fn create(&self, tenant_id: &str, input: E::Create) -> HarvestResult<E> {
        self.registry.ensure_valid(tenant_id)?;
        E::validate_create(&input)?;
        let fields = E::create_fields(input);

        if let Some(existing_id) = self.unique_conflict(tenant_id, &fields, None).await? {
            return Err(Self::duplicate(existing_id));
        }
        self.resolve_references(tenant_id, &fields).await?;

        let id = Uuid::now_v7();
        match self.insert(tenant_id, id, &fields).await {
            Ok(entity) => {
                debug!(entity = E::KIND, tenant_id, %id, "Created record");
                Ok(entity)
            }
            Err(err) => {
                // A concurrent create may have won the unique index.
                if let Some(existing_id) = self.unique_conflict(tenant_id, &fields, None).await? {
                    return Err(Self::duplicate(existing_id));
                }
                Err(err.into())
            }
        }
    }

    async fn get(&self, tenant_id: &str, id: Uuid) -> HarvestResult<E> {
        self.registry.ensure_valid(tenant_id)?;
        self.fetch(tenant_id, id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn list(
        &self,
        tenant_id: &str,
        filter: E::Filter,
        pagination: Pagination,
    ) -> HarvestResult<PaginatedResult<E>> {
        self.registry.ensure_valid(tenant_id)?;
        let predicates = E::filter_predicates(filter);

        let conditions: String = predicates
            .iter()
            .map(|p| format!(" AND {} {} ${}", p.field, op_sql(p.op), p.param))
            .collect();
        let sql = format!(
            "SELECT count() AS total FROM {kind} \
             WHERE tenant_id = $tenant_id{conditions} GROUP ALL; \
             SELECT meta::id(id) AS record_id, * FROM {kind} \
             WHERE tenant_id = $tenant_id{conditions} \
             ORDER BY id ASC \
             LIMIT $limit START $offset;",
            kind = E::KIND
        );

        let db = &self.db;
        let sql = sql.as_str();
        let predicates = predicates.as_slice();
        let (limit, offset) = (pagination.limit, pagination.offset);
        let (counts, rows): (Vec<CountRow>, Vec<E::Row>) =
            with_retry("list", move || async move {
                let mut query = db
                    .query(sql)
                    .bind(("tenant_id", tenant_id.to_string()))
                    .bind(("limit", limit))
                    .bind(("offset", offset));
                for predicate in predicates {
                    query = bind_field!(query, predicate.param, predicate.value.clone());
                }
                let mut result = query.await?.check()?;
                let counts: Vec<CountRow> = result.take(0)?;
                let rows: Vec<E::Row> = result.take(1)?;
                Ok::<_, DbError>((counts, rows))
            })
            .await?;

        let items = rows
            .into_iter()
            .map(E::from_row)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: counts.first().map(|r| r.total).unwrap_or(0),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn update(&self, tenant_id: &str, id: Uuid, changes: E::Update) -> HarvestResult<E> {
        self.registry.ensure_valid(tenant_id)?;
        E::validate_update(&changes)?;
        let Some(current) = self.fetch(tenant_id, id).await? else {
            return Err(Self::not_found(id));
        };
        current.validate_update_of(&changes)?;

        let fields = E::update_fields(changes);
        if let Some(existing_id) = self.unique_conflict(tenant_id, &fields, Some(id)).await? {
            return Err(Self::duplicate(existing_id));
        }

        match self.apply_update(tenant_id, id, &fields).await {
            Ok(Some(entity)) => {
                debug!(entity = E::KIND, tenant_id, %id, "Updated record");
                Ok(entity)
            }
            Ok(None) => Err(Self::not_found(id)),
            Err(err) => {
                if let Some(existing_id) = self.unique_conflict(tenant_id, &fields, Some(id)).await?
                {
                    return Err(Self::duplicate(existing_id));
                }
                Err(err.into())
            }
        }
    }

    async fn delete(&self, tenant_id: &str, id: Uuid) -> HarvestResult<()> {
        self.registry.ensure_valid(tenant_id)?;
        if self.fetch(tenant_id, id).await?.is_none() {
            return Err(Self::not_found(id));
        }

        for dependent in E::DEPENDENTS {
            if self.count_dependents(tenant_id, id, dependent).await? > 0 {
                return Err(HarvestError::HasDependents {
                    entity: E::KIND,
                    id,
                    dependent: dependent.kind,
                });
            }
        }

        let sql = format!(
            "DELETE type::record('{}', $id) WHERE tenant_id = $tenant_id RETURN NONE;",
            E::KIND
        );
        self.run_delete(tenant_id, id, &sql).await?;
        debug!(entity = E::KIND, tenant_id, %id, "Deleted record");
        Ok(())
    }

    async fn delete_cascade(&self, tenant_id: &str, id: Uuid) -> HarvestResult<()> {
        self.registry.ensure_valid(tenant_id)?;
        if self.fetch(tenant_id, id).await?.is_none() {
            return Err(Self::not_found(id));
        }

        let mut statements = vec!["BEGIN TRANSACTION;".to_string()];
        cascade_statements(E::DEPENDENTS, "= $id", &mut statements);
        statements.push(format!(
            "DELETE type::record('{}', $id) WHERE tenant_id = $tenant_id RETURN NONE;",
            E::KIND
        ));
        statements.push("COMMIT TRANSACTION;".into());

        self.run_delete(tenant_id, id, &statements.join("\n")).await?;
        debug!(entity = E::KIND, tenant_id, %id, "Deleted record with dependents");
        Ok(())
    }
}
