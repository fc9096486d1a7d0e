//! Repository trait definitions for data access abstraction.
//!
//! Every business entity is tenant-scoped. Instead of one hand-written
//! repository trait per entity, each model describes itself through
//! [`ScopedEntity`] (table, identifying field, references, dependents and
//! how its inputs map onto stored fields) and a single generic
//! [`ScopedRepository`] provides the tenant-enforcing operations for all of
//! them. All operations are async and take the tenant explicitly.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::HarvestResult;

/// Name of the tenant key on every stored entity.
pub const TENANT_FIELD: &str = "tenant_id";

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Field descriptions
// ---------------------------------------------------------------------------

/// A typed value written to, or compared against, a stored field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    /// `None` clears the field.
    OptText(Option<String>),
    TextList(Vec<String>),
    Int(i64),
    OptInt(Option<i64>),
    Float(f64),
    OptFloat(Option<f64>),
    Timestamp(DateTime<Utc>),
    OptTimestamp(Option<DateTime<Utc>>),
    /// Reference to another entity, stored as its UUID string.
    Ref(Uuid),
    Json(serde_json::Value),
}

/// Assignment of a value to a named field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldWrite {
    pub name: &'static str,
    pub value: FieldValue,
}

impl FieldWrite {
    pub fn new(name: &'static str, value: FieldValue) -> Self {
        Self { name, value }
    }
}

/// Comparison operator used by list filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    /// Array field contains the value.
    Contains,
    Gte,
    Lte,
}

/// One list-filter predicate. `param` names the query parameter so that
/// two predicates on the same field (a date range) do not collide.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: &'static str,
    pub param: &'static str,
    pub op: FilterOp,
    pub value: FieldValue,
}

impl Predicate {
    pub fn eq(field: &'static str, value: FieldValue) -> Self {
        Self {
            field,
            param: field,
            op: FilterOp::Eq,
            value,
        }
    }

    pub fn contains(field: &'static str, value: FieldValue) -> Self {
        Self {
            field,
            param: field,
            op: FilterOp::Contains,
            value,
        }
    }

    pub fn gte(field: &'static str, param: &'static str, value: FieldValue) -> Self {
        Self {
            field,
            param,
            op: FilterOp::Gte,
            value,
        }
    }

    pub fn lte(field: &'static str, param: &'static str, value: FieldValue) -> Self {
        Self {
            field,
            param,
            op: FilterOp::Lte,
            value,
        }
    }
}

/// A foreign reference held in `field`, pointing at an entity stored in
/// table `kind`. Referenced entities must belong to the same tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub field: &'static str,
    pub kind: &'static str,
}

/// Records of table `kind` that reference the owning entity through
/// `field`, with their own dependents for transitive cascades.
#[derive(Debug, Clone, Copy)]
pub struct Dependent {
    pub kind: &'static str,
    pub field: &'static str,
    pub dependents: &'static [Dependent],
}

// ---------------------------------------------------------------------------
// Entity description
// ---------------------------------------------------------------------------

/// A persisted, tenant-scoped business record.
pub trait ScopedEntity: Sized + Send + Sync + 'static {
    /// Storage table name; also used in error messages.
    const KIND: &'static str;
    /// Human-chosen identifying field, unique per tenant.
    const UNIQUE_FIELD: Option<&'static str> = None;
    /// Foreign references. The first one is the parent whose tenant a
    /// legacy record inherits during backfill.
    const REFERENCES: &'static [Reference] = &[];
    /// Entities that reference this one and block its plain deletion.
    const DEPENDENTS: &'static [Dependent] = &[];

    type Create: Send + Sync;
    type Update: Send + Sync;
    type Filter: Default + Send + Sync;

    fn id(&self) -> Uuid;
    fn tenant_id(&self) -> &str;

    fn validate_create(input: &Self::Create) -> HarvestResult<()>;
    fn validate_update(input: &Self::Update) -> HarvestResult<()>;
    /// Checks of `input` against the stored record, for rules that span a
    /// changed field and one the update leaves alone.
    fn validate_update_of(&self, _input: &Self::Update) -> HarvestResult<()> {
        Ok(())
    }

    /// Stored fields for a new record. Never includes the tenant key.
    fn create_fields(input: Self::Create) -> Vec<FieldWrite>;
    /// Fields changed by an update. Never includes the tenant key.
    fn update_fields(input: Self::Update) -> Vec<FieldWrite>;
    fn filter_predicates(filter: Self::Filter) -> Vec<Predicate>;
}

/// Tenant-enforcing data access for one entity type.
///
/// An entity owned by another tenant is reported exactly like a missing
/// one, so callers can never learn about records outside their tenant.
pub trait ScopedRepository<E: ScopedEntity>: Send + Sync {
    fn create(
        &self,
        tenant_id: &str,
        input: E::Create,
    ) -> impl Future<Output = HarvestResult<E>> + Send;

    fn get(&self, tenant_id: &str, id: Uuid) -> impl Future<Output = HarvestResult<E>> + Send;

    /// Records of the tenant matching `filter`, in insertion order.
    fn list(
        &self,
        tenant_id: &str,
        filter: E::Filter,
        pagination: Pagination,
    ) -> impl Future<Output = HarvestResult<PaginatedResult<E>>> + Send;

    /// Apply `changes`. The tenant of a record never changes.
    fn update(
        &self,
        tenant_id: &str,
        id: Uuid,
        changes: E::Update,
    ) -> impl Future<Output = HarvestResult<E>> + Send;

    /// Delete a record that no other record of the tenant depends on.
    fn delete(&self, tenant_id: &str, id: Uuid) -> impl Future<Output = HarvestResult<()>> + Send;

    /// Delete a record together with all of its dependents, atomically.
    fn delete_cascade(
        &self,
        tenant_id: &str,
        id: Uuid,
    ) -> impl Future<Output = HarvestResult<()>> + Send;
}

/// Look up the value a field write assigns to `name`.
pub fn field_value<'a>(fields: &'a [FieldWrite], name: &str) -> Option<&'a FieldValue> {
    fields.iter().find(|f| f.name == name).map(|f| &f.value)
}
