//! Database-specific error types and conversions.

use std::fmt;

use harvest_core::error::HarvestError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(surrealdb::Error),

    /// A conflict or timeout that may succeed when retried.
    #[error("Transient SurrealDB error: {0}")]
    Transient(surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// The tenant backfill found records it cannot assign. Nothing was
    /// written.
    #[error("Tenant backfill blocked by {} record(s):\n{}", .0.len(), BackfillProblems(.0))]
    Backfill(Vec<BackfillProblem>),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// A stored record does not decode into its model.
    #[error("Invalid {entity} record {id}: {reason}")]
    InvalidRecord {
        entity: &'static str,
        id: String,
        reason: String,
    },
}

impl From<surrealdb::Error> for DbError {
    fn from(err: surrealdb::Error) -> Self {
        if is_transient_message(&err.to_string()) {
            DbError::Transient(err)
        } else {
            DbError::Surreal(err)
        }
    }
}

fn is_transient_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("can be retried")
        || message.contains("transaction conflict")
        || message.contains("write conflict")
        || message.contains("timed out")
}

impl DbError {
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::Transient(_))
    }

    pub(crate) fn invalid_record(entity: &'static str, id: &str, reason: impl fmt::Display) -> Self {
        DbError::InvalidRecord {
            entity,
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<DbError> for HarvestError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => HarvestError::NotFound { entity, id },
            DbError::Transient(e) => HarvestError::TransientStorageFailure(e.to_string()),
            err @ (DbError::Migration(_) | DbError::Backfill(_)) => {
                HarvestError::Migration(err.to_string())
            }
            other => HarvestError::Database(other.to_string()),
        }
    }
}

/// A legacy record the tenant backfill cannot assign a tenant to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackfillProblem {
    /// The record id is not a UUID.
    MalformedId { table: &'static str, record_id: String },
    /// The record carries a tenant the registry does not know.
    UnknownTenant {
        table: &'static str,
        record_id: String,
        tenant_id: String,
    },
    /// A reference points at a record that is missing or could not be
    /// assigned a tenant itself.
    MissingReference {
        table: &'static str,
        record_id: String,
        field: &'static str,
        target_table: &'static str,
        target_id: String,
    },
    /// The record's tenant differs from the tenant of a record it
    /// references.
    TenantMismatch {
        table: &'static str,
        record_id: String,
        tenant_id: String,
        field: &'static str,
        target_tenant: String,
    },
}

impl fmt::Display for BackfillProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedId { table, record_id } => {
                write!(f, "{table}:{record_id}: record id is not a UUID")
            }
            Self::UnknownTenant {
                table,
                record_id,
                tenant_id,
            } => write!(f, "{table}:{record_id}: unknown tenant {tenant_id:?}"),
            Self::MissingReference {
                table,
                record_id,
                field,
                target_table,
                target_id,
            } => write!(
                f,
                "{table}:{record_id}: {field} references {target_table}:{target_id}, \
                 which is missing or has no assignable tenant"
            ),
            Self::TenantMismatch {
                table,
                record_id,
                tenant_id,
                field,
                target_tenant,
            } => write!(
                f,
                "{table}:{record_id}: tenant {tenant_id:?} differs from tenant \
                 {target_tenant:?} of the record referenced by {field}"
            ),
        }
    }
}

struct BackfillProblems<'a>(&'a [BackfillProblem]);

impl fmt::Display for BackfillProblems<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, problem) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {problem}")?;
        }
        Ok(())
    }
}
