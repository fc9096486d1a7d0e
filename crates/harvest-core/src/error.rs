//! Error types for the Harvest system.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum HarvestError {
    /// The tenant is unknown to the registry (or inactive). Raised before
    /// any storage access; there is no fallback tenant.
    #[error("Invalid tenant: {tenant_id:?}")]
    InvalidTenant { tenant_id: String },

    /// A record with the same identifying value already exists in the
    /// tenant.
    #[error("Duplicate {entity}: existing record {existing_id}")]
    DuplicateEntity {
        entity: &'static str,
        existing_id: Uuid,
    },

    /// A foreign reference does not resolve within the caller's tenant.
    #[error("Referenced {entity} not found for {field} = {id}")]
    ReferenceNotFound {
        entity: &'static str,
        field: &'static str,
        id: Uuid,
    },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Cannot delete {entity} {id}: {dependent} records still reference it")]
    HasDependents {
        entity: &'static str,
        id: Uuid,
        dependent: &'static str,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Transient storage failure: {0}")]
    TransientStorageFailure(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl HarvestError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientStorageFailure(_))
    }
}

pub type HarvestResult<T> = Result<T, HarvestError>;
