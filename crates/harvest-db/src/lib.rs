//! Harvest Database: SurrealDB storage for tenant-scoped business records.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Versioned migrations, including the tenant backfill ([`run_migrations`])
//! - The tenant-scoped repository ([`repository::SurrealScopedRepository`])
//! - A read-only tenancy audit ([`audit_tenancy`])

mod audit;
mod backfill;
mod connection;
mod error;
pub mod repository;
mod retry;
mod scan;
mod schema;

pub use audit::{AuditViolation, TableAudit, TenancyAudit, audit_snapshot, audit_tenancy};
pub use backfill::{
    BackfillPlan, TablePlan, apply_statements, plan_backfill, rebuild_statements,
};
pub use connection::{DbConfig, DbManager};
pub use error::{BackfillProblem, DbError};
pub use scan::{StoredRecord, TENANT_TABLES, TableSnapshot, TableSpec, load_snapshot};
pub use schema::{
    MigrationInfo, MigrationOptions, MigrationReport, MigrationStatus, TableBackfill,
    migration_status, run_migrations, run_migrations_with, schema_v1,
};
