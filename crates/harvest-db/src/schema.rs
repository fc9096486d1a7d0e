//! Schema definitions and migration runner for SurrealDB.
//!
//! Business tables are SCHEMAFULL. UUIDs, references and enums are stored
//! as strings, enums with ASSERT constraints. Migrations are recorded in
//! `_migration` and applied at most once, in version order.

use std::collections::BTreeMap;

use harvest_core::tenant::TenantRegistry;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{info, warn};

use crate::backfill::{BackfillPlan, apply_statements, plan_backfill, rebuild_statements};
use crate::error::DbError;
use crate::scan::{TENANT_TABLES, TableSnapshot, load_snapshot};

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

enum Step {
    Sql(&'static str),
    /// Assign tenants to legacy records and switch to per-tenant
    /// uniqueness.
    TenantScoping,
}

struct Migration {
    version: u32,
    name: &'static str,
    step: Step,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        step: Step::Sql(SCHEMA_V1),
    },
    Migration {
        version: 2,
        name: "tenant_scoping",
        step: Step::TenantScoping,
    },
];

// -----------------------------------------------------------------------
// Schema v1: single-business tables
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Customers (hotels and restaurants)
-- =======================================================================
DEFINE TABLE customer SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE customer TYPE option<string>;
DEFINE FIELD name ON TABLE customer TYPE string;
DEFINE FIELD contact_person ON TABLE customer TYPE option<string>;
DEFINE FIELD phone ON TABLE customer TYPE option<string>;
DEFINE FIELD email ON TABLE customer TYPE option<string>;
DEFINE FIELD address ON TABLE customer TYPE option<string>;
DEFINE FIELD preferences ON TABLE customer TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD satisfaction_score ON TABLE customer TYPE option<int>;
DEFINE FIELD feedback ON TABLE customer TYPE option<string>;
DEFINE FIELD created_at ON TABLE customer TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE customer TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_customer_name ON TABLE customer COLUMNS name UNIQUE;

-- =======================================================================
-- Suppliers (farmers) and their payments
-- =======================================================================
DEFINE TABLE supplier SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE supplier TYPE option<string>;
DEFINE FIELD name ON TABLE supplier TYPE string;
DEFINE FIELD contact_person ON TABLE supplier TYPE option<string>;
DEFINE FIELD phone ON TABLE supplier TYPE option<string>;
DEFINE FIELD email ON TABLE supplier TYPE option<string>;
DEFINE FIELD address ON TABLE supplier TYPE option<string>;
DEFINE FIELD product_specialties ON TABLE supplier TYPE array<string> DEFAULT [];
DEFINE FIELD pickup_schedule ON TABLE supplier TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD performance_notes ON TABLE supplier TYPE option<string>;
DEFINE FIELD training_needs ON TABLE supplier TYPE option<string>;
DEFINE FIELD created_at ON TABLE supplier TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE supplier TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_supplier_name ON TABLE supplier COLUMNS name UNIQUE;

DEFINE TABLE supplier_payment SCHEMAFULL;
DEFINE FIELD supplier_id ON TABLE supplier_payment TYPE string;
DEFINE FIELD payment_date ON TABLE supplier_payment TYPE datetime;
DEFINE FIELD amount ON TABLE supplier_payment TYPE float;
DEFINE FIELD notes ON TABLE supplier_payment TYPE option<string>;
DEFINE FIELD created_at ON TABLE supplier_payment TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE supplier_payment TYPE datetime DEFAULT time::now();

-- =======================================================================
-- Orders, order lines and invoices
-- =======================================================================
DEFINE TABLE sales_order SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE sales_order TYPE option<string>;
DEFINE FIELD customer_id ON TABLE sales_order TYPE string;
DEFINE FIELD order_date ON TABLE sales_order TYPE datetime;
DEFINE FIELD delivery_date ON TABLE sales_order TYPE datetime;
DEFINE FIELD status ON TABLE sales_order TYPE string \
    ASSERT $value IN ['Pending', 'Confirmed', 'Delivered', 'Cancelled'];
DEFINE FIELD total_amount ON TABLE sales_order TYPE option<float>;
DEFINE FIELD notes ON TABLE sales_order TYPE option<string>;
DEFINE FIELD created_at ON TABLE sales_order TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE sales_order TYPE datetime DEFAULT time::now();

DEFINE TABLE order_item SCHEMAFULL;
DEFINE FIELD order_id ON TABLE order_item TYPE string;
DEFINE FIELD product_name ON TABLE order_item TYPE string;
DEFINE FIELD quantity ON TABLE order_item TYPE float;
DEFINE FIELD unit_price ON TABLE order_item TYPE float;
DEFINE FIELD created_at ON TABLE order_item TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE order_item TYPE datetime DEFAULT time::now();

DEFINE TABLE invoice SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE invoice TYPE option<string>;
DEFINE FIELD order_id ON TABLE invoice TYPE string;
DEFINE FIELD customer_id ON TABLE invoice TYPE string;
DEFINE FIELD invoice_date ON TABLE invoice TYPE datetime;
DEFINE FIELD due_date ON TABLE invoice TYPE datetime;
DEFINE FIELD total_amount ON TABLE invoice TYPE float;
DEFINE FIELD status ON TABLE invoice TYPE string \
    ASSERT $value IN ['Pending', 'Paid', 'Overdue', 'Cancelled'];
DEFINE FIELD created_at ON TABLE invoice TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE invoice TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_invoice_order_id ON TABLE invoice COLUMNS order_id UNIQUE;

-- =======================================================================
-- Financial transactions
-- =======================================================================
DEFINE TABLE financial_transaction SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE financial_transaction TYPE option<string>;
DEFINE FIELD date ON TABLE financial_transaction TYPE datetime;
DEFINE FIELD kind ON TABLE financial_transaction TYPE string \
    ASSERT $value IN ['Income', 'Expense'];
DEFINE FIELD description ON TABLE financial_transaction TYPE string;
DEFINE FIELD amount ON TABLE financial_transaction TYPE float;
DEFINE FIELD related_entity_id ON TABLE financial_transaction TYPE option<string>;
DEFINE FIELD related_entity_type ON TABLE financial_transaction TYPE option<string>;
DEFINE FIELD created_at ON TABLE financial_transaction TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE financial_transaction TYPE datetime DEFAULT time::now();

-- =======================================================================
-- Daily operations log (readings and issues are free-form lists)
-- =======================================================================
DEFINE TABLE daily_log SCHEMALESS;
DEFINE FIELD tenant_id ON TABLE daily_log TYPE option<string>;
DEFINE FIELD log_date ON TABLE daily_log TYPE string;
DEFINE FIELD orders_fulfilled ON TABLE daily_log TYPE int DEFAULT 0;
DEFINE FIELD quality_control_notes ON TABLE daily_log TYPE option<string>;
DEFINE FIELD delivery_route_notes ON TABLE daily_log TYPE option<string>;
DEFINE FIELD created_at ON TABLE daily_log TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE daily_log TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_daily_log_log_date ON TABLE daily_log COLUMNS log_date UNIQUE;

-- =======================================================================
-- Goals
-- =======================================================================
DEFINE TABLE goal SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE goal TYPE option<string>;
DEFINE FIELD name ON TABLE goal TYPE string;
DEFINE FIELD description ON TABLE goal TYPE option<string>;
DEFINE FIELD target_value ON TABLE goal TYPE float;
DEFINE FIELD current_value ON TABLE goal TYPE float DEFAULT 0.0;
DEFINE FIELD start_date ON TABLE goal TYPE datetime;
DEFINE FIELD end_date ON TABLE goal TYPE datetime;
DEFINE FIELD status ON TABLE goal TYPE string \
    ASSERT $value IN ['In Progress', 'Completed', 'On Hold', 'Cancelled'];
DEFINE FIELD created_at ON TABLE goal TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE goal TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_goal_name ON TABLE goal COLUMNS name UNIQUE;

-- =======================================================================
-- Message templates
-- =======================================================================
DEFINE TABLE message_template SCHEMAFULL;
DEFINE FIELD name ON TABLE message_template TYPE string;
DEFINE FIELD channel ON TABLE message_template TYPE string \
    ASSERT $value IN ['Email', 'WhatsApp', 'SMS'];
DEFINE FIELD subject ON TABLE message_template TYPE option<string>;
DEFINE FIELD body ON TABLE message_template TYPE string;
DEFINE FIELD created_at ON TABLE message_template TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE message_template TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_message_template_name ON TABLE message_template COLUMNS name UNIQUE;

-- =======================================================================
-- Meetings and follow-up tasks
-- =======================================================================
DEFINE TABLE meeting SCHEMAFULL;
DEFINE FIELD title ON TABLE meeting TYPE string;
DEFINE FIELD date_time ON TABLE meeting TYPE datetime;
DEFINE FIELD attendees ON TABLE meeting TYPE array<string> DEFAULT [];
DEFINE FIELD notes ON TABLE meeting TYPE option<string>;
DEFINE FIELD reminders_sent ON TABLE meeting TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE meeting TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE meeting TYPE datetime DEFAULT time::now();

DEFINE TABLE follow_up_task SCHEMAFULL;
DEFINE FIELD description ON TABLE follow_up_task TYPE string;
DEFINE FIELD due_date ON TABLE follow_up_task TYPE option<datetime>;
DEFINE FIELD status ON TABLE follow_up_task TYPE string \
    ASSERT $value IN ['Pending', 'In Progress', 'Completed', 'Cancelled'];
DEFINE FIELD assigned_to ON TABLE follow_up_task TYPE option<string>;
DEFINE FIELD related_entity_id ON TABLE follow_up_task TYPE option<string>;
DEFINE FIELD related_entity_type ON TABLE follow_up_task TYPE option<string>;
DEFINE FIELD created_at ON TABLE follow_up_task TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE follow_up_task TYPE datetime DEFAULT time::now();

-- =======================================================================
-- Documents
-- =======================================================================
DEFINE TABLE document SCHEMAFULL;
DEFINE FIELD name ON TABLE document TYPE string;
DEFINE FIELD file_path ON TABLE document TYPE string;
DEFINE FIELD kind ON TABLE document TYPE option<string>;
DEFINE FIELD version ON TABLE document TYPE option<string>;
DEFINE FIELD created_at ON TABLE document TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE document TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_document_file_path ON TABLE document COLUMNS file_path UNIQUE;

-- =======================================================================
-- Performance metrics and partnerships
-- =======================================================================
DEFINE TABLE performance_metric SCHEMAFULL;
DEFINE FIELD name ON TABLE performance_metric TYPE string;
DEFINE FIELD metric_value ON TABLE performance_metric TYPE float;
DEFINE FIELD date ON TABLE performance_metric TYPE datetime;
DEFINE FIELD notes ON TABLE performance_metric TYPE option<string>;
DEFINE FIELD created_at ON TABLE performance_metric TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE performance_metric TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_performance_metric_name ON TABLE performance_metric COLUMNS name UNIQUE;

DEFINE TABLE partnership SCHEMAFULL;
DEFINE FIELD name ON TABLE partnership TYPE string;
DEFINE FIELD kind ON TABLE partnership TYPE option<string>;
DEFINE FIELD contact_person ON TABLE partnership TYPE option<string>;
DEFINE FIELD status ON TABLE partnership TYPE string \
    ASSERT $value IN ['Prospect', 'Active', 'Inactive', 'Terminated'];
DEFINE FIELD notes ON TABLE partnership TYPE option<string>;
DEFINE FIELD created_at ON TABLE partnership TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE partnership TYPE datetime DEFAULT time::now();
";

// -----------------------------------------------------------------------
// Runner
// -----------------------------------------------------------------------

/// Options for [`run_migrations_with`].
#[derive(Debug, Clone, Default)]
pub struct MigrationOptions {
    /// Tenant for legacy root records. Defaults to the registry's
    /// default tenant.
    pub default_tenant: Option<String>,
    /// Plan and report without writing anything.
    pub dry_run: bool,
    /// Stop after this version. `None` applies every migration.
    pub target_version: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationInfo {
    pub version: u32,
    pub name: &'static str,
}

/// Per-table outcome of the tenant backfill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBackfill {
    pub table: &'static str,
    pub assigned: u64,
    pub already_tenanted: u64,
    /// Assigned records per tenant.
    pub per_tenant: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Migrations applied, or that would be applied in a dry run.
    pub applied: Vec<MigrationInfo>,
    pub backfill: Vec<TableBackfill>,
    pub dry_run: bool,
}

impl MigrationReport {
    pub fn records_updated(&self) -> u64 {
        self.backfill.iter().map(|t| t.assigned).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub current_version: u32,
    pub latest_version: u32,
    pub pending: Vec<MigrationInfo>,
}

/// Apply every pending migration. Legacy records receive the registry's
/// default tenant.
pub async fn run_migrations<C: Connection>(
    db: &Surreal<C>,
    registry: &TenantRegistry,
) -> Result<MigrationReport, DbError> {
    run_migrations_with(db, registry, &MigrationOptions::default()).await
}

pub async fn run_migrations_with<C: Connection>(
    db: &Surreal<C>,
    registry: &TenantRegistry,
    options: &MigrationOptions,
) -> Result<MigrationReport, DbError> {
    let default_tenant = options
        .default_tenant
        .as_deref()
        .unwrap_or_else(|| registry.default_tenant());
    if !registry.is_valid_tenant(default_tenant) {
        return Err(DbError::Migration(format!(
            "default tenant {default_tenant:?} is not an active registered tenant"
        )));
    }

    let current_version = current_version(db).await?;
    let mut report = MigrationReport {
        dry_run: options.dry_run,
        ..MigrationReport::default()
    };

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }
        if options.target_version.is_some_and(|target| migration.version > target) {
            break;
        }
        let info = MigrationInfo {
            version: migration.version,
            name: migration.name,
        };

        match migration.step {
            Step::Sql(sql) => {
                if !options.dry_run {
                    info!(
                        version = migration.version,
                        name = migration.name,
                        "Applying migration"
                    );
                    apply_sql(db, migration, sql).await?;
                }
            }
            Step::TenantScoping => {
                // Tables created by a pending v1 in this same dry run do
                // not exist yet and hold no records.
                let tables_exist = current_version >= 1 || !options.dry_run;
                let snapshot = if tables_exist {
                    load_snapshot(db).await?
                } else {
                    TENANT_TABLES
                        .iter()
                        .map(|spec| TableSnapshot {
                            spec: *spec,
                            records: Vec::new(),
                        })
                        .collect()
                };
                let plan = plan_backfill(&snapshot, registry, default_tenant);
                if !plan.is_applicable() {
                    warn!(
                        problems = plan.problems.len(),
                        "Tenant backfill blocked; nothing was written"
                    );
                    return Err(DbError::Backfill(plan.problems));
                }
                if !options.dry_run {
                    info!(
                        version = migration.version,
                        name = migration.name,
                        default_tenant,
                        "Applying migration"
                    );
                    apply_tenant_scoping(db, migration, &plan).await?;
                }
                report.backfill = summarize(&plan);
            }
        }

        if !options.dry_run {
            info!(version = migration.version, "Migration applied successfully");
        }
        report.applied.push(info);
    }

    Ok(report)
}

/// Current schema version and the migrations still pending.
pub async fn migration_status<C: Connection>(db: &Surreal<C>) -> Result<MigrationStatus, DbError> {
    let current_version = current_version(db).await?;
    Ok(MigrationStatus {
        current_version,
        latest_version: MIGRATIONS.last().map(|m| m.version).unwrap_or(0),
        pending: MIGRATIONS
            .iter()
            .filter(|m| m.version > current_version)
            .map(|m| MigrationInfo {
                version: m.version,
                name: m.name,
            })
            .collect(),
    })
}

async fn current_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map(|m| m.version).unwrap_or(0))
}

async fn apply_sql<C: Connection>(
    db: &Surreal<C>,
    migration: &Migration,
    sql: &'static str,
) -> Result<(), DbError> {
    db.query(sql).await?.check().map_err(|e| {
        DbError::Migration(format!(
            "Migration v{} '{}' failed: {}",
            migration.version, migration.name, e,
        ))
    })?;

    db.query("CREATE _migration SET version = $version, name = $name")
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "Failed to record migration v{}: {}",
                migration.version, e,
            ))
        })?;
    Ok(())
}

/// Backfill, constraint changes and the migration record commit together.
async fn apply_tenant_scoping<C: Connection>(
    db: &Surreal<C>,
    migration: &Migration,
    plan: &BackfillPlan,
) -> Result<(), DbError> {
    let mut statements = vec!["BEGIN TRANSACTION;".to_string()];
    statements.extend(apply_statements(&TENANT_TABLES));
    statements.push("CREATE _migration SET version = $version, name = $name RETURN NONE;".into());
    statements.push("COMMIT TRANSACTION;".into());

    db.query(statements.join("\n"))
        .bind(("plan", plan.to_json()))
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

    // Indexes defined in the transaction above do not cover the records it
    // updated.
    db.query(rebuild_statements(&TENANT_TABLES).join("\n"))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' committed but rebuilding tenant indexes failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

    for table in &plan.tables {
        info!(
            table = table.table,
            assigned = table.assigned(),
            already_tenanted = table.already_tenanted,
            "Tenant backfill"
        );
    }
    Ok(())
}

fn summarize(plan: &BackfillPlan) -> Vec<TableBackfill> {
    plan.tables
        .iter()
        .map(|t| TableBackfill {
            table: t.table,
            assigned: t.assigned(),
            already_tenanted: t.already_tenanted,
            per_tenant: t
                .assignments
                .iter()
                .map(|(tenant, ids)| (tenant.clone(), ids.len() as u64))
                .collect(),
        })
        .collect()
}

/// Returns the raw schema DDL for version 1, the single-business layout.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
