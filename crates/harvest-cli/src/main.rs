//! `harvest`: schema migrations and tenancy checks for the business-records
//! store.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use harvest_core::tenant::TenantRegistry;
use harvest_db::{
    DbError, DbManager, MigrationOptions, MigrationReport, TenancyAudit, audit_tenancy,
    migration_status, run_migrations_with,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, HarvestConfig};

#[derive(Parser)]
#[command(name = "harvest", version, about = "Multi-tenant business records store")]
struct Cli {
    /// TOML configuration file (defaults to ./harvest.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// SurrealDB endpoint, overriding the configuration file
    #[arg(long, global = true, env = "HARVEST_DB_URL", value_name = "URL")]
    db_url: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending schema migrations, backfilling tenants on legacy records
    Migrate {
        /// Tenant assigned to legacy records without a parent
        #[arg(long, value_name = "ID")]
        default_tenant: Option<String>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the schema version and pending migrations
    Status,
    /// Audit every record's tenant and references
    Verify,
    /// List registered tenants
    Tenants,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Tenancy audit found {0} violation(s)")]
    AuditFailed(usize),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "harvest failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("harvest=info,warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = HarvestConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.db_url {
        config.database.url = url;
    }
    let registry = config.tenant_registry()?;

    match cli.command {
        Command::Tenants => {
            print_tenants(&registry);
            Ok(())
        }
        Command::Migrate {
            default_tenant,
            dry_run,
        } => {
            let manager = DbManager::connect(&config.database).await?;
            let options = MigrationOptions {
                default_tenant,
                dry_run,
                target_version: None,
            };
            let report = run_migrations_with(manager.client(), &registry, &options).await?;
            print_report(&report);
            Ok(())
        }
        Command::Status => {
            let manager = DbManager::connect(&config.database).await?;
            let status = migration_status(manager.client()).await?;
            println!(
                "schema version {} of {}",
                status.current_version, status.latest_version
            );
            if status.pending.is_empty() {
                println!("up to date");
            }
            for migration in &status.pending {
                println!("pending  v{} {}", migration.version, migration.name);
            }
            Ok(())
        }
        Command::Verify => {
            let manager = DbManager::connect(&config.database).await?;
            let audit = audit_tenancy(manager.client(), &registry).await?;
            print_audit(&audit);
            if audit.is_clean() {
                Ok(())
            } else {
                Err(CliError::AuditFailed(audit.violations.len()))
            }
        }
    }
}

fn print_tenants(registry: &TenantRegistry) {
    for tenant in registry.list_tenants() {
        let marker = if tenant.id == registry.default_tenant() {
            " (default)"
        } else {
            ""
        };
        println!("{:<20} {}{marker}", tenant.id, tenant.display_name);
        if !tenant.tagline.is_empty() {
            println!("{:<20} {}", "", tenant.tagline);
        }
    }
}

fn print_report(report: &MigrationReport) {
    let verb = if report.dry_run { "would apply" } else { "applied" };
    if report.applied.is_empty() {
        println!("no pending migrations");
    }
    for migration in &report.applied {
        println!("{verb} v{} {}", migration.version, migration.name);
    }
    for table in report.backfill.iter().filter(|t| t.assigned > 0) {
        let per_tenant: Vec<String> = table
            .per_tenant
            .iter()
            .map(|(tenant, count)| format!("{tenant}={count}"))
            .collect();
        println!(
            "  {:<22} {:>6} assigned ({})",
            table.table,
            table.assigned,
            per_tenant.join(", ")
        );
    }
    if !report.backfill.is_empty() {
        let outcome = if report.dry_run { "would be updated" } else { "updated" };
        println!("{} record(s) {outcome}", report.records_updated());
    }
}

fn print_audit(audit: &TenancyAudit) {
    for table in &audit.tables {
        let per_tenant: Vec<String> = table
            .per_tenant
            .iter()
            .map(|(tenant, count)| format!("{tenant}={count}"))
            .collect();
        println!(
            "{:<22} {:>6} total  {:>4} untenanted  [{}]",
            table.table,
            table.total,
            table.untenanted,
            per_tenant.join(", ")
        );
    }
    for violation in &audit.violations {
        println!("violation: {violation}");
    }
}
