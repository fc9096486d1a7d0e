//! Integration tests for schema migrations using in-memory SurrealDB.

use std::sync::Arc;

use harvest_core::error::HarvestError;
use harvest_core::models::customer::CreateCustomer;
use harvest_core::repository::ScopedRepository;
use harvest_core::tenant::{BusinessProfile, TenantRegistry};
use harvest_db::repository::CustomerRepository;
use harvest_db::{MigrationOptions, migration_status, run_migrations, run_migrations_with};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use surrealdb_types::SurrealValue;

fn registry() -> TenantRegistry {
    let profile = |id: &str| BusinessProfile {
        id: id.into(),
        name: id.into(),
        display_name: id.into(),
        tagline: String::new(),
        description: String::new(),
        location: "Jamaica".into(),
        primary_color: "#0B3D23".into(),
        accent_color: "#C9A122".into(),
        business_type: "wholesale".into(),
        modules: Vec::new(),
        active: true,
    };
    TenantRegistry::new(
        vec![profile("jamaica-main"), profile("jamaica-north")],
        "jamaica-main".into(),
    )
    .unwrap()
}

async fn empty_db() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    db
}

#[derive(Debug, SurrealValue)]
struct VersionRow {
    version: u32,
}

#[tokio::test]
async fn migrations_apply_on_empty_database() {
    let db = empty_db().await;
    let report = run_migrations(&db, &registry()).await.unwrap();

    let versions: Vec<u32> = report.applied.iter().map(|m| m.version).collect();
    assert_eq!(versions, [1, 2]);
    assert!(!report.dry_run);
    assert_eq!(report.records_updated(), 0);
    assert_eq!(report.backfill.len(), 15);

    let status = migration_status(&db).await.unwrap();
    assert_eq!(status.current_version, 2);
    assert_eq!(status.latest_version, 2);
    assert!(status.pending.is_empty());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = empty_db().await;
    run_migrations(&db, &registry()).await.unwrap();
    let second = run_migrations(&db, &registry()).await.unwrap();
    assert!(second.applied.is_empty());

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version ASC")
        .await
        .unwrap();
    let rows: Vec<VersionRow> = result.take(0).unwrap();
    let versions: Vec<u32> = rows.iter().map(|r| r.version).collect();
    assert_eq!(versions, [1, 2]);
}

#[tokio::test]
async fn target_version_stops_before_tenant_scoping() {
    let db = empty_db().await;
    let options = MigrationOptions {
        target_version: Some(1),
        ..MigrationOptions::default()
    };
    let report = run_migrations_with(&db, &registry(), &options).await.unwrap();
    assert_eq!(report.applied.len(), 1);
    assert!(report.backfill.is_empty());

    let status = migration_status(&db).await.unwrap();
    assert_eq!(status.current_version, 1);
    assert_eq!(status.pending.len(), 1);
    assert_eq!(status.pending[0].name, "tenant_scoping");
}

#[tokio::test]
async fn dry_run_on_empty_database_writes_no_schema() {
    let db = empty_db().await;
    let options = MigrationOptions {
        dry_run: true,
        ..MigrationOptions::default()
    };
    let report = run_migrations_with(&db, &registry(), &options).await.unwrap();
    assert!(report.dry_run);
    assert_eq!(report.applied.len(), 2);
    assert_eq!(report.records_updated(), 0);

    let status = migration_status(&db).await.unwrap();
    assert_eq!(status.current_version, 0);
    assert_eq!(status.pending.len(), 2);
}

#[tokio::test]
async fn unregistered_default_tenant_is_rejected() {
    let db = empty_db().await;
    let options = MigrationOptions {
        default_tenant: Some("atlantis".into()),
        ..MigrationOptions::default()
    };
    let err = run_migrations_with(&db, &registry(), &options)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("atlantis"), "{err}");

    let status = migration_status(&db).await.unwrap();
    assert_eq!(status.current_version, 0);
}

#[tokio::test]
async fn names_are_unique_per_tenant_after_migration() {
    let db = empty_db().await;
    let registry = Arc::new(registry());
    run_migrations(&db, &registry).await.unwrap();
    let repo = CustomerRepository::new(db.clone(), Arc::clone(&registry));

    let main = repo
        .create("jamaica-main", CreateCustomer::named("Sunset Resort"))
        .await
        .unwrap();
    let north = repo
        .create("jamaica-north", CreateCustomer::named("Sunset Resort"))
        .await
        .unwrap();
    assert_ne!(main.id, north.id);

    // The composite index itself rejects a duplicate within one tenant.
    let raw = db
        .query(
            "CREATE customer SET tenant_id = 'jamaica-main', name = 'Sunset Resort', \
             preferences = {}",
        )
        .await
        .unwrap()
        .check();
    assert!(raw.is_err());

    let err = repo
        .create("jamaica-main", CreateCustomer::named("Sunset Resort"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HarvestError::DuplicateEntity { existing_id, .. } if existing_id == main.id
    ));
}

#[tokio::test]
async fn tenant_key_is_mandatory_after_migration() {
    let db = empty_db().await;
    run_migrations(&db, &registry()).await.unwrap();

    let result = db
        .query("CREATE supplier SET name = 'Blue Mountain Farm'")
        .await
        .unwrap()
        .check();
    assert!(result.is_err());
}
