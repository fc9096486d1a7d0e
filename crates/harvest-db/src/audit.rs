//! Read-only tenancy audit of the store.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use harvest_core::tenant::TenantRegistry;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;
use crate::scan::{TableSnapshot, load_snapshot};

/// Record counts of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableAudit {
    pub table: &'static str,
    pub total: u64,
    /// Records per stored tenant, unknown tenants included.
    pub per_tenant: BTreeMap<String, u64>,
    pub untenanted: u64,
    pub unknown_tenant: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditViolation {
    Untenanted {
        table: &'static str,
        record_id: String,
    },
    UnknownTenant {
        table: &'static str,
        record_id: String,
        tenant_id: String,
    },
    DanglingReference {
        table: &'static str,
        record_id: String,
        field: &'static str,
        target_table: &'static str,
        target_id: String,
    },
    CrossTenantReference {
        table: &'static str,
        record_id: String,
        field: &'static str,
        tenant_id: String,
        target_tenant: String,
    },
}

impl fmt::Display for AuditViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Untenanted { table, record_id } => {
                write!(f, "{table}:{record_id}: no tenant")
            }
            Self::UnknownTenant {
                table,
                record_id,
                tenant_id,
            } => write!(f, "{table}:{record_id}: unknown tenant {tenant_id:?}"),
            Self::DanglingReference {
                table,
                record_id,
                field,
                target_table,
                target_id,
            } => write!(
                f,
                "{table}:{record_id}: {field} references missing {target_table}:{target_id}"
            ),
            Self::CrossTenantReference {
                table,
                record_id,
                field,
                tenant_id,
                target_tenant,
            } => write!(
                f,
                "{table}:{record_id}: tenant {tenant_id:?} but {field} points into {target_tenant:?}"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenancyAudit {
    pub tables: Vec<TableAudit>,
    pub violations: Vec<AuditViolation>,
}

impl TenancyAudit {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check every record of every tenant-scoped table.
pub async fn audit_tenancy<C: Connection>(
    db: &Surreal<C>,
    registry: &TenantRegistry,
) -> Result<TenancyAudit, DbError> {
    let snapshot = load_snapshot(db).await?;
    let audit = audit_snapshot(&snapshot, registry);
    info!(
        tables = audit.tables.len(),
        violations = audit.violations.len(),
        "Tenancy audit finished"
    );
    Ok(audit)
}

pub fn audit_snapshot(snapshot: &[TableSnapshot], registry: &TenantRegistry) -> TenancyAudit {
    let tenants: HashMap<&str, HashMap<&str, Option<&str>>> = snapshot
        .iter()
        .map(|t| {
            let records = t
                .records
                .iter()
                .map(|r| (r.id.as_str(), r.tenant_id.as_deref()))
                .collect();
            (t.spec.table, records)
        })
        .collect();

    let mut audit = TenancyAudit::default();
    for TableSnapshot { spec, records } in snapshot {
        let table = spec.table;
        let mut counts = TableAudit {
            table,
            total: records.len() as u64,
            ..TableAudit::default()
        };

        for record in records {
            match &record.tenant_id {
                None => {
                    counts.untenanted += 1;
                    audit.violations.push(AuditViolation::Untenanted {
                        table,
                        record_id: record.id.clone(),
                    });
                }
                Some(tenant) => {
                    *counts.per_tenant.entry(tenant.clone()).or_default() += 1;
                    if !registry.is_valid_tenant(tenant) {
                        counts.unknown_tenant += 1;
                        audit.violations.push(AuditViolation::UnknownTenant {
                            table,
                            record_id: record.id.clone(),
                            tenant_id: tenant.clone(),
                        });
                    }
                }
            }

            for (reference, target) in spec.references.iter().zip(&record.references) {
                let Some(target) = target else {
                    continue;
                };
                let target_tenant = tenants
                    .get(reference.kind)
                    .and_then(|records| records.get(target.as_str()));
                match (target_tenant, record.tenant_id.as_deref()) {
                    (None, _) => audit.violations.push(AuditViolation::DanglingReference {
                        table,
                        record_id: record.id.clone(),
                        field: reference.field,
                        target_table: reference.kind,
                        target_id: target.clone(),
                    }),
                    (Some(Some(target_tenant)), Some(tenant)) if *target_tenant != tenant => {
                        audit.violations.push(AuditViolation::CrossTenantReference {
                            table,
                            record_id: record.id.clone(),
                            field: reference.field,
                            tenant_id: tenant.to_string(),
                            target_tenant: target_tenant.to_string(),
                        })
                    }
                    _ => {}
                }
            }
        }
        audit.tables.push(counts);
    }
    audit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{StoredRecord, TENANT_TABLES};

    fn table(name: &str, records: Vec<StoredRecord>) -> TableSnapshot {
        TableSnapshot {
            spec: *TENANT_TABLES.iter().find(|s| s.table == name).unwrap(),
            records,
        }
    }

    fn record(id: &str, tenant: Option<&str>, references: &[&str]) -> StoredRecord {
        StoredRecord {
            id: id.into(),
            tenant_id: tenant.map(String::from),
            references: references.iter().map(|r| Some(r.to_string())).collect(),
        }
    }

    #[test]
    fn clean_store_has_no_violations() {
        let audit = audit_snapshot(
            &[
                table("customer", vec![record("c1", Some("island_harvest"), &[])]),
                table(
                    "sales_order",
                    vec![record("o1", Some("island_harvest"), &["c1"])],
                ),
            ],
            &TenantRegistry::builtin(),
        );
        assert!(audit.is_clean(), "{:?}", audit.violations);
        assert_eq!(audit.tables[0].per_tenant["island_harvest"], 1);
    }

    #[test]
    fn cross_tenant_and_dangling_references_are_flagged() {
        let audit = audit_snapshot(
            &[
                table(
                    "customer",
                    vec![
                        record("c1", Some("island_harvest"), &[]),
                        record("c2", None, &[]),
                    ],
                ),
                table(
                    "sales_order",
                    vec![
                        record("o1", Some("private_chef"), &["c1"]),
                        record("o2", Some("nowhere"), &["c9"]),
                    ],
                ),
            ],
            &TenantRegistry::builtin(),
        );

        assert_eq!(audit.tables[0].untenanted, 1);
        assert_eq!(audit.tables[1].unknown_tenant, 1);
        assert_eq!(audit.violations.len(), 4);
        assert!(audit.violations.iter().any(|v| matches!(
            v,
            AuditViolation::CrossTenantReference { record_id, .. } if record_id == "o1"
        )));
        assert!(audit.violations.iter().any(|v| matches!(
            v,
            AuditViolation::DanglingReference { target_id, .. } if target_id == "c9"
        )));
    }
}
