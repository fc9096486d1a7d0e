//! Tenant backfill for records written before tenant scoping.
//!
//! Planning is a pure function over a [`TableSnapshot`] list. It decides a
//! tenant for every untenanted record (roots get the default tenant,
//! children inherit their parent's) and collects every record that cannot
//! be assigned one. Only a plan without problems is ever applied.

use std::collections::{BTreeMap, HashMap};

use harvest_core::tenant::TenantRegistry;
use serde_json::json;
use uuid::Uuid;

use crate::error::BackfillProblem;
use crate::scan::{TableSnapshot, TableSpec};

/// Tenant assignments for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePlan {
    pub table: &'static str,
    /// Tenant -> keys of untenanted records it receives.
    pub assignments: BTreeMap<String, Vec<String>>,
    /// Records that already carried a valid tenant.
    pub already_tenanted: u64,
}

impl TablePlan {
    pub fn assigned(&self) -> u64 {
        self.assignments.values().map(|ids| ids.len() as u64).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillPlan {
    pub tables: Vec<TablePlan>,
    pub problems: Vec<BackfillProblem>,
}

impl BackfillPlan {
    pub fn is_applicable(&self) -> bool {
        self.problems.is_empty()
    }

    /// Assignments as the `$plan` parameter of [`apply_statements`]:
    /// `{ table: [{ tenant, ids }] }`, with every table present.
    pub fn to_json(&self) -> serde_json::Value {
        let tables: serde_json::Map<String, serde_json::Value> = self
            .tables
            .iter()
            .map(|plan| {
                let groups: Vec<serde_json::Value> = plan
                    .assignments
                    .iter()
                    .map(|(tenant, ids)| json!({ "tenant": tenant, "ids": ids }))
                    .collect();
                (plan.table.to_string(), serde_json::Value::Array(groups))
            })
            .collect();
        serde_json::Value::Object(tables)
    }
}

/// Decide a tenant for every untenanted record in `snapshot`.
///
/// `snapshot` must list parents before children.
pub fn plan_backfill(
    snapshot: &[TableSnapshot],
    registry: &TenantRegistry,
    default_tenant: &str,
) -> BackfillPlan {
    // table -> record key -> effective tenant, for records that resolved.
    let mut resolved: HashMap<&'static str, HashMap<String, String>> = HashMap::new();
    let mut tables = Vec::with_capacity(snapshot.len());
    let mut problems = Vec::new();

    for TableSnapshot { spec, records } in snapshot {
        let mut plan = TablePlan {
            table: spec.table,
            assignments: BTreeMap::new(),
            already_tenanted: 0,
        };

        for record in records {
            match plan_record(spec, record, &resolved, registry, default_tenant) {
                Ok(tenant) => {
                    if record.tenant_id.is_some() {
                        plan.already_tenanted += 1;
                    } else {
                        plan.assignments
                            .entry(tenant.clone())
                            .or_default()
                            .push(record.id.clone());
                    }
                    resolved
                        .entry(spec.table)
                        .or_default()
                        .insert(record.id.clone(), tenant);
                }
                Err(mut record_problems) => problems.append(&mut record_problems),
            }
        }
        tables.push(plan);
    }

    BackfillPlan { tables, problems }
}

fn plan_record(
    spec: &TableSpec,
    record: &crate::scan::StoredRecord,
    resolved: &HashMap<&'static str, HashMap<String, String>>,
    registry: &TenantRegistry,
    default_tenant: &str,
) -> Result<String, Vec<BackfillProblem>> {
    let table = spec.table;
    if Uuid::parse_str(&record.id).is_err() {
        return Err(vec![BackfillProblem::MalformedId {
            table,
            record_id: record.id.clone(),
        }]);
    }
    if let Some(tenant) = &record.tenant_id {
        if !registry.is_valid_tenant(tenant) {
            return Err(vec![BackfillProblem::UnknownTenant {
                table,
                record_id: record.id.clone(),
                tenant_id: tenant.clone(),
            }]);
        }
    }

    let mut problems = Vec::new();
    let mut targets = Vec::new();
    for (reference, target) in spec.references.iter().zip(&record.references) {
        let Some(target) = target else {
            continue;
        };
        match resolved.get(reference.kind).and_then(|m| m.get(target)) {
            Some(tenant) => targets.push((reference.field, tenant)),
            None => problems.push(BackfillProblem::MissingReference {
                table,
                record_id: record.id.clone(),
                field: reference.field,
                target_table: reference.kind,
                target_id: target.clone(),
            }),
        }
    }
    if !problems.is_empty() {
        return Err(problems);
    }

    let tenant = record
        .tenant_id
        .clone()
        .or_else(|| targets.first().map(|(_, tenant)| (*tenant).clone()))
        .unwrap_or_else(|| default_tenant.to_string());

    for (field, target_tenant) in targets {
        if *target_tenant != tenant {
            problems.push(BackfillProblem::TenantMismatch {
                table,
                record_id: record.id.clone(),
                tenant_id: tenant.clone(),
                field,
                target_tenant: target_tenant.clone(),
            });
        }
    }
    if problems.is_empty() {
        Ok(tenant)
    } else {
        Err(problems)
    }
}

/// Statements that apply a plan bound as `$plan` and switch every table to
/// per-tenant uniqueness. Meant to run inside one transaction.
///
/// A record left untenanted after the plan is applied (one written after
/// the snapshot was taken) throws and cancels the transaction.
pub fn apply_statements(tables: &[TableSpec]) -> Vec<String> {
    let mut statements = Vec::new();
    for spec in tables {
        let t = spec.table;
        statements.push(format!(
            "DEFINE FIELD OVERWRITE tenant_id ON TABLE {t} TYPE option<string>;"
        ));
        statements.push(format!(
            "FOR $group IN $plan.{t} {{ \
             UPDATE {t} SET tenant_id = $group.tenant \
             WHERE <string> meta::id(id) IN $group.ids RETURN NONE; \
             }};"
        ));
        statements.push(format!(
            "IF (SELECT count() AS total FROM {t} \
             WHERE tenant_id IS NONE OR tenant_id IS NULL OR tenant_id = '' \
             GROUP ALL)[0].total > 0 {{ \
             THROW 'untenanted records remain in {t} after backfill'; \
             }};"
        ));
        statements.push(format!(
            "DEFINE FIELD OVERWRITE tenant_id ON TABLE {t} TYPE string ASSERT $value != '';"
        ));
        if let Some(field) = spec.unique_field {
            statements.push(format!("REMOVE INDEX IF EXISTS idx_{t}_{field} ON TABLE {t};"));
            statements.push(format!(
                "DEFINE INDEX OVERWRITE idx_{t}_tenant_{field} ON TABLE {t} \
                 COLUMNS tenant_id, {field} UNIQUE;"
            ));
        }
        statements.push(format!(
            "DEFINE INDEX OVERWRITE idx_{t}_tenant ON TABLE {t} COLUMNS tenant_id;"
        ));
    }
    statements
}

/// Index rebuilds that bring the tenant indexes over records the backfill
/// updated. Run after the backfill transaction commits.
pub fn rebuild_statements(tables: &[TableSpec]) -> Vec<String> {
    let mut statements = Vec::new();
    for spec in tables {
        let t = spec.table;
        if let Some(field) = spec.unique_field {
            statements.push(format!("REBUILD INDEX idx_{t}_tenant_{field} ON TABLE {t};"));
        }
        statements.push(format!("REBUILD INDEX idx_{t}_tenant ON TABLE {t};"));
    }
    statements
}
