//! Tenant registry.
//!
//! Tenants are the businesses managed by one installation. The set is
//! closed: it is loaded once from configuration at process start and never
//! mutated afterwards, so it can be shared behind an `Arc` without locking.
//! Every repository call checks its tenant argument against the registry
//! before touching storage.

use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, HarvestResult};

/// Display metadata for one business (tenant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// Tenant identifier stored on every entity (e.g. `island_harvest`).
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_primary_color")]
    pub primary_color: String,
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
    #[serde(default)]
    pub business_type: String,
    /// Feature areas enabled for this business in the UI.
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_primary_color() -> String {
    "#0B3D23".into()
}

fn default_accent_color() -> String {
    "#C9A122".into()
}

fn default_active() -> bool {
    true
}

/// Summary row returned by [`TenantRegistry::list_tenants`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantSummary {
    pub id: String,
    pub display_name: String,
    pub tagline: String,
}

/// Registry section of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantRegistryConfig {
    /// Tenant assigned to legacy records by the backfill migration.
    /// Defaults to the first configured tenant.
    pub default_tenant: Option<String>,
    #[serde(default)]
    pub tenants: Vec<BusinessProfile>,
}

/// The closed set of valid tenants.
#[derive(Debug, Clone)]
pub struct TenantRegistry {
    profiles: Vec<BusinessProfile>,
    default_tenant: String,
}

impl TenantRegistry {
    /// Build a registry from configuration.
    ///
    /// An empty tenant list falls back to [`TenantRegistry::builtin`].
    pub fn from_config(config: TenantRegistryConfig) -> HarvestResult<Self> {
        if config.tenants.is_empty() {
            let builtin = Self::builtin();
            return match config.default_tenant {
                Some(default) => Self::new(builtin.profiles, default),
                None => Ok(builtin),
            };
        }
        let default = match config.default_tenant {
            Some(default) => default,
            None => config.tenants[0].id.clone(),
        };
        Self::new(config.tenants, default)
    }

    pub fn new(profiles: Vec<BusinessProfile>, default_tenant: String) -> HarvestResult<Self> {
        if profiles.is_empty() {
            return Err(HarvestError::Configuration(
                "tenant registry must contain at least one tenant".into(),
            ));
        }
        for (index, profile) in profiles.iter().enumerate() {
            if !is_well_formed_tenant_id(&profile.id) {
                return Err(HarvestError::Configuration(format!(
                    "tenant id {:?} must be a non-empty slug of [a-z0-9_-]",
                    profile.id
                )));
            }
            if profiles[..index].iter().any(|p| p.id == profile.id) {
                return Err(HarvestError::Configuration(format!(
                    "tenant id {:?} is configured twice",
                    profile.id
                )));
            }
        }
        let registry = Self {
            profiles,
            default_tenant,
        };
        if !registry.is_valid_tenant(&registry.default_tenant) {
            return Err(HarvestError::Configuration(format!(
                "default tenant {:?} is not an active configured tenant",
                registry.default_tenant
            )));
        }
        Ok(registry)
    }

    /// The four Bornfidis businesses, with `island_harvest` as default.
    pub fn builtin() -> Self {
        let profile = |id: &str,
                       name: &str,
                       display_name: &str,
                       tagline: &str,
                       description: &str,
                       location: &str,
                       primary_color: &str,
                       business_type: &str,
                       modules: &[&str]| BusinessProfile {
            id: id.into(),
            name: name.into(),
            display_name: display_name.into(),
            tagline: tagline.into(),
            description: description.into(),
            location: location.into(),
            primary_color: primary_color.into(),
            accent_color: default_accent_color(),
            business_type: business_type.into(),
            modules: modules.iter().map(|m| m.to_string()).collect(),
            active: true,
        };

        Self {
            profiles: vec![
                profile(
                    "island_harvest",
                    "Island Harvest Hub",
                    "Island Harvest Hub",
                    "Farm-to-Table Distribution • Port Antonio, Jamaica",
                    "Connecting local farmers with hotels and restaurants",
                    "Port Antonio, Jamaica",
                    "#0B3D23",
                    "distribution",
                    &[
                        "customers",
                        "suppliers",
                        "orders",
                        "financials",
                        "operations",
                        "communications",
                    ],
                ),
                profile(
                    "bornfidis_provisions",
                    "Bornfidis Provisions",
                    "Bornfidis Provisions",
                    "Agriculture & Food Logistics • Jamaica",
                    "Agricultural operations and food logistics solutions",
                    "Jamaica",
                    "#0B3D23",
                    "agriculture",
                    &["suppliers", "inventory", "logistics", "financials", "operations"],
                ),
                profile(
                    "private_chef",
                    "Private Chef Services",
                    "Private Chef Services",
                    "Culinary Excellence • Okemo Valley, Vermont",
                    "Professional private chef services and catering",
                    "Okemo Valley, Vermont",
                    "#8B4513",
                    "service",
                    &["clients", "bookings", "menus", "financials", "communications"],
                ),
                profile(
                    "bornfidis_sportswear",
                    "Bornfidis Sportswear",
                    "Bornfidis Sportswear",
                    "Sustainable Activewear • Jamaica & Vermont",
                    "Adapt, Explore, Empower - Sustainable athletic wear",
                    "Jamaica & Vermont",
                    "#0B3D23",
                    "retail",
                    &["inventory", "orders", "customers", "financials", "ecommerce"],
                ),
            ],
            default_tenant: "island_harvest".into(),
        }
    }

    /// Active tenants in configuration order.
    pub fn list_tenants(&self) -> Vec<TenantSummary> {
        self.profiles
            .iter()
            .filter(|p| p.active)
            .map(|p| TenantSummary {
                id: p.id.clone(),
                display_name: p.display_name.clone(),
                tagline: p.tagline.clone(),
            })
            .collect()
    }

    /// Whether `id` names an active configured tenant.
    pub fn is_valid_tenant(&self, id: &str) -> bool {
        self.profile(id).is_some_and(|p| p.active)
    }

    /// Tenant used by the backfill migration for legacy records only.
    pub fn default_tenant(&self) -> &str {
        &self.default_tenant
    }

    pub fn profile(&self, id: &str) -> Option<&BusinessProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Resolve `id` to its profile or fail with [`HarvestError::InvalidTenant`].
    pub fn ensure_valid(&self, id: &str) -> HarvestResult<&BusinessProfile> {
        self.profile(id)
            .filter(|p| p.active)
            .ok_or_else(|| HarvestError::InvalidTenant {
                tenant_id: id.to_string(),
            })
    }
}

fn is_well_formed_tenant_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 50
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> BusinessProfile {
        BusinessProfile {
            id: id.into(),
            name: id.into(),
            display_name: id.to_uppercase(),
            tagline: format!("{id} tagline"),
            description: String::new(),
            location: String::new(),
            primary_color: default_primary_color(),
            accent_color: default_accent_color(),
            business_type: String::new(),
            modules: Vec::new(),
            active: true,
        }
    }

    #[test]
    fn builtin_registry_defaults_to_island_harvest() {
        let registry = TenantRegistry::builtin();
        assert_eq!(registry.default_tenant(), "island_harvest");
        let ids: Vec<_> = registry.list_tenants().into_iter().map(|t| t.id).collect();
        assert_eq!(
            ids,
            [
                "island_harvest",
                "bornfidis_provisions",
                "private_chef",
                "bornfidis_sportswear"
            ]
        );
    }

    #[test]
    fn unknown_and_inactive_tenants_are_invalid() {
        let mut dormant = profile("dormant");
        dormant.active = false;
        let registry =
            TenantRegistry::new(vec![profile("jamaica-main"), dormant], "jamaica-main".into())
                .unwrap();

        assert!(registry.is_valid_tenant("jamaica-main"));
        assert!(!registry.is_valid_tenant("dormant"));
        assert!(!registry.is_valid_tenant("jamaica-north"));
        assert!(!registry.is_valid_tenant(""));
        assert_eq!(registry.list_tenants().len(), 1);

        let err = registry.ensure_valid("dormant").unwrap_err();
        assert!(matches!(err, HarvestError::InvalidTenant { tenant_id } if tenant_id == "dormant"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = TenantRegistry::new(vec![profile("a"), profile("a")], "a".into());
        assert!(matches!(result, Err(HarvestError::Configuration(_))));
    }

    #[test]
    fn malformed_ids_are_rejected() {
        for bad in ["", "Upper", "has space", "semi;colon"] {
            let result = TenantRegistry::new(vec![profile(bad)], bad.into());
            assert!(result.is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn default_must_be_active_and_configured() {
        let result = TenantRegistry::new(vec![profile("a")], "b".into());
        assert!(matches!(result, Err(HarvestError::Configuration(_))));
    }

    #[test]
    fn config_without_tenants_uses_builtin_set() {
        let registry = TenantRegistry::from_config(TenantRegistryConfig::default()).unwrap();
        assert!(registry.is_valid_tenant("private_chef"));

        let registry = TenantRegistry::from_config(TenantRegistryConfig {
            default_tenant: None,
            tenants: vec![profile("jamaica-main"), profile("jamaica-north")],
        })
        .unwrap();
        assert_eq!(registry.default_tenant(), "jamaica-main");
        assert!(!registry.is_valid_tenant("island_harvest"));
    }
}
