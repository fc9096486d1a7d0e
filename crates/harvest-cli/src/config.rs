//! Configuration file loading.
//!
//! ```toml
//! default_tenant = "island_harvest"
//!
//! [database]
//! url = "ws://localhost:8000"
//! namespace = "harvest"
//! database = "main"
//!
//! [[tenants]]
//! id = "island_harvest"
//! name = "Island Harvest Hub"
//! display_name = "Island Harvest Hub"
//! ```
//!
//! Without a `[[tenants]]` list the built-in businesses are used.

use std::path::{Path, PathBuf};

use harvest_core::error::HarvestError;
use harvest_core::tenant::{TenantRegistry, TenantRegistryConfig};
use harvest_db::DbConfig;
use serde::Deserialize;
use thiserror::Error;

/// Read when `--config` is not given and the file exists.
pub const DEFAULT_CONFIG_FILE: &str = "harvest.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Registry(#[from] HarvestError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub database: DbConfig,
    #[serde(flatten)]
    pub registry: TenantRegistryConfig,
}

impl HarvestConfig {
    /// Load `path`, or `harvest.toml` if present, or the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn tenant_registry(&self) -> Result<TenantRegistry, ConfigError> {
        Ok(TenantRegistry::from_config(self.registry.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: HarvestConfig = toml::from_str("").unwrap();
        assert_eq!(config.database.url, "ws://127.0.0.1:8000");
        let registry = config.tenant_registry().unwrap();
        assert_eq!(registry.default_tenant(), "island_harvest");
    }

    #[test]
    fn tenants_and_database_are_read() {
        let config: HarvestConfig = toml::from_str(
            r##"
            default_tenant = "jamaica-north"

            [database]
            url = "ws://db:8000"
            username = "root"
            password = "root"

            [[tenants]]
            id = "jamaica-main"
            name = "Main"
            display_name = "Jamaica Main"

            [[tenants]]
            id = "jamaica-north"
            name = "North"
            display_name = "Jamaica North"
            primary_color = "#123456"
            "##,
        )
        .unwrap();

        assert_eq!(config.database.url, "ws://db:8000");
        assert_eq!(config.database.namespace, "harvest");
        let registry = config.tenant_registry().unwrap();
        assert_eq!(registry.default_tenant(), "jamaica-north");
        assert_eq!(registry.list_tenants().len(), 2);
        assert_eq!(
            registry.profile("jamaica-north").unwrap().primary_color,
            "#123456"
        );
    }

    #[test]
    fn unknown_default_tenant_is_a_configuration_error() {
        let config: HarvestConfig = toml::from_str(
            r#"
            default_tenant = "atlantis"

            [[tenants]]
            id = "jamaica-main"
            name = "Main"
            display_name = "Jamaica Main"
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.tenant_registry(),
            Err(ConfigError::Registry(HarvestError::Configuration(_)))
        ));
    }
}
