//! Load the namespace config from a JSON file and resolve it into a [`NamespaceMapping`].

use crate::config::resolved::{NamespaceMapping, ResourceMapping, DEFAULT_PRIMARY_KEY};
use crate::config::settings::{RESOURCES_PATH_ENV, SCHEMA_ENV};
use crate::config::{validate, NamespaceConfig};
use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

/// Build the immutable mapping from raw config (validates first).
pub fn resolve(config: &NamespaceConfig) -> Result<NamespaceMapping, ConfigError> {
    validate(config)?;

    let mut resources = HashMap::with_capacity(config.resources.len());
    for r in &config.resources {
        let primary_key = r
            .primary_key
            .as_ref()
            .map(|pk| pk.columns())
            .unwrap_or_else(|| vec![DEFAULT_PRIMARY_KEY.to_string()]);
        resources.insert(
            r.name.clone(),
            ResourceMapping {
                schema: r.schema.clone(),
                primary_key,
            },
        );
    }

    Ok(NamespaceMapping::new(config.schema.clone(), resources))
}

/// Read and parse a mapping file.
pub async fn load_from_path(path: &Path) -> Result<NamespaceConfig, ConfigError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}

/// Mapping file from `ADMIN_RESOURCES_PATH` (if set), with `ADMIN_SCHEMA` overriding its default schema.
pub async fn load_from_env() -> Result<NamespaceConfig, ConfigError> {
    load_from_lookup(|name| dotenvy::var(name).ok()).await
}

pub async fn load_from_lookup<F>(lookup: F) -> Result<NamespaceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let mut config = match var(RESOURCES_PATH_ENV) {
        Some(path) => {
            tracing::info!(path = %path, "loading resource mapping");
            load_from_path(Path::new(&path)).await?
        }
        None => NamespaceConfig::default(),
    };
    if let Some(schema) = var(SCHEMA_ENV) {
        config.schema = Some(schema);
    }
    if config.schema.is_none() {
        tracing::warn!("no default schema configured; only explicitly mapped resources are reachable");
    }
    Ok(config)
}
