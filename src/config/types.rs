//! Raw config types matching the resource mapping JSON file.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKeyConfig {
    Single(String),
    Composite(Vec<String>),
}

impl PrimaryKeyConfig {
    pub fn columns(&self) -> Vec<String> {
        match self {
            PrimaryKeyConfig::Single(s) => vec![s.clone()],
            PrimaryKeyConfig::Composite(v) => v.clone(),
        }
    }
}

/// One logical resource exposed to the admin console.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub name: String,
    /// Overrides the file-level schema for this resource only.
    #[serde(default)]
    pub schema: Option<String>,
    /// Backend primary key column(s). Omitted means `id`.
    #[serde(default)]
    pub primary_key: Option<PrimaryKeyConfig>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Whole mapping file: a default schema plus per-resource entries.
///
/// ```json
/// { "schema": "ConfigDB", "resources": [ { "name": "boms", "primary_key": "bom_id" } ] }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

impl NamespaceConfig {
    /// Config with only a default schema; every resource is qualified with it and keyed by `id`.
    pub fn uniform(schema: impl Into<String>) -> Self {
        NamespaceConfig {
            schema: Some(schema.into()),
            resources: Vec::new(),
        }
    }
}
