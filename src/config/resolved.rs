//! Resolved namespace mapping: config validated and flattened for runtime use.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::fmt;

/// Primary key used when a resource does not declare one.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Fully qualified name sent to the backend: `schema.resource`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BackendIdentifier {
    pub schema: String,
    pub resource: String,
}

impl BackendIdentifier {
    pub fn new(schema: impl Into<String>, resource: impl Into<String>) -> Self {
        BackendIdentifier {
            schema: schema.into(),
            resource: resource.into(),
        }
    }

    /// Split `schema.resource` on the first dot. Both halves must be non-empty.
    pub fn parse(qualified: &str) -> Result<Self, ConfigError> {
        match qualified.split_once('.') {
            Some((schema, resource)) if !schema.is_empty() && !resource.is_empty() => {
                Ok(BackendIdentifier::new(schema, resource))
            }
            _ => Err(ConfigError::InvalidIdentifier {
                kind: "backend",
                value: qualified.to_string(),
            }),
        }
    }
}

impl fmt::Display for BackendIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.resource)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceMapping {
    /// Schema for this resource; `None` falls back to the mapping default.
    pub schema: Option<String>,
    pub primary_key: Vec<String>,
}

/// Immutable logical-name → backend mapping. Built once at startup, shared by reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamespaceMapping {
    default_schema: Option<String>,
    resources: HashMap<String, ResourceMapping>,
}

impl NamespaceMapping {
    pub fn new(default_schema: Option<String>, resources: HashMap<String, ResourceMapping>) -> Self {
        NamespaceMapping {
            default_schema,
            resources,
        }
    }

    /// Every resource goes to `schema`, keyed by `id`.
    pub fn uniform(schema: impl Into<String>) -> Self {
        NamespaceMapping {
            default_schema: Some(schema.into()),
            resources: HashMap::new(),
        }
    }

    pub fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceMapping> {
        self.resources.get(name)
    }

    /// Schema-qualify a logical resource name. Fails when neither an explicit entry
    /// nor the default schema covers it.
    pub fn qualify(&self, resource: &str) -> Result<BackendIdentifier, ConfigError> {
        if resource.is_empty() {
            return Err(ConfigError::UnmappedResource(String::new()));
        }
        let schema = self
            .resources
            .get(resource)
            .and_then(|r| r.schema.as_deref())
            .or(self.default_schema.as_deref())
            .ok_or_else(|| ConfigError::UnmappedResource(resource.to_string()))?;
        Ok(BackendIdentifier::new(schema, resource))
    }

    /// Primary key columns for a logical resource (`["id"]` when not configured).
    pub fn primary_key(&self, resource: &str) -> Vec<String> {
        self.resources
            .get(resource)
            .map(|r| r.primary_key.clone())
            .unwrap_or_else(|| vec![DEFAULT_PRIMARY_KEY.to_string()])
    }

    /// Primary keys keyed by backend identifier, for clients that only see qualified names.
    /// Resources whose schema cannot be resolved are skipped.
    pub fn primary_keys_by_backend(&self) -> HashMap<String, Vec<String>> {
        self.resources
            .iter()
            .filter_map(|(name, r)| {
                let backend = self.qualify(name).ok()?;
                Some((backend.to_string(), r.primary_key.clone()))
            })
            .collect()
    }
}
