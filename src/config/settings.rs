//! Process settings read once at startup from the environment (and `.env`).

use crate::error::ConfigError;

/// Backend endpoint, e.g. `postgres://db.internal:5432/configdb`.
pub const INSTANCE_URL_ENV: &str = "ADMIN_INSTANCE_URL";
/// Access credential for the backend.
pub const API_KEY_ENV: &str = "ADMIN_API_KEY";
/// Default schema; overrides the mapping file's `schema`.
pub const SCHEMA_ENV: &str = "ADMIN_SCHEMA";
/// Optional path of the resource mapping JSON file.
pub const RESOURCES_PATH_ENV: &str = "ADMIN_RESOURCES_PATH";

#[derive(Clone)]
pub struct ProviderSettings {
    pub instance_url: String,
    pub api_key: String,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("instance_url", &self.instance_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ProviderSettings {
    /// Read endpoint and credential. Missing or empty values are a startup error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingEnv(name))
        };
        Ok(ProviderSettings {
            instance_url: required(INSTANCE_URL_ENV)?,
            api_key: required(API_KEY_ENV)?,
        })
    }
}
