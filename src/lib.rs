//! Schema provider: admin-console data access with schema-qualified resource names.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod provider;
pub mod response;
pub mod routes;
pub mod sql;
pub mod state;

pub use config::{
    load_from_env, load_from_path, resolve, BackendIdentifier, NamespaceConfig, NamespaceMapping, ProviderSettings,
};
pub use error::{ConfigError, ProviderError};
pub use provider::{DataProvider, PgDataProvider, SchemaQualifiedProvider};
pub use response::{error_body, success_many, success_one};
pub use routes::{common_routes, common_routes_with_ready, resource_routes};
pub use state::AppState;
