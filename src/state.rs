//! Shared application state for the data routes.

use crate::provider::DataProvider;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Usually a `SchemaQualifiedProvider` over the PostgreSQL client.
    pub provider: Arc<dyn DataProvider>,
}

impl AppState {
    pub fn new<P: DataProvider + 'static>(provider: P) -> Self {
        AppState {
            provider: Arc::new(provider),
        }
    }
}
