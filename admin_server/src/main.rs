//! Admin data server: reads settings and the resource mapping, connects to the backend,
//! and serves the schema-qualified data routes under `/api/v1`.
//!
//! Run from repo root: `cargo run -p admin-server`

use axum::Router;
use schema_provider::{
    common_routes_with_ready, load_from_env, resolve, resource_routes, AppState, PgDataProvider, ProviderSettings,
    SchemaQualifiedProvider,
};
use std::sync::Arc;
use tokio::net::TcpListener;

const LISTEN_ADDR_ENV: &str = "ADMIN_LISTEN_ADDR";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("schema_provider=info,admin_server=info")),
        )
        .init();

    let settings = ProviderSettings::from_env()?;
    let mapping = Arc::new(resolve(&load_from_env().await?)?);
    tracing::info!(
        schema = mapping.default_schema().unwrap_or("<none>"),
        "namespace mapping loaded"
    );

    let pool = PgDataProvider::connect(&settings, 5).await?;
    let client = PgDataProvider::new(pool.clone()).with_primary_keys(mapping.primary_keys_by_backend());
    let state = AppState::new(SchemaQualifiedProvider::new(client, mapping));

    let app = Router::new()
        .merge(common_routes_with_ready(pool))
        .nest("/api/v1", resource_routes(state));

    let addr = std::env::var(LISTEN_ADDR_ENV).unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
