//! Main entry point for the HTTP server binary

use anyhow::Result;
use lms_core::{create_app, get_database_pool, run_server, AppConfig, AppState, Catalog, CatalogStores};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());
    info!("Database URL: {}", config.database.url);

    let addr: SocketAddr = config.bind_address().parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let pool = get_database_pool(&config.database).await
        .map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?;

    let stores = load_catalog(&config)?;
    info!(
        "Catalog ready: {} courses, {} blocks, {} users",
        stores.module_store.course_count(),
        stores.module_store.block_count(),
        stores.users.len()
    );

    let state = AppState::new(&config, pool, stores)
        .map_err(|e| anyhow::anyhow!("Failed to build application state: {}", e))?;

    info!("App: {} v{}", state.app_name, state.version);
    info!("Heartbeat checks: {:?}", state.heartbeat.check_names(true));

    let app = create_app(state);

    run_server(app, addr).await?;

    info!("Server shutdown complete");
    Ok(())
}

fn load_catalog(config: &AppConfig) -> Result<CatalogStores> {
    let path = &config.catalog.path;
    if !path.exists() {
        warn!("Catalog {} not found, starting with an empty module store", path.display());
        return Ok(CatalogStores::default());
    }

    info!("Loading catalog from {}", path.display());
    let stores = Catalog::load(path)
        .and_then(Catalog::into_stores)
        .map_err(|e| anyhow::anyhow!("Failed to load catalog: {}", e))?;

    Ok(stores)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let default_level = if cfg!(debug_assertions) {
                "debug"
            } else {
                "info"
            };

            format!(
                "{}={},lms_core={},tower_http=debug,axum=debug",
                env!("CARGO_CRATE_NAME").replace('-', "_"),
                default_level,
                default_level
            ).into()
        });

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}
