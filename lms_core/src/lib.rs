//! Core library for the LMS service: heartbeat checks, course content and
//! content type gating, plus the HTTP routes exposing them.

pub mod catalog;
pub mod config;
pub mod content;
pub mod database;
pub mod error;
pub mod gating;
pub mod handlers;
pub mod heartbeat;
pub mod middleware;
pub mod models;

pub use catalog::{Catalog, CatalogStores};
pub use config::AppConfig;
pub use content::{ContentBlock, Course, InMemoryModuleStore, ModuleStore};
pub use database::get_database_pool;
pub use error::{AppError, HeartbeatFailure, Result};
pub use gating::{ContentTypeGatingService, PartitionAccessControl, SettingsGatingConfig};
pub use handlers::routes::create_routes;
pub use heartbeat::{Heartbeat, HeartbeatCheck, HeartbeatReport};
pub use models::{User, UserDirectory};

use axum::Router;
use gating::{EnrollmentStore, MasqueradeState};
use sqlx::SqlitePool;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub heartbeat: Arc<Heartbeat>,
    pub module_store: Arc<dyn ModuleStore>,
    pub users: UserDirectory,
    pub gating: Arc<ContentTypeGatingService>,
}

impl AppState {
    pub fn new(config: &AppConfig, pool: SqlitePool, stores: CatalogStores) -> Result<Self> {
        let module_store: Arc<dyn ModuleStore> = Arc::new(stores.module_store);
        let enrollments: Arc<dyn EnrollmentStore> = Arc::new(stores.enrollments);
        let masquerades: Arc<dyn MasqueradeState> = Arc::new(stores.masquerades);

        let heartbeat = Heartbeat::from_settings(&config.heartbeat, pool, module_store.clone())?;

        let gating_config = SettingsGatingConfig::new(
            config.gating.clone(),
            enrollments.clone(),
            masquerades.clone(),
        );
        let access_control = PartitionAccessControl::new(
            module_store.clone(),
            enrollments,
            masquerades.clone(),
        );
        let gating = ContentTypeGatingService::new(
            module_store.clone(),
            Arc::new(gating_config),
            Arc::new(access_control),
            masquerades,
        );

        Ok(Self {
            app_name: "LMS".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            heartbeat: Arc::new(heartbeat),
            module_store,
            users: stores.users,
            gating: Arc::new(gating),
        })
    }

    pub fn with_heartbeat(mut self, heartbeat: Heartbeat) -> Self {
        self.heartbeat = Arc::new(heartbeat);
        self
    }

    #[cfg(test)]
    pub(crate) async fn for_tests() -> Self {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        AppState::new(&AppConfig::default(), pool, CatalogStores::default()).unwrap()
    }
}

pub fn create_app(state: AppState) -> Router {
    middleware::logging::with_request_logging(create_routes().with_state(state))
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
