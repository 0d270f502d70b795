//! Heartbeat checks for the services the LMS depends on

use crate::config::HeartbeatConfig;
use crate::content::ModuleStore;
use crate::error::{AppError, HeartbeatFailure, Result};
use crate::heartbeat::report::{HealthCheckResult, HeartbeatReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, warn};

/// Outcome of a check that did not pass.
///
/// `Failure` is reported in the heartbeat body; `Unexpected` aborts the
/// whole request.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error(transparent)]
    Failure(#[from] HeartbeatFailure),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

#[async_trait::async_trait]
pub trait HeartbeatCheck: Send + Sync {
    fn name(&self) -> &str;

    /// Returns a short status message when the service is healthy.
    async fn check(&self) -> std::result::Result<String, CheckError>;
}

pub struct SqlCheck {
    pool: sqlx::SqlitePool,
    slow_query_ms: u64,
}

impl SqlCheck {
    pub fn new(pool: sqlx::SqlitePool, slow_query_ms: u64) -> Self {
        Self { pool, slow_query_ms }
    }
}

#[async_trait::async_trait]
impl HeartbeatCheck for SqlCheck {
    fn name(&self) -> &str {
        "sql"
    }

    async fn check(&self) -> std::result::Result<String, CheckError> {
        let start = Instant::now();

        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| HeartbeatFailure::new("sql", e.to_string()))?;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        if elapsed_ms > self.slow_query_ms {
            warn!(
                "SQL heartbeat took {}ms (threshold {}ms)",
                elapsed_ms, self.slow_query_ms
            );
        }

        Ok("OK".to_string())
    }
}

pub struct ModuleStoreCheck {
    store: Arc<dyn ModuleStore>,
}

impl ModuleStoreCheck {
    pub fn new(store: Arc<dyn ModuleStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl HeartbeatCheck for ModuleStoreCheck {
    fn name(&self) -> &str {
        "modulestore"
    }

    async fn check(&self) -> std::result::Result<String, CheckError> {
        Ok(self.store.heartbeat()?)
    }
}

/// Verifies that every configured data directory exists and is writable.
pub struct StorageCheck {
    paths: Vec<PathBuf>,
}

impl StorageCheck {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    async fn probe(path: &Path) -> std::result::Result<(), String> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|_| format!("Path does not exist: {}", path.display()))?;

        if !metadata.is_dir() {
            return Err(format!("Not a directory: {}", path.display()));
        }

        let probe_file = path.join(".heartbeat_probe");
        fs::write(&probe_file, b"heartbeat")
            .await
            .map_err(|_| format!("Cannot write to path: {}", path.display()))?;
        if let Err(e) = fs::remove_file(&probe_file).await {
            warn!("Failed to remove heartbeat probe {}: {}", probe_file.display(), e);
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl HeartbeatCheck for StorageCheck {
    fn name(&self) -> &str {
        "storage"
    }

    async fn check(&self) -> std::result::Result<String, CheckError> {
        let mut issues = Vec::new();

        for path in &self.paths {
            if let Err(issue) = Self::probe(path).await {
                issues.push(issue);
            }
        }

        if issues.is_empty() {
            Ok(format!("{} storage paths writable", self.paths.len()))
        } else {
            Err(HeartbeatFailure::new("storage", issues.join(", ")).into())
        }
    }
}

/// A named check backed by a closure.
pub struct FnCheck {
    name: String,
    check_fn: Box<dyn Fn() -> std::result::Result<String, CheckError> + Send + Sync>,
}

impl FnCheck {
    pub fn new<F>(name: impl Into<String>, check_fn: F) -> Self
    where
        F: Fn() -> std::result::Result<String, CheckError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check_fn: Box::new(check_fn),
        }
    }
}

#[async_trait::async_trait]
impl HeartbeatCheck for FnCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> std::result::Result<String, CheckError> {
        (self.check_fn)()
    }
}

/// Runs the registered checks and collects their results.
#[derive(Default)]
pub struct Heartbeat {
    checks: Vec<Box<dyn HeartbeatCheck>>,
    extended_checks: Vec<Box<dyn HeartbeatCheck>>,
}

impl Heartbeat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_check<T: HeartbeatCheck + 'static>(mut self, check: T) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    pub fn add_extended_check<T: HeartbeatCheck + 'static>(mut self, check: T) -> Self {
        self.extended_checks.push(Box::new(check));
        self
    }

    /// Build the configured check lists. Unknown check names are rejected.
    pub fn from_settings(
        settings: &HeartbeatConfig,
        pool: sqlx::SqlitePool,
        store: Arc<dyn ModuleStore>,
    ) -> Result<Self> {
        let build = |name: &str| -> Result<Box<dyn HeartbeatCheck>> {
            match name {
                "sql" => Ok(Box::new(SqlCheck::new(pool.clone(), settings.slow_query_ms))),
                "modulestore" => Ok(Box::new(ModuleStoreCheck::new(store.clone()))),
                "storage" => Ok(Box::new(StorageCheck::new(settings.storage_paths.clone()))),
                other => Err(AppError::Configuration(format!("Unknown heartbeat check: {}", other))),
            }
        };

        let mut heartbeat = Heartbeat::new();
        for name in &settings.checks {
            heartbeat.checks.push(build(name)?);
        }
        for name in &settings.extended_checks {
            heartbeat.extended_checks.push(build(name)?);
        }
        Ok(heartbeat)
    }

    pub fn check_names(&self, extended: bool) -> Vec<&str> {
        self.active_checks(extended).map(|check| check.name()).collect()
    }

    fn active_checks(&self, extended: bool) -> impl Iterator<Item = &Box<dyn HeartbeatCheck>> {
        let extra: &[Box<dyn HeartbeatCheck>] = if extended { &self.extended_checks } else { &[] };
        self.checks.iter().chain(extra.iter())
    }

    /// Run every active check. A failing check never stops the others; an
    /// unexpected error aborts the run.
    pub async fn run(&self, extended: bool) -> Result<HeartbeatReport> {
        let mut report = HeartbeatReport::new();

        for check in self.active_checks(extended) {
            let name = check.name().to_string();
            let start = Instant::now();

            match check.check().await {
                Ok(message) => {
                    info!("Heartbeat check '{}' passed in {:?}", name, start.elapsed());
                    report.add(HealthCheckResult::ok(name, message));
                }
                Err(CheckError::Failure(failure)) => {
                    error!("Heartbeat check '{}' failed: {}", name, failure);
                    report.add(HealthCheckResult::failed(name, failure.message));
                }
                Err(CheckError::Unexpected(err)) => {
                    error!("Heartbeat check '{}' raised an unexpected error: {:?}", name, err);
                    return Err(AppError::Other(err));
                }
            }
        }

        info!(
            "Heartbeat completed with {} checks, healthy: {}",
            report.len(),
            report.is_healthy()
        );
        Ok(report)
    }
}
