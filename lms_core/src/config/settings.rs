use chrono::{DateTime, Utc};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub heartbeat: HeartbeatConfig,
    pub catalog: CatalogConfig,
    pub gating: GatingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout_seconds: u64,
}

/// Which checks the heartbeat endpoint runs.
///
/// `checks` always run; `extended_checks` only run when the request carries
/// the `extended` query parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    pub checks: Vec<String>,
    pub extended_checks: Vec<String>,
    pub storage_paths: Vec<PathBuf>,
    pub slow_query_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

/// Empty course lists are dropped when defaults are layered, so every field
/// falls back to `GatingSettings::default()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatingSettings {
    pub enabled: bool,
    pub enabled_courses: Vec<String>,
    pub disabled_courses: Vec<String>,
    pub enabled_as_of: Option<DateTime<Utc>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            heartbeat: HeartbeatConfig::default(),
            catalog: CatalogConfig::default(),
            gating: GatingSettings::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:./lms.db?mode=rwc".to_string(),
            max_connections: 5,
            connection_timeout_seconds: 30,
        }
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            checks: vec!["modulestore".to_string(), "sql".to_string()],
            extended_checks: vec!["storage".to_string()],
            storage_paths: vec![PathBuf::from("./data")],
            slow_query_ms: 1000,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/catalog.yaml"),
        }
    }
}

impl Default for GatingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            enabled_courses: Vec::new(),
            disabled_courses: Vec::new(),
            enabled_as_of: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.database.url.is_empty() {
            return Err(ConfigError::Message(
                "Database URL cannot be empty".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "Database max connections must be greater than 0".to_string(),
            ));
        }

        if self.heartbeat.checks.is_empty() {
            return Err(ConfigError::Message(
                "At least one heartbeat check must be configured".to_string(),
            ));
        }

        if let Some(course_id) = self
            .gating
            .enabled_courses
            .iter()
            .find(|id| self.gating.disabled_courses.contains(id))
        {
            return Err(ConfigError::Message(format!(
                "Course {} is both enabled and disabled for content gating",
                course_id
            )));
        }

        if !self.gating.enabled && self.gating.enabled_courses.is_empty() {
            tracing::warn!("Content type gating is disabled for every course");
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
