pub mod settings;

pub use settings::{AppConfig, CatalogConfig, DatabaseConfig, GatingSettings, HeartbeatConfig, ServerConfig};
