pub mod checks;
pub mod report;


pub use checks::{CheckError, FnCheck, Heartbeat, HeartbeatCheck, ModuleStoreCheck, SqlCheck, StorageCheck};
pub use report::{CheckStatus, HealthCheckResult, HeartbeatReport};
