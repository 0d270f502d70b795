use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Failed,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Ok => write!(f, "ok"),
            CheckStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthCheckResult {
    pub identifier: String,
    pub status: CheckStatus,
    pub message: Option<String>,
}

impl HealthCheckResult {
    pub fn ok(identifier: String, message: String) -> Self {
        Self {
            identifier,
            status: CheckStatus::Ok,
            message: Some(message),
        }
    }

    pub fn failed(identifier: String, message: String) -> Self {
        Self {
            identifier,
            status: CheckStatus::Failed,
            message: Some(message),
        }
    }
}

/// Results of a single heartbeat run, keyed by check identifier.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HeartbeatReport {
    results: BTreeMap<String, HealthCheckResult>,
}

impl HeartbeatReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: HealthCheckResult) {
        self.results.insert(result.identifier.clone(), result);
    }

    pub fn get(&self, identifier: &str) -> Option<&HealthCheckResult> {
        self.results.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn is_healthy(&self) -> bool {
        self.results
            .values()
            .all(|result| result.status == CheckStatus::Ok)
    }

    /// Identifier -> message for every check.
    pub fn statuses(&self) -> BTreeMap<String, String> {
        self.results
            .iter()
            .map(|(id, result)| (id.clone(), result.message.clone().unwrap_or_else(|| result.status.to_string())))
            .collect()
    }

    /// Identifier -> error message for failed checks only.
    pub fn failures(&self) -> BTreeMap<String, String> {
        self.results
            .iter()
            .filter(|(_, result)| result.status == CheckStatus::Failed)
            .map(|(id, result)| (id.clone(), result.message.clone().unwrap_or_default()))
            .collect()
    }
}
