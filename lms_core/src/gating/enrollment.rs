use crate::error::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EnrollmentMode {
    Audit,
    Honor,
    Verified,
    Professional,
    NoIdProfessional,
    Masters,
    Executive,
}

impl EnrollmentMode {
    /// Paid tracks, whose learners are never content gated.
    pub fn is_full_access(&self) -> bool {
        !matches!(self, EnrollmentMode::Audit | EnrollmentMode::Honor)
    }
}

impl std::fmt::Display for EnrollmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrollmentMode::Audit => write!(f, "audit"),
            EnrollmentMode::Honor => write!(f, "honor"),
            EnrollmentMode::Verified => write!(f, "verified"),
            EnrollmentMode::Professional => write!(f, "professional"),
            EnrollmentMode::NoIdProfessional => write!(f, "no-id-professional"),
            EnrollmentMode::Masters => write!(f, "masters"),
            EnrollmentMode::Executive => write!(f, "executive"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enrollment {
    pub user_id: i64,
    pub course_id: String,
    pub mode: EnrollmentMode,
    pub created: DateTime<Utc>,
}

pub trait EnrollmentStore: Send + Sync {
    fn get_enrollment(&self, user_id: i64, course_id: &str) -> Result<Option<Enrollment>>;
}

#[derive(Clone, Default)]
pub struct InMemoryEnrollments {
    enrollments: Arc<RwLock<HashMap<(i64, String), Enrollment>>>,
}

impl InMemoryEnrollments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enroll(&self, enrollment: Enrollment) {
        self.enrollments
            .write()
            .insert((enrollment.user_id, enrollment.course_id.clone()), enrollment);
    }
}

impl EnrollmentStore for InMemoryEnrollments {
    fn get_enrollment(&self, user_id: i64, course_id: &str) -> Result<Option<Enrollment>> {
        Ok(self
            .enrollments
            .read()
            .get(&(user_id, course_id.to_string()))
            .cloned())
    }
}
