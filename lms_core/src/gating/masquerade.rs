//! Staff "view as" state, keyed by staff user and course

use crate::error::{AppError, Result};
use crate::gating::enrollment::EnrollmentMode;
use crate::gating::partitions::{Group, FULL_ACCESS, LIMITED_ACCESS};
use crate::models::User;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MasqueradeRole {
    Staff,
    Student,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Masquerade {
    pub role: MasqueradeRole,
    /// Group of the content gating partition being previewed.
    #[serde(default)]
    pub group_id: Option<u32>,
    /// Enrollment track being previewed.
    #[serde(default)]
    pub enrollment_mode: Option<EnrollmentMode>,
}

pub trait MasqueradeState: Send + Sync {
    /// Whether `user` is currently viewing `course_id` as a learner.
    fn is_masquerading(&self, user: &User, course_id: &str) -> Result<bool>;

    fn is_masquerading_as_limited_access(&self, user: &User, course_id: &str) -> Result<bool>;

    fn is_masquerading_as_audit_enrollment(&self, user: &User, course_id: &str) -> Result<bool>;

    /// The gating group the masquerade implies, if any.
    fn masquerade_group(&self, user: &User, course_id: &str) -> Result<Option<Group>>;
}

#[derive(Clone, Default)]
pub struct InMemoryMasquerades {
    active: Arc<RwLock<HashMap<(i64, String), Masquerade>>>,
}

impl InMemoryMasquerades {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user: &User, course_id: &str, masquerade: Masquerade) -> Result<()> {
        if !user.is_staff {
            return Err(AppError::Authorization(format!(
                "User {} cannot masquerade in {}",
                user.username, course_id
            )));
        }

        self.active
            .write()
            .insert((user.id, course_id.to_string()), masquerade);
        Ok(())
    }

    pub fn clear(&self, user: &User, course_id: &str) {
        self.active.write().remove(&(user.id, course_id.to_string()));
    }

    fn student_masquerade(&self, user: &User, course_id: &str) -> Option<Masquerade> {
        self.active
            .read()
            .get(&(user.id, course_id.to_string()))
            .filter(|masquerade| masquerade.role == MasqueradeRole::Student)
            .cloned()
    }
}

impl MasqueradeState for InMemoryMasquerades {
    fn is_masquerading(&self, user: &User, course_id: &str) -> Result<bool> {
        Ok(self.student_masquerade(user, course_id).is_some())
    }

    fn is_masquerading_as_limited_access(&self, user: &User, course_id: &str) -> Result<bool> {
        Ok(self
            .student_masquerade(user, course_id)
            .is_some_and(|m| m.group_id == Some(LIMITED_ACCESS.id)))
    }

    fn is_masquerading_as_audit_enrollment(&self, user: &User, course_id: &str) -> Result<bool> {
        Ok(self
            .student_masquerade(user, course_id)
            .is_some_and(|m| m.enrollment_mode == Some(EnrollmentMode::Audit)))
    }

    fn masquerade_group(&self, user: &User, course_id: &str) -> Result<Option<Group>> {
        let Some(masquerade) = self.student_masquerade(user, course_id) else {
            return Ok(None);
        };

        if let Some(group) = masquerade.group_id.and_then(Group::from_id) {
            return Ok(Some(group));
        }

        Ok(masquerade.enrollment_mode.map(|mode| {
            if mode.is_full_access() {
                FULL_ACCESS
            } else {
                LIMITED_ACCESS
            }
        }))
    }
}
