//! Load permission checks for content blocks

use crate::content::{ContentBlock, ModuleStore};
use crate::error::Result;
use crate::gating::enrollment::EnrollmentStore;
use crate::gating::fragment::Fragment;
use crate::gating::masquerade::MasqueradeState;
use crate::gating::partitions::{content_gating_groups, ContentGatingPartition, Group, FULL_ACCESS, LIMITED_ACCESS};
use crate::models::User;
use std::sync::Arc;
use tracing::debug;

pub const LOAD: &str = "load";
pub const INCORRECT_USER_GROUP: &str = "incorrect_user_group";

#[derive(Debug, Clone, PartialEq)]
pub enum AccessDecision {
    Allowed,
    Denied {
        error_code: String,
        user_fragment: Option<Fragment>,
    },
}

impl AccessDecision {
    pub fn denied(error_code: impl Into<String>, user_fragment: Option<Fragment>) -> Self {
        AccessDecision::Denied {
            error_code: error_code.into(),
            user_fragment,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    pub fn error_code(&self) -> Option<&str> {
        match self {
            AccessDecision::Allowed => None,
            AccessDecision::Denied { error_code, .. } => Some(error_code),
        }
    }
}

pub trait AccessControl: Send + Sync {
    fn has_access(
        &self,
        user: &User,
        action: &str,
        block: &ContentBlock,
        course_id: &str,
    ) -> Result<AccessDecision>;
}

/// Enforces the content gating partition on `load`.
///
/// The learner's group is the masquerade group when staff are viewing as a
/// learner, full access for staff and paid enrollments, limited access
/// otherwise.
pub struct PartitionAccessControl {
    store: Arc<dyn ModuleStore>,
    enrollments: Arc<dyn EnrollmentStore>,
    masquerades: Arc<dyn MasqueradeState>,
}

impl PartitionAccessControl {
    pub fn new(
        store: Arc<dyn ModuleStore>,
        enrollments: Arc<dyn EnrollmentStore>,
        masquerades: Arc<dyn MasqueradeState>,
    ) -> Self {
        Self {
            store,
            enrollments,
            masquerades,
        }
    }

    fn gating_group(&self, user: &User, course_id: &str) -> Result<Group> {
        if let Some(group) = self.masquerades.masquerade_group(user, course_id)? {
            return Ok(group);
        }

        if user.is_staff {
            return Ok(FULL_ACCESS);
        }

        let group = match self.enrollments.get_enrollment(user.id, course_id)? {
            Some(enrollment) if enrollment.mode.is_full_access() => FULL_ACCESS,
            _ => LIMITED_ACCESS,
        };
        Ok(group)
    }
}

impl AccessControl for PartitionAccessControl {
    fn has_access(
        &self,
        user: &User,
        action: &str,
        block: &ContentBlock,
        course_id: &str,
    ) -> Result<AccessDecision> {
        if action != LOAD {
            return Ok(AccessDecision::Allowed);
        }

        let Some(allowed) = content_gating_groups(block) else {
            return Ok(AccessDecision::Allowed);
        };

        let group = self.gating_group(user, course_id)?;
        if allowed.contains(&group.id) {
            return Ok(AccessDecision::Allowed);
        }

        debug!(
            "User {} in group {} may not load {}",
            user.username, group.name, block.usage_key
        );

        let allowed_groups: Vec<Group> = allowed.iter().copied().filter_map(Group::from_id).collect();
        let user_fragment = self.store.get_course(course_id).and_then(|course| {
            ContentGatingPartition::for_course(&course)
                .access_denied_fragment(&course, user, &group, &allowed_groups)
        });

        Ok(AccessDecision::denied(INCORRECT_USER_GROUP, user_fragment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Course, GroupAccess, InMemoryModuleStore};
    use crate::gating::enrollment::{Enrollment, EnrollmentMode, InMemoryEnrollments};
    use crate::gating::masquerade::{InMemoryMasquerades, Masquerade, MasqueradeRole};
    use crate::gating::partitions::CONTENT_GATING_PARTITION_ID;
    use chrono::Utc;

    const COURSE: &str = "course-v1:edX+DemoX+2026";

    struct Fixture {
        enrollments: InMemoryEnrollments,
        masquerades: InMemoryMasquerades,
        access: PartitionAccessControl,
    }

    fn fixture() -> Fixture {
        let store = InMemoryModuleStore::new();
        store.insert_course(
            Course {
                course_id: COURSE.to_string(),
                display_name: "Demo Course".to_string(),
                root: "root".to_string(),
                upgrade_url: Some("https://lms.example.com/upgrade".to_string()),
            },
            vec![ContentBlock::new("root", "course")],
        );
        let enrollments = InMemoryEnrollments::new();
        let masquerades = InMemoryMasquerades::new();
        let access = PartitionAccessControl::new(
            Arc::new(store),
            Arc::new(enrollments.clone()),
            Arc::new(masquerades.clone()),
        );
        Fixture {
            enrollments,
            masquerades,
            access,
        }
    }

    fn graded_problem() -> ContentBlock {
        ContentBlock {
            graded: true,
            has_score: true,
            weight: Some(1.0),
            ..ContentBlock::new("problem", "problem")
        }
    }

    fn enroll(fixture: &Fixture, user: &User, mode: EnrollmentMode) {
        fixture.enrollments.enroll(Enrollment {
            user_id: user.id,
            course_id: COURSE.to_string(),
            mode,
            created: Utc::now(),
        });
    }

    #[test]
    fn test_audit_learner_denied_graded_problem() {
        let fixture = fixture();
        let learner = User::new(1, "audit");
        enroll(&fixture, &learner, EnrollmentMode::Audit);

        let decision = fixture.access.has_access(&learner, LOAD, &graded_problem(), COURSE).unwrap();

        assert_eq!(decision.error_code(), Some(INCORRECT_USER_GROUP));
        match decision {
            AccessDecision::Denied { user_fragment, .. } => {
                let fragment = user_fragment.unwrap();
                assert!(fragment.content.contains("data-user-group=\"1\""));
            }
            AccessDecision::Allowed => panic!("expected denial"),
        }
    }

    #[test]
    fn test_verified_learner_allowed() {
        let fixture = fixture();
        let learner = User::new(2, "verified");
        enroll(&fixture, &learner, EnrollmentMode::Verified);

        let decision = fixture.access.has_access(&learner, LOAD, &graded_problem(), COURSE).unwrap();
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_override_opens_block_to_limited_access() {
        let fixture = fixture();
        let learner = User::new(1, "audit");
        enroll(&fixture, &learner, EnrollmentMode::Audit);

        let mut block = graded_problem();
        block.merged_group_access = GroupAccess::from([(CONTENT_GATING_PARTITION_ID, vec![1, 2])]);

        assert!(fixture.access.has_access(&learner, LOAD, &block, COURSE).unwrap().is_allowed());
    }

    #[test]
    fn test_ungraded_block_and_other_actions_allowed() {
        let fixture = fixture();
        let learner = User::new(1, "audit");
        enroll(&fixture, &learner, EnrollmentMode::Audit);

        let ungraded = ContentBlock::new("html", "html");
        assert!(fixture.access.has_access(&learner, LOAD, &ungraded, COURSE).unwrap().is_allowed());
        assert!(fixture.access.has_access(&learner, "staff", &graded_problem(), COURSE).unwrap().is_allowed());
    }

    #[test]
    fn test_staff_allowed_unless_masquerading() {
        let fixture = fixture();
        let staff = User::staff(9, "staff");

        assert!(fixture.access.has_access(&staff, LOAD, &graded_problem(), COURSE).unwrap().is_allowed());

        fixture
            .masquerades
            .set(
                &staff,
                COURSE,
                Masquerade {
                    role: MasqueradeRole::Student,
                    group_id: Some(LIMITED_ACCESS.id),
                    enrollment_mode: None,
                },
            )
            .unwrap();

        let decision = fixture.access.has_access(&staff, LOAD, &graded_problem(), COURSE).unwrap();
        assert_eq!(decision.error_code(), Some(INCORRECT_USER_GROUP));
    }
}
