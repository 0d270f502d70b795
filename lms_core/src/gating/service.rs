//! Content type gating for subtrees of a course.
//!
//! Gating is normally enforced block by block when content loads. This
//! service answers the question for a whole subtree at once (a sequence or
//! vertical, e.g. a timed exam) so the caller can show a single paywall in
//! its place.

use crate::content::{leaf_filter, traverse_pre_order, ContentBlock, Course, ModuleStore};
use crate::error::Result;
use crate::gating::access::{AccessControl, AccessDecision, INCORRECT_USER_GROUP, LOAD};
use crate::gating::config::GatingConfig;
use crate::gating::fragment::Fragment;
use crate::gating::masquerade::MasqueradeState;
use crate::gating::partitions::{content_gating_groups, ContentGatingPartition, FULL_ACCESS, LIMITED_ACCESS};
use crate::models::User;
use std::sync::Arc;
use tracing::debug;

pub struct ContentTypeGatingService {
    store: Arc<dyn ModuleStore>,
    config: Arc<dyn GatingConfig>,
    access: Arc<dyn AccessControl>,
    masquerades: Arc<dyn MasqueradeState>,
}

impl ContentTypeGatingService {
    pub fn new(
        store: Arc<dyn ModuleStore>,
        config: Arc<dyn GatingConfig>,
        access: Arc<dyn AccessControl>,
        masquerades: Arc<dyn MasqueradeState>,
    ) -> Self {
        Self {
            store,
            config,
            access,
            masquerades,
        }
    }

    fn is_masquerading_as_audit_or_limited_access(&self, user: &User, course_id: &str) -> Result<bool> {
        Ok(self.masquerades.is_masquerading_as_limited_access(user, course_id)?
            || self.masquerades.is_masquerading_as_audit_enrollment(user, course_id)?)
    }

    /// The paywall, if any, that `block` shows to `user`.
    pub fn content_type_gate_for_block(
        &self,
        user: &User,
        block: &ContentBlock,
        course: &Course,
        course_id: &str,
    ) -> Result<Option<Fragment>> {
        if !block.is_gating_eligible() {
            return Ok(None);
        }

        if let AccessDecision::Denied { error_code, user_fragment } =
            self.access.has_access(user, LOAD, block, course_id)?
        {
            if error_code == INCORRECT_USER_GROUP {
                return Ok(user_fragment);
            }
        }

        // Staff previewing as a free-track learner are not denied by the
        // access check, so the partition is consulted directly. The groups
        // may have been widened by a course team override.
        if self.is_masquerading_as_audit_or_limited_access(user, course_id)? {
            let limited_allowed = content_gating_groups(block)
                .is_some_and(|groups| groups.contains(&LIMITED_ACCESS.id));

            if !limited_allowed {
                return Ok(ContentGatingPartition::for_course(course).access_denied_fragment(
                    course,
                    user,
                    &LIMITED_ACCESS,
                    &[FULL_ACCESS],
                ));
            }
        }

        Ok(None)
    }

    /// Content of the first paywall found among the leaves under `item`.
    ///
    /// Leaves are checked in pre-order and the walk stops at the first gated
    /// one. Returns `None` for anonymous requests, when gating does not apply
    /// to the user's enrollment, or when no leaf is gated.
    pub fn check_children_for_content_type_gating_paywall(
        &self,
        user: Option<&User>,
        item: &Arc<ContentBlock>,
        course: &Course,
        course_id: &str,
    ) -> Result<Option<String>> {
        let Some(user) = user else {
            return Ok(None);
        };

        if !self.config.enabled_for_enrollment(user, course_id)? {
            return Ok(None);
        }

        let store = self.store.as_ref();
        let children = |block: &Arc<ContentBlock>| store.get_children(block);

        for block in traverse_pre_order(Arc::clone(item), children, leaf_filter(children)) {
            if let Some(fragment) = self.content_type_gate_for_block(user, &block, course, course_id)? {
                debug!(
                    "Content type gate on {} under {} for user {}",
                    block.usage_key, item.usage_key, user.username
                );
                return Ok(Some(fragment.content));
            }
        }

        Ok(None)
    }
}
