//! The content gating user partition and its two groups

use crate::content::{ContentBlock, Course};
use crate::gating::fragment::{escape_html, Fragment};
use crate::models::User;
use serde::Serialize;

pub const CONTENT_GATING_PARTITION_ID: u32 = 51;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Group {
    pub id: u32,
    pub name: &'static str,
}

pub const LIMITED_ACCESS: Group = Group {
    id: 1,
    name: "Limited-access Users",
};

pub const FULL_ACCESS: Group = Group {
    id: 2,
    name: "Full-access Users",
};

impl Group {
    pub fn from_id(id: u32) -> Option<Group> {
        match id {
            1 => Some(LIMITED_ACCESS),
            2 => Some(FULL_ACCESS),
            _ => None,
        }
    }
}

/// Groups of the gating partition allowed to load `block`.
///
/// Eligible blocks with no explicit entry default to full access only, which
/// is how gating applies to graded problems unless course staff override it.
/// Blocks that are not eligible are never gated.
pub fn content_gating_groups(block: &ContentBlock) -> Option<Vec<u32>> {
    if !block.is_gating_eligible() {
        return None;
    }

    Some(
        block
            .allowed_groups(CONTENT_GATING_PARTITION_ID)
            .map(|groups| groups.to_vec())
            .unwrap_or_else(|| vec![FULL_ACCESS.id]),
    )
}

#[derive(Debug, Clone)]
pub struct ContentGatingPartition {
    pub id: u32,
    pub name: &'static str,
    pub groups: [Group; 2],
}

impl ContentGatingPartition {
    pub fn for_course(_course: &Course) -> Self {
        Self {
            id: CONTENT_GATING_PARTITION_ID,
            name: "Feature-based Enrollments",
            groups: [LIMITED_ACCESS, FULL_ACCESS],
        }
    }

    /// Render the paywall shown to a member of `user_group` for content only
    /// `allowed_groups` may load. Returns `None` when there is no group to
    /// point the learner to.
    pub fn access_denied_fragment(
        &self,
        course: &Course,
        user: &User,
        user_group: &Group,
        allowed_groups: &[Group],
    ) -> Option<Fragment> {
        if allowed_groups.is_empty() {
            return None;
        }

        let allowed_ids = allowed_groups
            .iter()
            .map(|group| group.id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let upgrade = course
            .upgrade_url
            .as_deref()
            .map(|url| {
                format!(
                    "<a class=\"upgrade-link\" href=\"{}\">Upgrade to unlock</a>",
                    escape_html(url)
                )
            })
            .unwrap_or_default();

        let content = format!(
            concat!(
                "<div class=\"content-paywall\" data-partition-id=\"{}\" data-user-group=\"{}\" ",
                "data-allowed-groups=\"{}\" data-username=\"{}\">",
                "<h3>Graded assessments are available to Verified Track learners.</h3>",
                "<p>Upgrade to gain access to locked features like this one and get the most out of {}.</p>",
                "{}</div>"
            ),
            self.id,
            user_group.id,
            allowed_ids,
            escape_html(&user.username),
            escape_html(&course.display_name),
            upgrade,
        );

        Some(Fragment::new(content))
    }
}
