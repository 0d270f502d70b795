//! Course content blocks as seen by the gating logic

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Partition id -> ids of the groups allowed to see a block.
pub type GroupAccess = HashMap<u32, Vec<u32>>;

/// A node of a course content tree.
///
/// `merged_group_access` already folds in every ancestor's restrictions, so
/// a block can be judged without walking back up the tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentBlock {
    pub usage_key: String,
    pub category: String,
    pub display_name: String,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub graded: bool,
    #[serde(default)]
    pub has_score: bool,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub merged_group_access: GroupAccess,
}

impl ContentBlock {
    pub fn new(usage_key: impl Into<String>, category: impl Into<String>) -> Self {
        let usage_key = usage_key.into();
        Self {
            display_name: usage_key.clone(),
            usage_key,
            category: category.into(),
            children: Vec::new(),
            graded: false,
            has_score: false,
            weight: None,
            merged_group_access: GroupAccess::new(),
        }
    }

    /// A scored, graded problem worth a non-zero number of points.
    ///
    /// An unset weight means the raw problem score counts, so only an explicit
    /// zero makes a graded problem ineligible.
    pub fn is_gating_eligible(&self) -> bool {
        self.graded && self.has_score && self.weight != Some(0.0)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn allowed_groups(&self, partition_id: u32) -> Option<&[u32]> {
        self.merged_group_access
            .get(&partition_id)
            .map(|groups| groups.as_slice())
    }
}

/// Combine an ancestor's merged access with a block's own settings.
///
/// Partitions restricted on both sides keep only the groups present in both;
/// a partition restricted on one side keeps that side's groups.
pub fn merge_group_access(inherited: &GroupAccess, own: &GroupAccess) -> GroupAccess {
    let mut merged = inherited.clone();

    for (partition_id, groups) in own {
        merged
            .entry(*partition_id)
            .and_modify(|existing| existing.retain(|group| groups.contains(group)))
            .or_insert_with(|| groups.clone());
    }

    merged
}
