//! Module store holding course structure

use crate::content::{ContentBlock, Course};
use crate::error::HeartbeatFailure;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Read access to course content, plus the store's own heartbeat probe.
pub trait ModuleStore: Send + Sync {
    fn get_course(&self, course_id: &str) -> Option<Course>;

    fn get_item(&self, usage_key: &str) -> Option<Arc<ContentBlock>>;

    /// `usage_key`, only if it belongs to `course_id`.
    fn get_course_item(&self, course_id: &str, usage_key: &str) -> Option<Arc<ContentBlock>>;

    /// Children of `block` in their natural order.
    fn get_children(&self, block: &ContentBlock) -> Vec<Arc<ContentBlock>>;

    fn heartbeat(&self) -> Result<String, HeartbeatFailure>;
}

struct StoreInner {
    courses: HashMap<String, Course>,
    blocks: HashMap<String, Arc<ContentBlock>>,
    /// usage key -> owning course id
    owners: HashMap<String, String>,
    available: bool,
}

#[derive(Clone)]
pub struct InMemoryModuleStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl Default for InMemoryModuleStore {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                courses: HashMap::new(),
                blocks: HashMap::new(),
                owners: HashMap::new(),
                available: true,
            })),
        }
    }
}

impl InMemoryModuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a course together with every block of its tree.
    pub fn insert_course(&self, course: Course, blocks: Vec<ContentBlock>) {
        let mut inner = self.inner.write();
        for block in blocks {
            inner
                .owners
                .insert(block.usage_key.clone(), course.course_id.clone());
            inner.blocks.insert(block.usage_key.clone(), Arc::new(block));
        }
        inner.courses.insert(course.course_id.clone(), course);
    }

    /// Take the store offline or bring it back; an offline store fails its heartbeat.
    pub fn set_available(&self, available: bool) {
        self.inner.write().available = available;
    }

    pub fn course_count(&self) -> usize {
        self.inner.read().courses.len()
    }

    pub fn block_count(&self) -> usize {
        self.inner.read().blocks.len()
    }
}

impl ModuleStore for InMemoryModuleStore {
    fn get_course(&self, course_id: &str) -> Option<Course> {
        self.inner.read().courses.get(course_id).cloned()
    }

    fn get_item(&self, usage_key: &str) -> Option<Arc<ContentBlock>> {
        self.inner.read().blocks.get(usage_key).cloned()
    }

    fn get_course_item(&self, course_id: &str, usage_key: &str) -> Option<Arc<ContentBlock>> {
        let inner = self.inner.read();
        if inner.owners.get(usage_key).map(String::as_str) != Some(course_id) {
            return None;
        }
        inner.blocks.get(usage_key).cloned()
    }

    fn get_children(&self, block: &ContentBlock) -> Vec<Arc<ContentBlock>> {
        let inner = self.inner.read();
        block
            .children
            .iter()
            .filter_map(|key| {
                let child = inner.blocks.get(key).cloned();
                if child.is_none() {
                    warn!("Block {} references missing child {}", block.usage_key, key);
                }
                child
            })
            .collect()
    }

    fn heartbeat(&self) -> Result<String, HeartbeatFailure> {
        let inner = self.inner.read();

        if !inner.available {
            return Err(HeartbeatFailure::new("modulestore", "Module store is unavailable"));
        }

        for course in inner.courses.values() {
            if !inner.blocks.contains_key(&course.root) {
                return Err(HeartbeatFailure::new(
                    "modulestore",
                    format!("Course {} is missing its root block {}", course.course_id, course.root),
                ));
            }
        }

        for block in inner.blocks.values() {
            if let Some(missing) = block.children.iter().find(|key| !inner.blocks.contains_key(*key)) {
                return Err(HeartbeatFailure::new(
                    "modulestore",
                    format!("Block {} references missing child {}", block.usage_key, missing),
                ));
            }
        }

        Ok(format!(
            "Module store serving {} courses and {} blocks",
            inner.courses.len(),
            inner.blocks.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> InMemoryModuleStore {
        let store = InMemoryModuleStore::new();
        let mut root = ContentBlock::new("root", "course");
        root.children = vec!["vertical".to_string()];
        let mut vertical = ContentBlock::new("vertical", "vertical");
        vertical.children = vec!["p1".to_string(), "p2".to_string()];

        store.insert_course(
            Course {
                course_id: "course-v1:edX+DemoX+2026".to_string(),
                display_name: "Demo Course".to_string(),
                root: "root".to_string(),
                upgrade_url: None,
            },
            vec![
                root,
                vertical,
                ContentBlock::new("p1", "problem"),
                ContentBlock::new("p2", "problem"),
            ],
        );
        store
    }

    #[test]
    fn test_children_in_order() {
        let store = sample_store();
        let vertical = store.get_item("vertical").unwrap();

        let children: Vec<_> = store
            .get_children(&vertical)
            .iter()
            .map(|child| child.usage_key.clone())
            .collect();
        assert_eq!(children, vec!["p1", "p2"]);
        assert_eq!(store.block_count(), 4);
        assert_eq!(store.course_count(), 1);
    }

    #[test]
    fn test_course_item_scoped_to_owner() {
        let store = sample_store();
        store.insert_course(
            Course {
                course_id: "course-v1:edX+Other+2026".to_string(),
                display_name: "Other".to_string(),
                root: "other_root".to_string(),
                upgrade_url: None,
            },
            vec![ContentBlock::new("other_root", "course")],
        );

        assert!(store.get_course_item("course-v1:edX+DemoX+2026", "p1").is_some());
        assert!(store.get_course_item("course-v1:edX+Other+2026", "p1").is_none());
        assert!(store.get_course_item("course-v1:edX+DemoX+2026", "other_root").is_none());
        assert!(store.get_course_item("course-v1:edX+DemoX+2026", "missing").is_none());
    }

    #[test]
    fn test_heartbeat_ok() {
        let store = sample_store();
        let message = store.heartbeat().unwrap();
        assert!(message.contains("1 courses"));
    }

    #[test]
    fn test_heartbeat_fails_when_unavailable() {
        let store = sample_store();
        store.set_available(false);

        let failure = store.heartbeat().unwrap_err();
        assert_eq!(failure.service, "modulestore");

        store.set_available(true);
        assert!(store.heartbeat().is_ok());
    }

    #[test]
    fn test_heartbeat_fails_on_dangling_child() {
        let store = sample_store();
        let mut broken = ContentBlock::new("broken", "vertical");
        broken.children = vec!["ghost".to_string()];
        store.insert_course(
            Course {
                course_id: "course-v1:edX+Broken+2026".to_string(),
                display_name: "Broken".to_string(),
                root: "broken".to_string(),
                upgrade_url: None,
            },
            vec![broken],
        );

        let failure = store.heartbeat().unwrap_err();
        assert!(failure.message.contains("ghost"));

        let broken = store.get_item("broken").unwrap();
        assert!(store.get_children(&broken).is_empty());
    }
}
