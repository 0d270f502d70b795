//! YAML course catalog used to seed the in-memory stores
//!
//! ```yaml
//! users:
//!   - { id: 1, username: audit_learner }
//! courses:
//!   - course_id: course-v1:edX+DemoX+2026
//!     display_name: Demo Course
//!     root:
//!       usage_key: block-v1:edX+DemoX+2026+type@course+block@course
//!       category: course
//!       children: [...]
//! enrollments:
//!   - { username: audit_learner, course_id: course-v1:edX+DemoX+2026, mode: audit, created: 2026-01-05T00:00:00Z }
//! masquerades: []
//! ```

use crate::content::{merge_group_access, validate_course_id, ContentBlock, Course, GroupAccess, InMemoryModuleStore};
use crate::error::{AppError, Result};
use crate::gating::{Enrollment, EnrollmentMode, InMemoryEnrollments, InMemoryMasquerades, Masquerade};
use crate::models::{User, UserDirectory};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub courses: Vec<CourseSpec>,
    #[serde(default)]
    pub enrollments: Vec<EnrollmentSpec>,
    #[serde(default)]
    pub masquerades: Vec<MasqueradeSpec>,
}

#[derive(Debug, Deserialize)]
pub struct CourseSpec {
    pub course_id: String,
    pub display_name: String,
    #[serde(default)]
    pub upgrade_url: Option<String>,
    pub root: BlockSpec,
}

/// A block as written in the catalog, with its children nested inline.
#[derive(Debug, Deserialize)]
pub struct BlockSpec {
    pub usage_key: String,
    pub category: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub graded: bool,
    #[serde(default)]
    pub has_score: bool,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub group_access: GroupAccess,
    #[serde(default)]
    pub children: Vec<BlockSpec>,
}

#[derive(Debug, Deserialize)]
pub struct EnrollmentSpec {
    pub username: String,
    pub course_id: String,
    pub mode: EnrollmentMode,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct MasqueradeSpec {
    pub username: String,
    pub course_id: String,
    #[serde(flatten)]
    pub masquerade: Masquerade,
}

/// Stores populated from a catalog.
#[derive(Clone, Default)]
pub struct CatalogStores {
    pub module_store: InMemoryModuleStore,
    pub users: UserDirectory,
    pub enrollments: InMemoryEnrollments,
    pub masquerades: InMemoryMasquerades,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Catalog(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn into_stores(self) -> Result<CatalogStores> {
        let stores = CatalogStores::default();
        let mut users_by_name: HashMap<String, User> = HashMap::new();
        let mut course_ids: HashSet<String> = HashSet::new();
        let mut usage_keys: HashSet<String> = HashSet::new();

        for user in self.users {
            if users_by_name.contains_key(&user.username) {
                return Err(AppError::Catalog(format!("Duplicate user {}", user.username)));
            }
            users_by_name.insert(user.username.clone(), user.clone());
            stores.users.insert(user);
        }

        for course in self.courses {
            validate_course_id(&course.course_id)?;
            if !course_ids.insert(course.course_id.clone()) {
                return Err(AppError::Catalog(format!("Duplicate course {}", course.course_id)));
            }

            let root = course.root.usage_key.clone();
            let mut blocks = Vec::new();
            flatten_block(course.root, &GroupAccess::new(), &mut usage_keys, &mut blocks)?;
            let block_count = blocks.len();

            stores.module_store.insert_course(
                Course {
                    course_id: course.course_id.clone(),
                    display_name: course.display_name,
                    root,
                    upgrade_url: course.upgrade_url,
                },
                blocks,
            );
            info!("Loaded course {} with {} blocks", course.course_id, block_count);
        }

        for enrollment in self.enrollments {
            let user = lookup(&users_by_name, &enrollment.username)?;
            stores.enrollments.enroll(Enrollment {
                user_id: user.id,
                course_id: enrollment.course_id,
                mode: enrollment.mode,
                created: enrollment.created,
            });
        }

        for spec in self.masquerades {
            let user = lookup(&users_by_name, &spec.username)?;
            stores.masquerades.set(user, &spec.course_id, spec.masquerade)?;
        }

        Ok(stores)
    }
}

fn lookup<'a>(users: &'a HashMap<String, User>, username: &str) -> Result<&'a User> {
    users
        .get(username)
        .ok_or_else(|| AppError::Catalog(format!("Unknown user {}", username)))
}

/// Pre-order flattening; the parent is pushed before its descendants.
///
/// Usage keys are unique across the whole catalog.
fn flatten_block(
    spec: BlockSpec,
    inherited: &GroupAccess,
    seen: &mut HashSet<String>,
    out: &mut Vec<ContentBlock>,
) -> Result<()> {
    if !seen.insert(spec.usage_key.clone()) {
        return Err(AppError::Catalog(format!("Duplicate usage key {}", spec.usage_key)));
    }

    let merged = merge_group_access(inherited, &spec.group_access);
    let BlockSpec {
        usage_key,
        category,
        display_name,
        graded,
        has_score,
        weight,
        children,
        ..
    } = spec;

    out.push(ContentBlock {
        display_name: display_name.unwrap_or_else(|| usage_key.clone()),
        usage_key,
        category,
        children: children.iter().map(|child| child.usage_key.clone()).collect(),
        graded,
        has_score,
        weight,
        merged_group_access: merged.clone(),
    });

    for child in children {
        flatten_block(child, &merged, seen, out)?;
    }

    Ok(())
}
