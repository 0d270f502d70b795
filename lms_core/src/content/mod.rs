pub mod block;
pub mod course;
pub mod store;
pub mod tree;

pub use block::{merge_group_access, ContentBlock, GroupAccess};
pub use course::{validate_course_id, Course};
pub use store::{InMemoryModuleStore, ModuleStore};
pub use tree::{leaf_filter, traverse_pre_order, PreOrder};
