pub mod access;
pub mod config;
pub mod enrollment;
pub mod fragment;
pub mod masquerade;
pub mod partitions;
pub mod service;


pub use access::{AccessControl, AccessDecision, PartitionAccessControl, INCORRECT_USER_GROUP, LOAD};
pub use config::{GatingConfig, SettingsGatingConfig};
pub use enrollment::{Enrollment, EnrollmentMode, EnrollmentStore, InMemoryEnrollments};
pub use fragment::Fragment;
pub use masquerade::{InMemoryMasquerades, Masquerade, MasqueradeRole, MasqueradeState};
pub use partitions::{ContentGatingPartition, Group, CONTENT_GATING_PARTITION_ID, FULL_ACCESS, LIMITED_ACCESS};
pub use service::ContentTypeGatingService;
