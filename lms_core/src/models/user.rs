use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            is_staff: false,
            is_active: true,
        }
    }

    pub fn staff(id: i64, username: impl Into<String>) -> Self {
        Self {
            is_staff: true,
            ..Self::new(id, username)
        }
    }
}

/// Username lookup for request handlers.
#[derive(Clone, Default)]
pub struct UserDirectory {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.users.write().insert(user.username.clone(), user);
    }

    /// Inactive accounts resolve to `None` so they are treated as anonymous.
    pub fn get(&self, username: &str) -> Option<User> {
        self.users
            .read()
            .get(username)
            .filter(|user| user.is_active)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}
