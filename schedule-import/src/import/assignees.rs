//! Assignee lookup
//!
//! Resolves the free-text assignee column against the API's user list by
//! name or email (case-insensitive, trimmed).

use std::collections::HashMap;

use crate::api::models::User;

#[derive(Debug, Clone, Default)]
pub struct AssigneeDirectory {
    by_key: HashMap<String, i64>,
}

impl AssigneeDirectory {
    /// Index active users by lower-cased name and email.
    ///
    /// When two users share a name the first one listed keeps it.
    pub fn from_users(users: &[User]) -> Self {
        let mut by_key = HashMap::new();

        for user in users.iter().filter(|u| u.active) {
            for key in [&user.name, &user.email] {
                let key = key.trim().to_lowercase();
                if key.is_empty() {
                    continue;
                }
                by_key.entry(key).or_insert(user.id);
            }
        }

        log::debug!("Indexed {} assignee keys", by_key.len());
        Self { by_key }
    }

    pub fn resolve(&self, value: &str) -> Option<i64> {
        self.by_key.get(&value.trim().to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
