//! Known assignees
//!
//! The set is kept sorted case-insensitively and always contains
//! [`UNASSIGNED`], which cannot be removed. Tasks refer to users by name
//! only, so a deleted user's tasks must be reassigned by the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::task::UNASSIGNED;

#[derive(Debug, Error, PartialEq)]
pub enum UserError {
    #[error("User name cannot be empty")]
    EmptyName,

    #[error("User \"{0}\" already exists")]
    Duplicate(String),

    #[error("Cannot delete the 'Unassigned' user")]
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct UserSet {
    names: Vec<String>,
}

impl Default for UserSet {
    fn default() -> Self {
        Self::from(Vec::new())
    }
}

impl From<Vec<String>> for UserSet {
    fn from(names: Vec<String>) -> Self {
        let mut set = Self { names: Vec::new() };
        for name in names {
            let name = name.trim();
            if !name.is_empty() && !set.contains(name) {
                set.names.push(name.to_string());
            }
        }
        if !set.contains(UNASSIGNED) {
            set.names.push(UNASSIGNED.to_string());
        }
        set.sort();
        set
    }
}

impl From<UserSet> for Vec<String> {
    fn from(set: UserSet) -> Self {
        set.names
    }
}

impl UserSet {
    /// Team used by the demo project
    pub fn sample() -> Self {
        Self::from(
            [
                "Alice", "Bob", "Charlie", "Dev Team", "Diana", "Eve", "Frank", "Grace",
            ]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>(),
        )
    }

    fn sort(&mut self) {
        self.names
            .sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Returns true if tasks assigned to `name` point at a current user
    pub fn is_known(&self, name: &str) -> bool {
        self.contains(name)
    }

    /// Adds a user, keeping the set sorted
    pub fn add(&mut self, name: &str) -> Result<(), UserError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UserError::EmptyName);
        }
        if self.contains(name) {
            return Err(UserError::Duplicate(name.to_string()));
        }
        self.names.push(name.to_string());
        self.sort();
        Ok(())
    }

    /// Removes a user. Returns false if there was no such user.
    pub fn remove(&mut self, name: &str) -> Result<bool, UserError> {
        if name == UNASSIGNED {
            return Err(UserError::Protected);
        }
        let before = self.names.len();
        self.names.retain(|n| n != name);
        Ok(self.names.len() != before)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_contains_unassigned() {
        let set = UserSet::default();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![UNASSIGNED]);
    }

    #[test]
    fn sorted_case_insensitively() {
        let mut set = UserSet::default();
        set.add("bob").unwrap();
        set.add("Alice").unwrap();
        set.add("carol").unwrap();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec!["Alice", "bob", "carol", "Unassigned"]
        );
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        let mut set = UserSet::sample();
        assert_eq!(set.add("  "), Err(UserError::EmptyName));
        assert_eq!(set.add("Alice"), Err(UserError::Duplicate("Alice".into())));
    }

    #[test]
    fn unassigned_is_protected() {
        let mut set = UserSet::sample();
        assert_eq!(set.remove(UNASSIGNED), Err(UserError::Protected));
        assert_eq!(set.remove("Eve"), Ok(true));
        assert_eq!(set.remove("Eve"), Ok(false));
        assert!(!set.is_known("Eve"));
    }

    #[test]
    fn deserializing_restores_invariants() {
        let set: UserSet = serde_json::from_str(r#"["Zed", "amy", "Zed", ""]"#).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["amy", "Unassigned", "Zed"]);
    }
}
