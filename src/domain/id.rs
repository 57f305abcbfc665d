//! Identifiers for projects and tasks
//!
//! ID Format:
//! - Task IDs: positive integers, unique within a project (e.g. `12`, also accepted as `#12`)
//! - Project IDs: positive integers, unique within a workspace (e.g. `p1`, also accepted as `1`)
//!
//! Task IDs come from a per-project counter that only moves forward, so an ID is
//! never handed out twice even after the task it named has been deleted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID: expected a positive number like '12' or '#12', got '{0}'")]
    InvalidTaskId(String),

    #[error("Invalid project ID: expected 'p{{number}}' or a number, got '{0}'")]
    InvalidProjectId(String),
}

/// Parses a positive integer, rejecting zero
fn parse_positive(s: &str) -> Option<u64> {
    match s.parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

/// Task ID within a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw numeric id
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Returns the id following this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

        parse_positive(digits)
            .map(Self)
            .ok_or_else(|| IdError::InvalidTaskId(s.to_string()))
    }
}

impl From<u64> for TaskId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Project ID within a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(u64);

impl ProjectId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl FromStr for ProjectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('p').unwrap_or(trimmed);

        parse_positive(digits)
            .map(Self)
            .ok_or_else(|| IdError::InvalidProjectId(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_parses_plain_and_hash_forms() {
        assert_eq!("12".parse::<TaskId>().unwrap(), TaskId::new(12));
        assert_eq!("#12".parse::<TaskId>().unwrap(), TaskId::new(12));
        assert_eq!(" 7 ".parse::<TaskId>().unwrap(), TaskId::new(7));
    }

    #[test]
    fn task_id_rejects_garbage() {
        assert!(matches!("".parse::<TaskId>(), Err(IdError::InvalidTaskId(_))));
        assert!(matches!("0".parse::<TaskId>(), Err(IdError::InvalidTaskId(_))));
        assert!(matches!("-3".parse::<TaskId>(), Err(IdError::InvalidTaskId(_))));
        assert!(matches!("t-1".parse::<TaskId>(), Err(IdError::InvalidTaskId(_))));
    }

    #[test]
    fn task_id_display_is_bare_number() {
        assert_eq!(TaskId::new(42).to_string(), "42");
        assert_eq!(TaskId::new(42).next(), TaskId::new(43));
    }

    #[test]
    fn project_id_roundtrip() {
        let id = ProjectId::new(3);
        assert_eq!(id.to_string(), "p3");
        assert_eq!("p3".parse::<ProjectId>().unwrap(), id);
        assert_eq!("3".parse::<ProjectId>().unwrap(), id);
        assert!("px".parse::<ProjectId>().is_err());
    }

    #[test]
    fn ids_serialize_as_numbers() {
        let json = serde_json::to_string(&TaskId::new(31)).unwrap();
        assert_eq!(json, "31");
        let back: TaskId = serde_json::from_str("31").unwrap();
        assert_eq!(back, TaskId::new(31));
    }
}
