//! Gantt CLI - A local-first project planner
//!
//! Projects hold tasks and groups scheduled in business days. Groups take
//! their dates from their children, dependencies are drawn as arrows between
//! visible rows, and every project can be summarized or exported.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Hierarchy, Portfolio, Task, TaskId, TaskStore, Workdays};
