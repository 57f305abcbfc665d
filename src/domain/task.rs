//! Task domain model
//!
//! A task is either a schedulable unit of work or a group that organizes
//! other tasks. The variant is fixed at creation and carries the fields that
//! only make sense for it: tasks have a business-day duration, groups have a
//! collapse flag.
//!
//! A group's stored `start`/`end` are placeholders. Its real span is derived
//! from its descendants every time the hierarchy is built and is never
//! written back here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::id::TaskId;

/// Sentinel assignee for unowned work
pub const UNASSIGNED: &str = "Unassigned";

/// Bar color used when a task has none
pub const DEFAULT_COLOR: &str = "#3B82F6";

/// Variant of a task, serialized as `"type": "task" | "group"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskKind {
    /// Schedulable work; `duration` is its business-day count
    Task {
        #[serde(default)]
        duration: u32,
    },
    /// Container for other tasks
    Group {
        #[serde(default)]
        collapsed: bool,
    },
}

impl TaskKind {
    /// Returns a display label for the kind
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Task { .. } => "task",
            TaskKind::Group { .. } => "group",
        }
    }
}

/// Inclusive date range covered by a task or group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Span {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both
    pub fn union(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns true if the day lies inside the span
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// A task or group within a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier within the project
    pub id: TaskId,

    /// Display label
    pub name: String,

    /// User name this task is assigned to (weak reference into the user set)
    pub assignee: String,

    /// First day of the task (placeholder for groups)
    pub start: NaiveDate,

    /// Last day of the task, inclusive (placeholder for groups)
    pub end: NaiveDate,

    /// Bar color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Task or group, with variant-specific fields
    #[serde(flatten)]
    pub kind: TaskKind,

    /// Enclosing group, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,

    /// Predecessors this task must start after (display only, never shifts dates)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<TaskId>,
}

impl Task {
    /// Creates a schedulable task
    pub fn new_task(
        id: TaskId,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        duration: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            assignee: UNASSIGNED.to_string(),
            start,
            end,
            color: Some(DEFAULT_COLOR.to_string()),
            kind: TaskKind::Task { duration },
            parent_id: None,
            dependencies: Vec::new(),
        }
    }

    /// Creates an expanded group with placeholder dates
    pub fn new_group(id: TaskId, name: impl Into<String>, placeholder: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            assignee: UNASSIGNED.to_string(),
            start: placeholder,
            end: placeholder,
            color: None,
            kind: TaskKind::Group { collapsed: false },
            parent_id: None,
            dependencies: Vec::new(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, TaskKind::Group { .. })
    }

    pub fn is_task(&self) -> bool {
        matches!(self.kind, TaskKind::Task { .. })
    }

    /// Business-day duration, `None` for groups
    pub fn duration(&self) -> Option<u32> {
        match self.kind {
            TaskKind::Task { duration } => Some(duration),
            TaskKind::Group { .. } => None,
        }
    }

    /// Returns true for a collapsed group
    pub fn is_collapsed(&self) -> bool {
        matches!(self.kind, TaskKind::Group { collapsed: true })
    }

    /// Stored dates as a span (authoritative only for tasks)
    pub fn stored_span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Color to draw with, falling back to the default palette value
    pub fn color_or_default(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_COLOR)
    }
}

/// Partial update for a task; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub assignee: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Requested business-day duration; values below 1 are clamped
    pub duration: Option<i64>,
    pub color: Option<String>,
    pub dependencies: Option<Vec<TaskId>>,
    pub collapsed: Option<bool>,
}

impl TaskPatch {
    /// Moves both dates
    pub fn dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn start(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }

    pub fn end(end: NaiveDate) -> Self {
        Self {
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn duration(duration: i64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    /// Returns true if the patch sets start, end, or duration
    pub fn touches_schedule(&self) -> bool {
        self.start.is_some() || self.end.is_some() || self.duration.is_some()
    }

    /// Returns true if nothing would change
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_task_defaults() {
        let task = Task::new_task(TaskId::new(1), "Kick-off", date(2024, 6, 3), date(2024, 6, 3), 1);
        assert!(task.is_task());
        assert!(!task.is_group());
        assert_eq!(task.assignee, UNASSIGNED);
        assert_eq!(task.duration(), Some(1));
        assert_eq!(task.color_or_default(), DEFAULT_COLOR);
    }

    #[test]
    fn new_group_is_expanded() {
        let group = Task::new_group(TaskId::new(2), "Design", date(2024, 6, 3));
        assert!(group.is_group());
        assert!(!group.is_collapsed());
        assert_eq!(group.duration(), None);
        assert_eq!(group.kind.label(), "group");
    }

    #[test]
    fn task_serializes_flat_with_type_tag() {
        let mut task = Task::new_task(TaskId::new(5), "QA", date(2024, 6, 3), date(2024, 6, 7), 5);
        task.parent_id = Some(TaskId::new(4));
        task.dependencies = vec![TaskId::new(3)];

        let json: serde_json::Value = serde_json::to_value(&task).unwrap();
        assert_eq!(json["type"], "task");
        assert_eq!(json["duration"], 5);
        assert_eq!(json["parent_id"], 4);
        assert_eq!(json["start"], "2024-06-03");
        assert_eq!(json["dependencies"], serde_json::json!([3]));

        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn group_deserializes_without_optional_fields() {
        let json = r#"{"id":3,"name":"Dev","assignee":"Dev Team","start":"2024-06-03","end":"2024-06-03","type":"group","collapsed":true}"#;
        let group: Task = serde_json::from_str(json).unwrap();
        assert!(group.is_collapsed());
        assert!(group.parent_id.is_none());
        assert!(group.dependencies.is_empty());
    }

    #[test]
    fn task_without_duration_deserializes_as_zero() {
        let json = r#"{"id":1,"name":"Old","assignee":"Bob","start":"2024-06-03","end":"2024-06-05","type":"task"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.duration(), Some(0));
    }

    #[test]
    fn span_union_and_contains() {
        let a = Span::new(date(2024, 6, 3), date(2024, 6, 5));
        let b = Span::new(date(2024, 6, 1), date(2024, 6, 4));
        let u = a.union(&b);
        assert_eq!(u, Span::new(date(2024, 6, 1), date(2024, 6, 5)));
        assert!(u.contains(date(2024, 6, 5)));
        assert!(!u.contains(date(2024, 6, 6)));
    }

    #[test]
    fn patch_helpers() {
        assert!(TaskPatch::default().is_empty());
        assert!(TaskPatch::duration(3).touches_schedule());
        let patch = TaskPatch {
            name: Some("x".into()),
            ..TaskPatch::default()
        };
        assert!(!patch.touches_schedule());
        assert!(!patch.is_empty());
    }
}
