//! Hierarchy derivation
//!
//! Turns a project's flat, parent-linked task sequence into the ordered list
//! of visible rows the chart and list views draw. Derivation is pure: it
//! never touches the store, and group dates computed here live only on the
//! derived rows.
//!
//! Steps:
//! 1. Build a tree over an index arena. A task whose parent exists is
//!    attached to it; anything else is a root. Children keep sequence order.
//! 2. Compute each group's span from its descendants (memoized per call).
//!    A childless group keeps its placeholder dates.
//! 3. Flatten depth-first, descending only into expanded groups that have
//!    children.
//! 4. Number the task rows 1..N in output order.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::id::TaskId;
use super::task::{Span, Task, TaskKind};

/// Row variant: tasks carry their duration, groups their collapse flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RowKind {
    Task { duration: u32 },
    Group { collapsed: bool },
}

impl From<TaskKind> for RowKind {
    fn from(kind: TaskKind) -> Self {
        match kind {
            TaskKind::Task { duration } => RowKind::Task { duration },
            TaskKind::Group { collapsed } => RowKind::Group { collapsed },
        }
    }
}

/// A visible row: a task plus its derived layout data.
///
/// For groups, `span` is aggregated from the descendants and can differ from
/// the dates stored on the group itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedTask {
    pub id: TaskId,
    pub name: String,
    pub assignee: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub kind: RowKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    pub dependencies: Vec<TaskId>,
    /// Nesting depth, 0 for roots
    pub level: usize,
    #[serde(flatten)]
    pub span: Span,
    /// Number of direct children, visible or not
    pub child_count: usize,
    /// 1-based label over task rows; `None` for groups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_number: Option<usize>,
}

impl ProcessedTask {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, RowKind::Group { .. })
    }

    pub fn is_task(&self) -> bool {
        matches!(self.kind, RowKind::Task { .. })
    }

    pub fn duration(&self) -> Option<u32> {
        match self.kind {
            RowKind::Task { duration } => Some(duration),
            RowKind::Group { .. } => None,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self.kind, RowKind::Group { collapsed: true })
    }
}

/// Ordered visible rows of one project snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Hierarchy {
    rows: Vec<ProcessedTask>,
}

/// Tree over indices into the task slice
struct Arena<'a> {
    tasks: &'a [Task],
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl<'a> Arena<'a> {
    fn build(tasks: &'a [Task]) -> Self {
        let mut index: HashMap<TaskId, usize> = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            index.entry(task.id).or_insert(i);
        }

        let mut children = vec![Vec::new(); tasks.len()];
        let mut roots = Vec::new();

        for (i, task) in tasks.iter().enumerate() {
            match task.parent_id.and_then(|p| index.get(&p)) {
                Some(&parent) if parent != i => children[parent].push(i),
                _ => roots.push(i),
            }
        }

        Self {
            tasks,
            children,
            roots,
        }
    }

    fn span(&self, i: usize, memo: &mut HashMap<TaskId, Span>) -> Span {
        let task = &self.tasks[i];
        if let Some(span) = memo.get(&task.id) {
            return *span;
        }

        let span = if task.is_group() && !self.children[i].is_empty() {
            self.children[i]
                .iter()
                .map(|&c| self.span(c, memo))
                .reduce(|acc, s| acc.union(&s))
                .unwrap_or_else(|| task.stored_span())
        } else {
            task.stored_span()
        };

        memo.insert(task.id, span);
        span
    }

    fn flatten(
        &self,
        i: usize,
        level: usize,
        memo: &mut HashMap<TaskId, Span>,
        out: &mut Vec<ProcessedTask>,
    ) {
        let task = &self.tasks[i];
        out.push(ProcessedTask {
            id: task.id,
            name: task.name.clone(),
            assignee: task.assignee.clone(),
            color: task.color.clone(),
            kind: task.kind.into(),
            parent_id: task.parent_id,
            dependencies: task.dependencies.clone(),
            level,
            span: self.span(i, memo),
            child_count: self.children[i].len(),
            row_number: None,
        });

        if task.is_group() && !task.is_collapsed() {
            for &child in &self.children[i] {
                self.flatten(child, level + 1, memo, out);
            }
        }
    }
}

impl Hierarchy {
    /// Derives the visible rows from a task sequence.
    ///
    /// Tasks caught in a parent cycle are unreachable from any root and are
    /// left out; stores repair such links on load.
    pub fn derive(tasks: &[Task]) -> Self {
        let arena = Arena::build(tasks);
        let mut memo = HashMap::with_capacity(tasks.len());
        let mut rows = Vec::with_capacity(tasks.len());

        for &root in &arena.roots {
            arena.flatten(root, 0, &mut memo, &mut rows);
        }

        let mut next_row = 1;
        for row in rows.iter_mut().filter(|r| r.is_task()) {
            row.row_number = Some(next_row);
            next_row += 1;
        }

        tracing::debug!(tasks = tasks.len(), rows = rows.len(), "derived hierarchy");
        Self { rows }
    }

    pub fn rows(&self) -> &[ProcessedTask] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the visible row for a task
    pub fn get(&self, id: TaskId) -> Option<&ProcessedTask> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Index of a visible row
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// Returns true if the task is currently visible
    pub fn contains(&self, id: TaskId) -> bool {
        self.position(id).is_some()
    }

    /// Row number of a visible task
    pub fn row_of(&self, id: TaskId) -> Option<usize> {
        self.get(id).and_then(|r| r.row_number)
    }

    /// Task shown under a row number
    pub fn task_at_row(&self, row: usize) -> Option<TaskId> {
        self.rows
            .iter()
            .find(|r| r.row_number == Some(row))
            .map(|r| r.id)
    }

    /// Formats dependencies as row numbers, e.g. `"2, 5"`.
    /// Dependencies that are hidden or no longer exist are skipped.
    pub fn dependency_labels(&self, dependencies: &[TaskId]) -> String {
        dependencies
            .iter()
            .filter_map(|id| self.row_of(*id))
            .map(|row| row.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parses row numbers like `"2, 5"` back into task ids.
    /// Unknown rows and non-numeric entries are dropped; an empty result
    /// means no dependencies.
    pub fn parse_dependency_rows(&self, input: &str) -> Vec<TaskId> {
        let mut seen = HashSet::new();
        input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter_map(|part| part.trim().parse::<usize>().ok())
            .filter_map(|row| self.task_at_row(row))
            .filter(|id| seen.insert(*id))
            .collect()
    }
}
