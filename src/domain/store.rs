//! In-memory task store for one project
//!
//! [`TaskStore`] is the only place tasks are mutated. It keeps the flat,
//! parent-linked sequence of tasks and groups consistent after every
//! operation:
//!
//! - task durations always match their dates under the active [`Workdays`]
//! - parent links point at existing groups and never form a cycle
//! - deleting a group takes all of its transitive descendants with it
//!
//! Sequence order matters: it is the sibling order shown in the chart and
//! the basis for row numbers.
//!
//! Cycle prevention and cascade delete share one parent-chain walk
//! ([`TaskStore::ancestors`]).

use std::collections::HashSet;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use super::calendar::{
    business_days_between, end_date_from_duration, next_workday, shift_days, Workdays,
};
use super::id::TaskId;
use super::task::{Task, TaskKind, TaskPatch};

/// Business days given to a freshly added task
pub const DEFAULT_TASK_DURATION: u32 = 5;

/// Upper bound for a requested duration (roughly a century of weekdays)
pub const MAX_DURATION: i64 = 26_000;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Cannot move group {group} into its own descendant {target}")]
    WouldCycle { group: TaskId, target: TaskId },

    #[error("End date {end} is before start date {start} for task {id}")]
    EndBeforeStart {
        id: TaskId,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Dates of group {0} are derived from its children and cannot be edited")]
    DerivedDates(TaskId),
}

/// Result of a reorder request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reorder {
    /// Nothing to do (same task, or an id was not found)
    Unchanged,
    /// The dragged task now sits at `index` under `parent`
    Moved {
        parent: Option<TaskId>,
        index: usize,
    },
}

/// Parent chain of a task, nearest first
struct ParentChain {
    ids: Vec<TaskId>,
    /// The walk came back to the starting task
    loops: bool,
}

/// Owner of a project's tasks
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    workdays: Workdays,
    next_id: TaskId,
    new_task_duration: u32,
}

impl TaskStore {
    /// Creates an empty store
    pub fn new(workdays: Workdays) -> Self {
        Self {
            tasks: Vec::new(),
            workdays,
            next_id: TaskId::new(1),
            new_task_duration: DEFAULT_TASK_DURATION,
        }
    }

    /// Builds a store from persisted tasks, repairing anything that breaks
    /// the store's invariants. Every repair is logged.
    pub fn load(tasks: Vec<Task>, next_id: TaskId, workdays: Workdays) -> Self {
        let highest = tasks.iter().map(|t| t.id).max();
        let next_id = match highest {
            Some(id) if id >= next_id => id.next(),
            _ => next_id,
        };

        let mut store = Self {
            tasks,
            workdays,
            next_id,
            new_task_duration: DEFAULT_TASK_DURATION,
        };
        store.repair_ids();
        store.repair_schedules();
        store.repair_parents();
        store
    }

    /// Sets the business-day duration given to new tasks (at least 1)
    pub fn with_new_task_duration(mut self, duration: u32) -> Self {
        self.new_task_duration = duration.max(1);
        self
    }

    /// Splits the store back into its tasks and id counter
    pub fn into_parts(self) -> (Vec<Task>, TaskId) {
        (self.tasks, self.next_id)
    }

    /// All tasks in sequence order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Active workday set
    pub fn workdays(&self) -> &Workdays {
        &self.workdays
    }

    /// Id the next added task or group will receive
    pub fn next_id(&self) -> TaskId {
        self.next_id
    }

    /// Gets a task by ID
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Position of a task in the sequence
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn allocate_id(&mut self) -> TaskId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    fn parent_chain(&self, id: TaskId) -> ParentChain {
        let mut ids = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.get(id).and_then(|t| t.parent_id);

        while let Some(parent_id) = current {
            if parent_id == id {
                return ParentChain { ids, loops: true };
            }
            if !seen.insert(parent_id) {
                break;
            }
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            ids.push(parent_id);
            current = parent.parent_id;
        }

        ParentChain { ids, loops: false }
    }

    /// Existing ancestors of a task, nearest first
    pub fn ancestors(&self, id: TaskId) -> Vec<TaskId> {
        self.parent_chain(id).ids
    }

    /// Returns true if `id` sits somewhere below `ancestor`
    pub fn is_descendant(&self, ancestor: TaskId, id: TaskId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// All transitive descendants of a task, in sequence order
    pub fn descendants(&self, id: TaskId) -> Vec<TaskId> {
        self.tasks
            .iter()
            .filter(|t| self.is_descendant(id, t.id))
            .map(|t| t.id)
            .collect()
    }

    /// Direct children of a task, in sequence order
    pub fn children(&self, id: TaskId) -> Vec<TaskId> {
        self.tasks
            .iter()
            .filter(|t| t.parent_id == Some(id))
            .map(|t| t.id)
            .collect()
    }

    /// Appends a task lasting the default duration.
    ///
    /// It starts on the first workday after the latest task end, or on the
    /// first workday from `today` when the project has no tasks yet. Group
    /// dates are placeholders and are not considered.
    pub fn add_task(&mut self, today: NaiveDate) -> TaskId {
        let proposed = self
            .tasks
            .iter()
            .filter(|t| t.is_task())
            .map(|t| t.end)
            .max()
            .map(|end| shift_days(end, 1))
            .unwrap_or(today);

        let start = next_workday(proposed, &self.workdays);
        let duration = self.new_task_duration;
        let end = end_date_from_duration(start, i64::from(duration), &self.workdays);

        let id = self.allocate_id();
        self.tasks
            .push(Task::new_task(id, "New Task", start, end, duration));
        debug!(%id, %start, %end, "added task");
        id
    }

    /// Appends an expanded group; its dates are placeholders until derived
    pub fn add_group(&mut self, today: NaiveDate) -> TaskId {
        let id = self.allocate_id();
        self.tasks.push(Task::new_group(id, "New Group", today));
        debug!(%id, "added group");
        id
    }

    /// Applies a partial update.
    ///
    /// For tasks, a duration that differs from the stored one drives the
    /// edit: it is clamped to at least 1 and the end date is recomputed from
    /// the start. Otherwise supplied dates drive and the duration is
    /// recomputed from them. Duration wins when both are supplied.
    ///
    /// Returns `Ok(false)` if no task has that id. On error the store is
    /// unchanged.
    pub fn update(&mut self, id: TaskId, patch: TaskPatch) -> Result<bool, StoreError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        let mut next = self.tasks[index].clone();
        let dates_supplied = patch.start.is_some() || patch.end.is_some();

        match next.kind {
            TaskKind::Group { collapsed } => {
                if patch.touches_schedule() {
                    return Err(StoreError::DerivedDates(id));
                }
                next.kind = TaskKind::Group {
                    collapsed: patch.collapsed.unwrap_or(collapsed),
                };
            }
            TaskKind::Task { duration } => {
                if let Some(start) = patch.start {
                    next.start = start;
                }
                if let Some(end) = patch.end {
                    next.end = end;
                }

                match patch.duration {
                    Some(requested) if requested != i64::from(duration) => {
                        let duration = requested.clamp(1, MAX_DURATION);
                        next.end = end_date_from_duration(next.start, duration, &self.workdays);
                        next.kind = TaskKind::Task {
                            duration: duration as u32,
                        };
                    }
                    _ if dates_supplied => {
                        if next.end < next.start {
                            return Err(StoreError::EndBeforeStart {
                                id,
                                start: next.start,
                                end: next.end,
                            });
                        }
                        next.kind = TaskKind::Task {
                            duration: business_days_between(next.start, next.end, &self.workdays),
                        };
                    }
                    _ => {}
                }
            }
        }

        if let Some(name) = patch.name {
            next.name = name;
        }
        if let Some(assignee) = patch.assignee {
            next.assignee = assignee;
        }
        if let Some(color) = patch.color {
            next.color = Some(color);
        }
        if let Some(dependencies) = patch.dependencies {
            next.dependencies = dependencies;
        }

        self.tasks[index] = next;
        debug!(%id, "updated task");
        Ok(true)
    }

    /// Removes a task and all of its transitive descendants, whether or not
    /// they are currently visible. Returns the removed ids in sequence order.
    pub fn delete(&mut self, id: TaskId) -> Vec<TaskId> {
        if self.get(id).is_none() {
            return Vec::new();
        }

        let mut doomed: HashSet<TaskId> = self.descendants(id).into_iter().collect();
        doomed.insert(id);

        let removed: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|t| doomed.contains(&t.id))
            .map(|t| t.id)
            .collect();

        self.tasks.retain(|t| !doomed.contains(&t.id));
        debug!(%id, count = removed.len(), "deleted tasks");
        removed
    }

    /// Moves `dragged` relative to `target`.
    ///
    /// Dropped on a group, the task becomes that group's child and is placed
    /// right after the group. Dropped on a task, it becomes the target's
    /// sibling and is placed right before it. Moving a group into its own
    /// subtree is rejected and leaves the store untouched.
    pub fn reorder(&mut self, dragged: TaskId, target: TaskId) -> Result<Reorder, StoreError> {
        if dragged == target {
            return Ok(Reorder::Unchanged);
        }

        let (Some(dragged_task), Some(target_task)) = (self.get(dragged), self.get(target)) else {
            return Ok(Reorder::Unchanged);
        };

        if dragged_task.is_group() && self.is_descendant(dragged, target) {
            warn!(group = %dragged, %target, "rejected move of a group into its own descendant");
            return Err(StoreError::WouldCycle {
                group: dragged,
                target,
            });
        }

        let target_is_group = target_task.is_group();
        let target_parent = target_task.parent_id;

        let Some(from) = self.position(dragged) else {
            return Ok(Reorder::Unchanged);
        };
        let mut moved = self.tasks.remove(from);

        let target_index = self.position(target).unwrap_or(self.tasks.len());
        let (parent, index) = if target_is_group {
            (Some(target), target_index + 1)
        } else {
            (target_parent, target_index)
        };
        let index = index.min(self.tasks.len());

        moved.parent_id = parent;
        self.tasks.insert(index, moved);
        debug!(%dragged, %target, index, "reordered task");

        Ok(Reorder::Moved { parent, index })
    }

    /// Flips a group's collapse flag. Returns the new state, or `None` if
    /// the id is unknown or names a task.
    pub fn toggle_collapse(&mut self, id: TaskId) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        match task.kind {
            TaskKind::Group { collapsed } => {
                task.kind = TaskKind::Group {
                    collapsed: !collapsed,
                };
                Some(!collapsed)
            }
            TaskKind::Task { .. } => None,
        }
    }

    /// Switches the workday set. End dates are re-derived from each task's
    /// unchanged start and duration.
    pub fn set_workdays(&mut self, workdays: Workdays) {
        self.workdays = workdays;
        for task in &mut self.tasks {
            if let TaskKind::Task { duration } = task.kind {
                task.end = end_date_from_duration(task.start, i64::from(duration), &workdays);
            }
        }
        debug!(%workdays, "recomputed end dates for new workdays");
    }

    /// Reassigns every task held by `from` to `to`. Returns how many changed.
    pub fn reassign(&mut self, from: &str, to: &str) -> usize {
        let mut changed = 0;
        for task in self.tasks.iter_mut().filter(|t| t.assignee == from) {
            task.assignee = to.to_string();
            changed += 1;
        }
        changed
    }

    fn repair_ids(&mut self) {
        let mut seen = HashSet::new();
        for index in 0..self.tasks.len() {
            let id = self.tasks[index].id;
            if !seen.insert(id) {
                let fresh = self.allocate_id();
                warn!(duplicate = %id, %fresh, "renumbered task with duplicate id");
                self.tasks[index].id = fresh;
                seen.insert(fresh);
            }
        }
    }

    fn repair_schedules(&mut self) {
        let workdays = self.workdays;
        for task in &mut self.tasks {
            let TaskKind::Task { duration } = task.kind else {
                continue;
            };

            if task.end < task.start {
                warn!(id = %task.id, "task ended before it started; end reset to start");
                task.end = task.start;
            }

            if duration == 0 {
                let computed = business_days_between(task.start, task.end, &workdays);
                task.kind = TaskKind::Task { duration: computed };
                continue;
            }

            if business_days_between(task.start, task.end, &workdays) != duration {
                let expected = end_date_from_duration(task.start, i64::from(duration), &workdays);
                warn!(id = %task.id, stored = %task.end, %expected, "end date re-derived from duration");
                task.end = expected;
            }
        }
    }

    fn repair_parents(&mut self) {
        for index in 0..self.tasks.len() {
            let Some(parent_id) = self.tasks[index].parent_id else {
                continue;
            };
            let parent_is_group = self.get(parent_id).map(Task::is_group);
            if parent_is_group != Some(true) {
                warn!(id = %self.tasks[index].id, parent = %parent_id, "cleared parent that is missing or not a group");
                self.tasks[index].parent_id = None;
            }
        }

        for index in 0..self.tasks.len() {
            let id = self.tasks[index].id;
            if self.parent_chain(id).loops {
                warn!(%id, "cleared parent link that closed a cycle");
                self.tasks[index].parent_id = None;
            }
        }
    }
}
