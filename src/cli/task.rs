//! Task CLI commands

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{
    edge_patch, Gesture, Hierarchy, Reorder, StoreError, Task, TaskId, TaskPatch, TaskStore,
    UserSet,
};
use crate::storage::{is_hex_color, Workspace};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task starting the day after the latest task ends
    ///
    /// Examples:
    ///   gantt task add "Write docs"
    ///   gantt task add "Review" --assignee Bob --parent 3
    Add {
        /// Task name
        name: Option<String>,

        /// Assignee (must be a known user)
        #[arg(long, short)]
        assignee: Option<String>,

        /// Group to place the task in
        #[arg(long, short)]
        parent: Option<TaskId>,

        /// Bar color as #RRGGBB
        #[arg(long)]
        color: Option<String>,
    },

    /// Add a group
    Group {
        /// Group name
        name: Option<String>,

        /// Group to nest the new group in
        #[arg(long, short)]
        parent: Option<TaskId>,
    },

    /// Edit fields of a task or group
    ///
    /// When both are given, --duration wins over --end.
    Update {
        /// Task ID
        id: TaskId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, short)]
        assignee: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD), inclusive
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Length in business days
        #[arg(long, short, allow_negative_numbers = true)]
        duration: Option<i64>,

        /// Bar color as #RRGGBB
        #[arg(long)]
        color: Option<String>,

        /// Predecessors as row numbers, e.g. "2, 5" ("" clears)
        #[arg(long)]
        deps: Option<String>,
    },

    /// Delete a task, or a group with everything inside it
    Delete {
        /// Task ID
        id: TaskId,
    },

    /// Move a row onto another row
    ///
    /// Dropping on a group puts the row first inside it; dropping on a task
    /// puts it just before that task.
    Move {
        /// Task to move
        id: TaskId,

        /// Row to drop onto
        target: TaskId,
    },

    /// Shift the dates of a task by calendar days
    Shift {
        /// Task ID
        id: TaskId,

        /// Days to shift (negative moves earlier)
        #[arg(allow_negative_numbers = true)]
        days: i64,

        /// Which dates move: start, end or both
        #[arg(long, short, default_value = "both")]
        edge: Gesture,
    },

    /// Collapse or expand a group
    Collapse {
        /// Group ID
        id: TaskId,
    },
}

pub fn run(cmd: TaskCommands, output: &Output, today: NaiveDate) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            name,
            assignee,
            parent,
            color,
        } => add_task(output, today, name, assignee, parent, color),
        TaskCommands::Group { name, parent } => add_group(output, today, name, parent),
        TaskCommands::Update {
            id,
            name,
            assignee,
            start,
            end,
            duration,
            color,
            deps,
        } => {
            let patch = TaskPatch {
                name,
                assignee,
                start,
                end,
                duration,
                color,
                ..TaskPatch::default()
            };
            update_task(output, id, patch, deps)
        }
        TaskCommands::Delete { id } => delete_task(output, id),
        TaskCommands::Move { id, target } => move_task(output, id, target),
        TaskCommands::Shift { id, days, edge } => shift_task(output, id, days, edge),
        TaskCommands::Collapse { id } => toggle_collapse(output, id),
    }
}

/// Loads the active project's tasks, runs `f` and saves the result.
/// Nothing is saved when `f` fails.
fn edit_tasks<R>(
    workspace: &Workspace,
    f: impl FnOnce(&mut TaskStore, &UserSet) -> Result<R>,
) -> Result<R> {
    let new_task_duration = workspace.config().project.schedule.new_task_duration;

    workspace.update(|portfolio| {
        let workdays = portfolio.workdays;
        let users = portfolio.users.clone();
        let project = portfolio.active_project_mut()?;

        let mut store = project
            .store(workdays)
            .with_new_task_duration(new_task_duration);
        let result = f(&mut store, &users)?;
        project.commit(store);

        Ok(result)
    })
}

fn check_assignee(users: &UserSet, assignee: &str) -> Result<()> {
    if !users.contains(assignee) {
        bail!(
            "Unknown user '{}'. Add it with 'gantt user add' first.",
            assignee
        );
    }
    Ok(())
}

fn check_color(color: &str) -> Result<()> {
    if !is_hex_color(color) {
        bail!("Invalid color '{}': expected #RRGGBB", color);
    }
    Ok(())
}

/// Moves a freshly created row into `parent`
fn place_in(store: &mut TaskStore, id: TaskId, parent: TaskId) -> Result<()> {
    match store.get(parent) {
        Some(task) if task.is_group() => {}
        Some(_) => bail!("Task {} is not a group", parent),
        None => bail!("Group not found: {}", parent),
    }
    store.reorder(id, parent)?;
    Ok(())
}

fn print_task(output: &Output, verb: &str, task: &Task) {
    if output.is_json() {
        output.data(task);
        return;
    }

    match task.duration() {
        Some(days) => output.success(&format!(
            "{} task {}: {} ({} to {}, {} days)",
            verb, task.id, task.name, task.start, task.end, days
        )),
        None => output.success(&format!("{} group {}: {}", verb, task.id, task.name)),
    }
}

fn add_task(
    output: &Output,
    today: NaiveDate,
    name: Option<String>,
    assignee: Option<String>,
    parent: Option<TaskId>,
    color: Option<String>,
) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let color = color.unwrap_or_else(|| workspace.config().project.schedule.default_color.clone());
    check_color(&color)?;

    let task = edit_tasks(&workspace, |store, users| {
        if let Some(assignee) = &assignee {
            check_assignee(users, assignee)?;
        }

        let id = store.add_task(today);
        store.update(
            id,
            TaskPatch {
                name,
                assignee,
                color: Some(color),
                ..TaskPatch::default()
            },
        )?;
        if let Some(parent) = parent {
            place_in(store, id, parent)?;
        }

        store
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))
    })?;

    print_task(output, "Created", &task);
    Ok(())
}

fn add_group(
    output: &Output,
    today: NaiveDate,
    name: Option<String>,
    parent: Option<TaskId>,
) -> Result<()> {
    let workspace = Workspace::open_current()?;

    let group = edit_tasks(&workspace, |store, _| {
        let id = store.add_group(today);
        if let Some(name) = name {
            store.update(
                id,
                TaskPatch {
                    name: Some(name),
                    ..TaskPatch::default()
                },
            )?;
        }
        if let Some(parent) = parent {
            place_in(store, id, parent)?;
        }

        store
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Group not found: {}", id))
    })?;

    print_task(output, "Created", &group);
    Ok(())
}

fn update_task(
    output: &Output,
    id: TaskId,
    mut patch: TaskPatch,
    deps: Option<String>,
) -> Result<()> {
    if let Some(color) = &patch.color {
        check_color(color)?;
    }
    if patch.is_empty() && deps.is_none() {
        bail!("Nothing to update. Pass at least one field, e.g. --name or --duration");
    }

    let workspace = Workspace::open_current()?;

    let task = edit_tasks(&workspace, |store, users| {
        if let Some(assignee) = &patch.assignee {
            check_assignee(users, assignee)?;
        }
        if let Some(deps) = &deps {
            // Row numbers refer to the rows as currently shown
            let hierarchy = Hierarchy::derive(store.tasks());
            let dependencies = hierarchy.parse_dependency_rows(deps);
            if dependencies.contains(&id) {
                bail!("Task {} cannot depend on itself", id);
            }
            patch.dependencies = Some(dependencies);
        }

        if !store.update(id, patch)? {
            bail!("Task not found: {}", id);
        }

        store
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))
    })?;

    print_task(output, "Updated", &task);
    Ok(())
}

fn delete_task(output: &Output, id: TaskId) -> Result<()> {
    let workspace = Workspace::open_current()?;

    let removed = edit_tasks(&workspace, |store, _| Ok(store.delete(id)))?;
    if removed.is_empty() {
        bail!("Task not found: {}", id);
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "deleted": removed,
        }));
    } else if removed.len() == 1 {
        output.success(&format!("Deleted {}", id));
    } else {
        output.success(&format!(
            "Deleted {} and {} nested rows",
            id,
            removed.len() - 1
        ));
    }

    Ok(())
}

fn move_task(output: &Output, id: TaskId, target: TaskId) -> Result<()> {
    let workspace = Workspace::open_current()?;

    let outcome = edit_tasks(&workspace, |store, _| {
        if store.get(id).is_none() {
            bail!("Task not found: {}", id);
        }
        if store.get(target).is_none() {
            bail!("Task not found: {}", target);
        }
        Ok(store.reorder(id, target)?)
    });

    // Cyclic moves are warnings; nothing was written
    let outcome = match outcome {
        Err(err) => match err.downcast_ref::<StoreError>() {
            Some(cycle @ StoreError::WouldCycle { .. }) => {
                output.warning(&cycle.to_string());
                return Ok(());
            }
            _ => return Err(err),
        },
        Ok(outcome) => outcome,
    };

    match outcome {
        Reorder::Unchanged => output.warning(&format!("{} was not moved", id)),
        Reorder::Moved { parent, index } => {
            if output.is_json() {
                output.data(&serde_json::json!({
                    "id": id,
                    "parent_id": parent,
                    "index": index,
                }));
            } else {
                match parent {
                    Some(parent) => output.success(&format!("Moved {} into group {}", id, parent)),
                    None => output.success(&format!("Moved {} to the top level", id)),
                }
            }
        }
    }

    Ok(())
}

fn shift_task(output: &Output, id: TaskId, days: i64, edge: Gesture) -> Result<()> {
    let workspace = Workspace::open_current()?;

    let task = edit_tasks(&workspace, |store, _| {
        let task = store
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;
        if task.is_group() {
            bail!("Group {} takes its dates from its children", id);
        }

        let Some(patch) = edge_patch(task, edge, days) else {
            return Ok(None);
        };
        store.update(id, patch)?;
        Ok(store.get(id).cloned())
    })?;

    match task {
        Some(task) => print_task(output, "Shifted", &task),
        None => output.warning(&format!("{} was not shifted", id)),
    }
    Ok(())
}

fn toggle_collapse(output: &Output, id: TaskId) -> Result<()> {
    let workspace = Workspace::open_current()?;

    let collapsed = edit_tasks(&workspace, |store, _| Ok(store.toggle_collapse(id)))?;
    let Some(collapsed) = collapsed else {
        bail!("Group not found: {}", id);
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "collapsed": collapsed,
        }));
    } else if collapsed {
        output.success(&format!("Collapsed group {}", id));
    } else {
        output.success(&format!("Expanded group {}", id));
    }

    Ok(())
}
