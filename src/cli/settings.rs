//! Workday and user CLI commands

use anyhow::{bail, Result};
use clap::Subcommand;

use super::output::Output;
use crate::domain::{Workdays, UNASSIGNED};
use crate::storage::Workspace;

#[derive(Subcommand)]
pub enum WorkdaysCommands {
    /// Show the working week
    Show,

    /// Change the working week and recompute every end date
    ///
    /// Examples:
    ///   gantt workdays set mon,tue,wed,thu,fri
    ///   gantt workdays set 0,1,2,3,4
    Set {
        /// Days as names or indices (0 = Sunday), comma separated
        days: Workdays,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List users
    List,

    /// Add a user
    Add {
        /// User name
        name: String,
    },

    /// Delete a user; their tasks become unassigned
    Delete {
        /// User name
        name: String,
    },
}

pub fn run_workdays(cmd: WorkdaysCommands, output: &Output) -> Result<()> {
    match cmd {
        WorkdaysCommands::Show => {
            let workspace = Workspace::open_current()?;
            print_workdays(output, workspace.workdays());
            Ok(())
        }
        WorkdaysCommands::Set { days } => {
            let mut workspace = Workspace::open_current()?;
            workspace.set_workdays(days)?;
            print_workdays(output, days);
            Ok(())
        }
    }
}

fn print_workdays(output: &Output, workdays: Workdays) {
    if output.is_json() {
        output.data(&serde_json::json!({
            "workdays": workdays,
            "label": workdays.to_string(),
        }));
    } else {
        println!("Workdays: {}", workdays);
    }
}

pub fn run_user(cmd: UserCommands, output: &Output) -> Result<()> {
    match cmd {
        UserCommands::List => list_users(output),
        UserCommands::Add { name } => add_user(output, &name),
        UserCommands::Delete { name } => delete_user(output, &name),
    }
}

fn list_users(output: &Output) -> Result<()> {
    let portfolio = Workspace::open_current()?.load()?;

    if output.is_json() {
        output.data(&portfolio.users);
        return Ok(());
    }

    for name in portfolio.users.iter() {
        let tasks: usize = portfolio
            .projects()
            .iter()
            .flat_map(|p| &p.tasks)
            .filter(|t| t.is_task() && t.assignee == name)
            .count();
        println!("{:<24} {:>4} tasks", name, tasks);
    }
    Ok(())
}

fn add_user(output: &Output, name: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    workspace.update(|portfolio| Ok(portfolio.add_user(name)?))?;

    output.success(&format!("Added user {}", name.trim()));
    Ok(())
}

fn delete_user(output: &Output, name: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let reassigned = workspace.update(|portfolio| {
        if name != UNASSIGNED && !portfolio.users.contains(name) {
            bail!("User not found: {}", name);
        }
        Ok(portfolio.delete_user(name)?)
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "deleted": name,
            "reassigned": reassigned,
        }));
    } else {
        output.success(&format!(
            "Deleted user {} ({} tasks now {})",
            name, reassigned, UNASSIGNED
        ));
    }
    Ok(())
}
