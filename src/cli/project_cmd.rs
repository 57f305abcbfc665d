//! Project CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::ProjectId;
use crate::storage::Workspace;

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects
    List,

    /// Create a project and make it active
    New {
        /// Project name
        name: String,
    },

    /// Rename a project
    Rename {
        /// Project ID (e.g. p2)
        id: ProjectId,

        /// New name
        name: String,
    },

    /// Delete a project and its tasks
    Delete {
        /// Project ID (e.g. p2)
        id: ProjectId,
    },

    /// Make a project active
    Switch {
        /// Project ID (e.g. p2)
        id: ProjectId,
    },
}

pub fn run(cmd: ProjectCommands, output: &Output) -> Result<()> {
    match cmd {
        ProjectCommands::List => list_projects(output),
        ProjectCommands::New { name } => create_project(output, &name),
        ProjectCommands::Rename { id, name } => rename_project(output, id, &name),
        ProjectCommands::Delete { id } => delete_project(output, id),
        ProjectCommands::Switch { id } => switch_project(output, id),
    }
}

fn list_projects(output: &Output) -> Result<()> {
    let portfolio = Workspace::open_current()?.load()?;

    if output.is_json() {
        let projects: Vec<_> = portfolio
            .projects()
            .iter()
            .map(|p| {
                serde_json::json!({
                    "id": p.id,
                    "name": p.name,
                    "tasks": p.tasks.len(),
                    "active": portfolio.active == Some(p.id),
                })
            })
            .collect();
        output.data(&projects);
        return Ok(());
    }

    if portfolio.projects().is_empty() {
        println!("No projects. Create one with 'gantt project new'.");
        return Ok(());
    }

    println!("{:<2} {:<6} {:<40} {:>6}", "", "ID", "NAME", "TASKS");
    println!("{}", "-".repeat(60));
    for project in portfolio.projects() {
        let marker = if portfolio.active == Some(project.id) { "*" } else { "" };
        println!(
            "{:<2} {:<6} {:<40} {:>6}",
            marker,
            project.id.to_string(),
            project.name,
            project.tasks.len()
        );
    }

    Ok(())
}

fn create_project(output: &Output, name: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let id = workspace.update(|portfolio| Ok(portfolio.create_project(name)?))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "name": name.trim(),
        }));
    } else {
        output.success(&format!("Created project {}: {}", id, name.trim()));
    }
    Ok(())
}

fn rename_project(output: &Output, id: ProjectId, name: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    workspace.update(|portfolio| Ok(portfolio.rename_project(id, name)?))?;

    output.success(&format!("Renamed project {} to {}", id, name.trim()));
    Ok(())
}

fn delete_project(output: &Output, id: ProjectId) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let (removed, active) = workspace.update(|portfolio| {
        let removed = portfolio.delete_project(id)?;
        Ok((removed, portfolio.active))
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "deleted": id,
            "tasks": removed.tasks.len(),
            "active": active,
        }));
        return Ok(());
    }

    output.success(&format!("Deleted project {}: {}", id, removed.name));
    match active {
        Some(active) => println!("Active project: {}", active),
        None => println!("No projects left. Create one with 'gantt project new'."),
    }
    Ok(())
}

fn switch_project(output: &Output, id: ProjectId) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let name = workspace.update(|portfolio| {
        portfolio.switch(id)?;
        Ok(portfolio.project(id)?.name.clone())
    })?;

    output.success(&format!("Switched to project {}: {}", id, name));
    Ok(())
}
