//! Projects, users and the shared calendar
//!
//! A [`Portfolio`] is everything one workspace holds: the projects, which of
//! them is active, the user set, and the workday set the stored end dates
//! were computed under.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::calendar::{business_days_between, shift_days, Workdays};
use super::id::{ProjectId, TaskId};
use super::store::TaskStore;
use super::task::{Task, TaskKind, UNASSIGNED};
use super::users::{UserError, UserSet};

#[derive(Debug, Error, PartialEq)]
pub enum PortfolioError {
    #[error("Project name cannot be empty")]
    EmptyName,

    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("No active project. Create one with 'gantt project new <name>'")]
    NoActiveProject,

    #[error(transparent)]
    User(#[from] UserError),
}

fn first_task_id() -> TaskId {
    TaskId::new(1)
}

/// A named, ordered collection of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default = "first_task_id")]
    pub next_task_id: TaskId,
}

impl Project {
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tasks: Vec::new(),
            next_task_id: first_task_id(),
        }
    }

    /// Opens a store over a copy of this project's tasks
    pub fn store(&self, workdays: Workdays) -> TaskStore {
        TaskStore::load(self.tasks.clone(), self.next_task_id, workdays)
    }

    /// Writes a store's state back into the project
    pub fn commit(&mut self, store: TaskStore) {
        let (tasks, next_task_id) = store.into_parts();
        self.tasks = tasks;
        self.next_task_id = next_task_id;
    }
}

fn first_project_id() -> ProjectId {
    ProjectId::new(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub active: Option<ProjectId>,
    #[serde(default = "first_project_id")]
    pub next_project_id: ProjectId,
    #[serde(default)]
    pub users: UserSet,
    /// Workdays the stored end dates were computed under
    #[serde(default)]
    pub workdays: Workdays,
}

impl Default for Portfolio {
    fn default() -> Self {
        Self {
            projects: Vec::new(),
            active: None,
            next_project_id: first_project_id(),
            users: UserSet::default(),
            workdays: Workdays::default(),
        }
    }
}

impl Portfolio {
    /// Portfolio with a single empty, active project
    pub fn with_project(name: &str, workdays: Workdays) -> Result<Self, PortfolioError> {
        let mut portfolio = Self {
            workdays,
            ..Self::default()
        };
        portfolio.create_project(name)?;
        Ok(portfolio)
    }

    /// Demo portfolio: a website redesign laid out relative to `today` and
    /// an empty second project
    pub fn sample(today: NaiveDate) -> Self {
        let workdays = Workdays::default();
        let day = |offset: i64| shift_days(today, offset);

        let task = |id: u64, name: &str, assignee: &str, span: (i64, i64), color: &str, deps: &[u64]| {
            let (start, end) = (day(span.0), day(span.1));
            let mut t = Task::new_task(
                TaskId::new(id),
                name,
                start,
                end,
                business_days_between(start, end, &workdays),
            );
            t.assignee = assignee.to_string();
            t.color = Some(color.to_string());
            t.dependencies = deps.iter().copied().map(TaskId::new).collect();
            t
        };
        let group = |id: u64, name: &str, assignee: &str, collapsed: bool, deps: &[u64]| {
            let mut g = Task::new_group(TaskId::new(id), name, today);
            g.assignee = assignee.to_string();
            g.kind = TaskKind::Group { collapsed };
            g.dependencies = deps.iter().copied().map(TaskId::new).collect();
            g
        };
        let within = |mut t: Task, parent: u64| {
            t.parent_id = Some(TaskId::new(parent));
            t
        };

        let tasks = vec![
            task(1, "Project Kick-off Meeting", "Alice", (0, 0), "#3B82F6", &[]),
            task(2, "Requirement Gathering", "Bob", (1, 3), "#10B981", &[1]),
            group(3, "UI/UX Design Phase", "Charlie", false, &[2]),
            within(task(31, "Wireframing", "Charlie", (4, 6), "#F59E0B", &[]), 3),
            within(task(32, "High-Fidelity Mockups", "Charlie", (7, 9), "#F59E0B", &[31]), 3),
            group(4, "Development Phase", "Dev Team", true, &[3]),
            within(task(41, "Frontend Development", "Diana", (10, 20), "#8B5CF6", &[]), 4),
            within(task(42, "Backend Development", "Eve", (10, 22), "#6366F1", &[]), 4),
            within(task(43, "API Integration", "Diana", (21, 24), "#EC4899", &[41, 42]), 4),
            task(5, "Testing & QA", "Frank", (25, 30), "#F97316", &[43]),
            task(6, "Deployment to Staging", "Grace", (31, 32), "#06B6D4", &[5]),
        ];

        let mut website = Project::new(ProjectId::new(1), "Website Redesign");
        website.tasks = tasks;
        website.next_task_id = TaskId::new(44);

        Self {
            projects: vec![website, Project::new(ProjectId::new(2), "Mobile App Launch")],
            active: Some(ProjectId::new(1)),
            next_project_id: ProjectId::new(3),
            users: UserSet::sample(),
            workdays,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: ProjectId) -> Result<&Project, PortfolioError> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .ok_or(PortfolioError::ProjectNotFound(id))
    }

    pub fn project_mut(&mut self, id: ProjectId) -> Result<&mut Project, PortfolioError> {
        self.projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(PortfolioError::ProjectNotFound(id))
    }

    pub fn active_project(&self) -> Result<&Project, PortfolioError> {
        let id = self.active.ok_or(PortfolioError::NoActiveProject)?;
        self.project(id)
    }

    pub fn active_project_mut(&mut self) -> Result<&mut Project, PortfolioError> {
        let id = self.active.ok_or(PortfolioError::NoActiveProject)?;
        self.project_mut(id)
    }

    /// Creates an empty project and makes it active
    pub fn create_project(&mut self, name: &str) -> Result<ProjectId, PortfolioError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PortfolioError::EmptyName);
        }

        let highest = self.projects.iter().map(|p| p.id).max();
        let id = match highest {
            Some(h) if h >= self.next_project_id => h.next(),
            _ => self.next_project_id,
        };
        self.next_project_id = id.next();

        self.projects.push(Project::new(id, name));
        self.active = Some(id);
        Ok(id)
    }

    pub fn rename_project(&mut self, id: ProjectId, name: &str) -> Result<(), PortfolioError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PortfolioError::EmptyName);
        }
        self.project_mut(id)?.name = name.to_string();
        Ok(())
    }

    /// Deletes a project. If it was active, the first remaining project
    /// becomes active (none if it was the last).
    pub fn delete_project(&mut self, id: ProjectId) -> Result<Project, PortfolioError> {
        let index = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or(PortfolioError::ProjectNotFound(id))?;
        let removed = self.projects.remove(index);

        if self.active == Some(id) {
            self.active = self.projects.first().map(|p| p.id);
        }
        Ok(removed)
    }

    pub fn switch(&mut self, id: ProjectId) -> Result<(), PortfolioError> {
        self.project(id)?;
        self.active = Some(id);
        Ok(())
    }

    pub fn add_user(&mut self, name: &str) -> Result<(), PortfolioError> {
        Ok(self.users.add(name)?)
    }

    /// Deletes a user and hands every task they held, in every project, to
    /// "Unassigned". Returns the number of reassigned tasks.
    pub fn delete_user(&mut self, name: &str) -> Result<usize, PortfolioError> {
        self.users.remove(name)?;

        let workdays = self.workdays;
        let mut reassigned = 0;
        for project in &mut self.projects {
            let mut store = project.store(workdays);
            reassigned += store.reassign(name, UNASSIGNED);
            project.commit(store);
        }
        Ok(reassigned)
    }

    /// Switches the workday set and re-derives end dates in every project
    pub fn apply_workdays(&mut self, workdays: Workdays) {
        for project in &mut self.projects {
            let mut store = project.store(self.workdays);
            store.set_workdays(workdays);
            project.commit(store);
        }
        self.workdays = workdays;
    }

    /// Runs load-time repairs over every project and makes sure the active
    /// project exists
    pub fn repair(&mut self) {
        let workdays = self.workdays;
        for project in &mut self.projects {
            let store = project.store(workdays);
            project.commit(store);
        }

        let active_exists = self
            .active
            .map_or(false, |id| self.projects.iter().any(|p| p.id == id));
        if !active_exists {
            self.active = self.projects.first().map(|p| p.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hierarchy::Hierarchy;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn sample_has_two_projects() {
        let portfolio = Portfolio::sample(today());
        assert_eq!(portfolio.projects().len(), 2);
        assert_eq!(portfolio.active_project().unwrap().name, "Website Redesign");
        assert_eq!(portfolio.users.len(), 9);
    }

    #[test]
    fn sample_hierarchy_hides_collapsed_development_phase() {
        let portfolio = Portfolio::sample(today());
        let project = portfolio.active_project().unwrap();
        let hierarchy = Hierarchy::derive(&project.tasks);

        let ids: Vec<u64> = hierarchy.rows().iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 31, 32, 4, 5, 6]);

        let dev = hierarchy.get(TaskId::new(4)).unwrap();
        assert_eq!(dev.span.start, shift_days(today(), 10));
        assert_eq!(dev.span.end, shift_days(today(), 24));
    }

    #[test]
    fn sample_is_stable_under_repair() {
        let mut portfolio = Portfolio::sample(NaiveDate::from_ymd_opt(2024, 6, 8).unwrap());
        let before = portfolio.clone();
        portfolio.repair();
        assert_eq!(portfolio, before);
    }

    #[test]
    fn create_project_trims_and_activates() {
        let mut portfolio = Portfolio::sample(today());
        let id = portfolio.create_project("  Launch  ").unwrap();

        assert_eq!(id, ProjectId::new(3));
        assert_eq!(portfolio.active, Some(id));
        assert_eq!(portfolio.project(id).unwrap().name, "Launch");
        assert_eq!(portfolio.create_project("   "), Err(PortfolioError::EmptyName));
    }

    #[test]
    fn deleting_active_project_falls_back_to_first() {
        let mut portfolio = Portfolio::sample(today());
        portfolio.switch(ProjectId::new(2)).unwrap();
        portfolio.delete_project(ProjectId::new(2)).unwrap();
        assert_eq!(portfolio.active, Some(ProjectId::new(1)));

        portfolio.delete_project(ProjectId::new(1)).unwrap();
        assert_eq!(portfolio.active, None);
        assert_eq!(
            portfolio.active_project().unwrap_err(),
            PortfolioError::NoActiveProject
        );
    }

    #[test]
    fn rename_and_switch_check_ids() {
        let mut portfolio = Portfolio::sample(today());
        portfolio.rename_project(ProjectId::new(2), "Mobile").unwrap();
        assert_eq!(portfolio.project(ProjectId::new(2)).unwrap().name, "Mobile");
        assert_eq!(
            portfolio.switch(ProjectId::new(9)),
            Err(PortfolioError::ProjectNotFound(ProjectId::new(9)))
        );
    }

    #[test]
    fn deleting_user_reassigns_tasks() {
        let mut portfolio = Portfolio::sample(today());
        let reassigned = portfolio.delete_user("Diana").unwrap();

        assert_eq!(reassigned, 2);
        assert!(!portfolio.users.contains("Diana"));
        let project = portfolio.active_project().unwrap();
        assert!(project.tasks.iter().all(|t| t.assignee != "Diana"));
    }

    #[test]
    fn unassigned_cannot_be_deleted() {
        let mut portfolio = Portfolio::sample(today());
        assert_eq!(
            portfolio.delete_user(UNASSIGNED),
            Err(PortfolioError::User(UserError::Protected))
        );
    }

    #[test]
    fn apply_workdays_updates_every_project() {
        let mut portfolio = Portfolio::sample(today());
        let second = portfolio.create_project("Second").unwrap();
        let mut store = portfolio.project(second).unwrap().store(portfolio.workdays);
        // Thursday start: Thu, Fri, Mon, Tue, Wed under the default set
        let added = store.add_task(shift_days(today(), 3));
        portfolio.project_mut(second).unwrap().commit(store);

        portfolio.apply_workdays(Workdays::ALL);

        assert_eq!(portfolio.workdays, Workdays::ALL);
        let task = portfolio
            .project(second)
            .unwrap()
            .tasks
            .iter()
            .find(|t| t.id == added)
            .unwrap();
        assert_eq!(task.end, shift_days(today(), 7));
    }

    #[test]
    fn repair_picks_an_active_project() {
        let mut portfolio = Portfolio::sample(today());
        portfolio.active = Some(ProjectId::new(77));
        portfolio.repair();
        assert_eq!(portfolio.active, Some(ProjectId::new(1)));
    }
}
