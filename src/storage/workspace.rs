//! Workspace management
//!
//! Handles `.gantt/` initialization and keeps the stored portfolio in step
//! with the configured calendar.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::DATA_DIR;
use super::{Config, WorkspaceStore};
use crate::domain::{Portfolio, Workdays};

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not in a gantt project. Run 'gantt init' first.")]
    NotInProject,
}

const DEFAULT_CONFIG: &str = r##"# Gantt CLI configuration

[calendar]
# Working weekdays, 0 = Sunday .. 6 = Saturday
workdays = [1, 2, 3, 4, 5]

[schedule]
# Business days a new task lasts
new_task_duration = 5
default_color = "#3B82F6"
"##;

/// A `.gantt/` directory and its configuration
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens an existing workspace at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(DATA_DIR).is_dir() {
            return Err(WorkspaceError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the workspace at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(WorkspaceError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a workspace. An existing config or workspace file is
    /// left untouched; otherwise `seed` becomes the initial portfolio.
    pub fn init(root: impl Into<PathBuf>, seed: Portfolio) -> Result<Self> {
        let root = root.into();
        let data_dir = root.join(DATA_DIR);

        fs::create_dir_all(&data_dir).with_context(|| {
            format!("Failed to create {} directory: {}", DATA_DIR, data_dir.display())
        })?;

        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = data_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, "workspace.lock\n*.tmp\n").with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        let workspace = Self::open(root)?;
        let store = workspace.store();
        if !store.exists() {
            let mut seed = seed;
            let workdays = workspace.workdays();
            if seed.workdays != workdays {
                seed.apply_workdays(workdays);
            }
            store.write(&seed)?;
        }

        Ok(workspace)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .gantt directory path
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Configured workday set
    pub fn workdays(&self) -> Workdays {
        self.config.project.calendar.workdays
    }

    /// Returns the workspace store
    pub fn store(&self) -> WorkspaceStore {
        WorkspaceStore::for_project(&self.root)
    }

    /// Repairs the portfolio and re-derives end dates if the configured
    /// workdays changed since it was saved
    fn prepare(&self, portfolio: &mut Portfolio) {
        portfolio.repair();

        let workdays = self.workdays();
        if portfolio.workdays != workdays {
            tracing::info!(from = %portfolio.workdays, to = %workdays, "workdays changed; recomputing end dates");
            portfolio.apply_workdays(workdays);
        }
    }

    /// Reads the portfolio, saving it first if it was computed under an
    /// outdated workday set
    pub fn load(&self) -> Result<Portfolio> {
        let mut portfolio = self.store().read()?;

        if portfolio.workdays != self.workdays() {
            return self.update(|p| Ok(p.clone()));
        }

        self.prepare(&mut portfolio);
        Ok(portfolio)
    }

    /// Runs a mutation under the workspace lock and saves the result
    pub fn update<R>(&self, f: impl FnOnce(&mut Portfolio) -> Result<R>) -> Result<R> {
        self.store().update(|portfolio| {
            self.prepare(portfolio);
            f(portfolio)
        })
    }

    /// Changes the configured workdays and recomputes every end date
    pub fn set_workdays(&mut self, workdays: Workdays) -> Result<()> {
        self.config.project.calendar.workdays = workdays;
        self.config.save_project()?;
        self.update(|_| Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskPatch, TaskId};
    use crate::storage::ProjectConfig;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::init(dir.path(), Portfolio::default()).unwrap();

        assert!(workspace.data_dir().is_dir());
        assert!(workspace.data_dir().join("config.toml").is_file());
        assert!(workspace.data_dir().join(".gitignore").is_file());
        assert!(workspace.data_dir().join("workspace.json").is_file());
        assert_eq!(workspace.workdays(), Workdays::default());
    }

    #[test]
    fn default_config_template_matches_defaults() {
        let parsed: ProjectConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, ProjectConfig::default());
        assert_eq!(parsed.schedule.default_color, "#3B82F6");

        let dir = TempDir::new().unwrap();
        let workspace = Workspace::init(dir.path(), Portfolio::default()).unwrap();
        let written = fs::read_to_string(workspace.data_dir().join("config.toml")).unwrap();
        assert_eq!(written, DEFAULT_CONFIG);
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Workspace::init(dir.path(), Portfolio::sample(today())).unwrap();
        let again = Workspace::init(dir.path(), Portfolio::default()).unwrap();

        // The existing sample data survives a second init
        assert_eq!(again.load().unwrap().projects().len(), 2);
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Workspace::open(dir.path()).is_err());
    }

    #[test]
    fn update_saves_changes() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::init(dir.path(), Portfolio::sample(today())).unwrap();

        workspace
            .update(|portfolio| {
                let workdays = portfolio.workdays;
                let project = portfolio.active_project_mut()?;
                let mut store = project.store(workdays);
                store.update(TaskId::new(1), TaskPatch::duration(3))?;
                project.commit(store);
                Ok(())
            })
            .unwrap();

        let portfolio = workspace.load().unwrap();
        let task = &portfolio.active_project().unwrap().tasks[0];
        assert_eq!(task.duration(), Some(3));
    }

    #[test]
    fn edited_config_workdays_are_applied_on_load() {
        let dir = TempDir::new().unwrap();
        Workspace::init(dir.path(), Portfolio::sample(today())).unwrap();

        let config_path = dir.path().join(DATA_DIR).join("config.toml");
        fs::write(&config_path, "[calendar]\nworkdays = [0, 1, 2, 3, 4, 5, 6]\n").unwrap();

        let workspace = Workspace::open(dir.path()).unwrap();
        let portfolio = workspace.load().unwrap();
        assert_eq!(portfolio.workdays, Workdays::ALL);

        // Persisted, so a plain read agrees
        assert_eq!(workspace.store().read().unwrap().workdays, Workdays::ALL);
    }

    #[test]
    fn set_workdays_updates_config_and_dates() {
        let dir = TempDir::new().unwrap();
        let mut workspace = Workspace::init(dir.path(), Portfolio::sample(today())).unwrap();
        let before = workspace.load().unwrap();

        workspace.set_workdays(Workdays::ALL).unwrap();

        let reopened = Workspace::open(dir.path()).unwrap();
        assert_eq!(reopened.workdays(), Workdays::ALL);

        let after = reopened.load().unwrap();
        let old = &before.active_project().unwrap().tasks;
        let new = &after.active_project().unwrap().tasks;
        for (a, b) in old.iter().zip(new) {
            assert_eq!(a.start, b.start);
            assert!(b.end <= a.end || a.is_group());
        }
    }
}
