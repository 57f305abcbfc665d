//! # Storage Layer
//!
//! Persistence layer for the Gantt CLI with plain-text file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Projects, tasks, users | JSON | `.gantt/workspace.json` |
//! | Config | TOML | `.gantt/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`WorkspaceStore`] locks `.gantt/workspace.lock` (`fs2`) for every read
//!   and for the full duration of a read-modify-write
//! - All writes are atomic (temp file + rename)
//!
//! ## Project Structure
//!
//! ```text
//! .gantt/
//! ├── workspace.json        # Portfolio: projects, tasks, users, workdays
//! ├── workspace.lock        # Lock file (ignored)
//! ├── config.toml           # Project configuration
//! └── .gitignore
//! ```
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point for accessing a Gantt project
//! - [`WorkspaceStore`] - Read/write the portfolio as JSON
//! - [`Config`] - Project and global configuration

mod config;
mod json_store;
mod workspace;

pub use config::{
    is_hex_color, CalendarConfig, Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig,
    ScheduleConfig, DATA_DIR,
};
pub use json_store::WorkspaceStore;
pub use workspace::{Workspace, WorkspaceError};
