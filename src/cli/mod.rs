//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Workspace setup | `init`, `init --sample` |
//! | Project | Project management | `project new`, `project switch` |
//! | Task | Editing the active project | `task add`, `task shift`, `task move` |
//! | Query | Read-only views | `list`, `gantt`, `deps`, `dashboard`, `export` |
//! | Settings | Calendar and people | `workdays set`, `user add` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) to log debug events to stderr:
//! ```bash
//! gantt --verbose list
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod project_cmd;
mod query;
mod settings;
mod task;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
