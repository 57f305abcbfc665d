//! Domain models for the Gantt planner
//!
//! Contains the scheduling engine without any I/O concerns.

pub mod calendar;
mod dashboard;
mod export;
mod graph;
mod hierarchy;
mod id;
mod interaction;
mod portfolio;
mod store;
mod task;
mod timeline;
mod users;

pub use calendar::{CalendarError, Workdays};
pub use dashboard::{Dashboard, Deadline, StatusCounts, Workload};
pub use export::{export_rows, ExportRow, EXPORT_HEADERS};
pub use graph::{visible_representative, Connector, DependencyGraph, Direction};
pub use hierarchy::{Hierarchy, ProcessedTask, RowKind};
pub use id::{IdError, ProjectId, TaskId};
pub use interaction::{edge_patch, BarInteraction, Gesture, InteractionState};
pub use portfolio::{Portfolio, PortfolioError, Project};
pub use store::{Reorder, StoreError, TaskStore, DEFAULT_TASK_DURATION};
pub use task::{Span, Task, TaskKind, TaskPatch, DEFAULT_COLOR, UNASSIGNED};
pub use timeline::{Bar, Scale, ScaleError, Timeline};
pub use users::{UserError, UserSet};
