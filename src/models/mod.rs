//! Data models for todos

pub mod project;
pub mod sort;
pub mod task;

pub use project::{ALL, INBOX, Project, ProjectKind, SystemProject};
pub use sort::{SortCriteria, SortDirection, SortField};
pub use task::{NewTask, Priority, Subtask, Task, TaskPatch, parse_due};
