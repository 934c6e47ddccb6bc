//! In-memory stores that own application state

pub mod project_store;
pub mod task_store;
pub mod view;

pub use project_store::{CURRENT_PROJECT_KEY, PROJECTS_KEY, ProjectError, ProjectStore, TaskPurge};
pub use task_store::{SORT_CRITERIA_KEY, TASKS_KEY, TaskError, TaskStore};
pub use view::{Clock, ViewFilter, fixed_clock, system_clock, visible_tasks};
