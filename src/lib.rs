//! todos - an event-driven personal task tracker
//!
//! Tasks and projects live in in-memory stores that persist themselves as
//! JSON documents in a key-value storage and announce every change on an
//! event bus. Observers such as the renderer rebuild their view from the
//! event payloads alone.

pub mod app;
pub mod cli;
pub mod confirm;
pub mod events;
pub mod models;
pub mod render;
pub mod storage;
pub mod store;

pub use app::{App, AppError};
pub use events::{Event, EventBus, Topic};
pub use models::{NewTask, Priority, Project, SortCriteria, SortField, Subtask, Task, TaskPatch};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageLocation};
pub use store::{ProjectError, ProjectStore, TaskError, TaskStore};
