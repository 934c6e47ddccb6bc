//! Application root: wires storage, bus, stores and renderer together

use crate::confirm::{Confirm, DeletionTarget, PendingDeletion};
use crate::events::EventBus;
use crate::models::{
    NewTask, Priority, Project, SortCriteria, SortField, Subtask, SystemProject, Task, TaskPatch,
};
use crate::render::{RenderSink, RenderState, Renderer};
use crate::storage::SharedStorage;
use crate::store::{
    Clock, ProjectError, ProjectStore, TaskError, TaskPurge, TaskStore, system_clock,
    visible_tasks,
};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Errors surfaced to whoever drives the application
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error("Unknown category: {0} (use Inbox or one of your projects)")]
    UnknownCategory(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Owns every component of one running application
pub struct App {
    bus: Rc<EventBus>,
    tasks: Rc<RefCell<TaskStore>>,
    projects: ProjectStore,
    clock: Clock,
}

impl App {
    pub fn new(storage: SharedStorage) -> Self {
        Self::with_clock(storage, system_clock())
    }

    /// Build the application with an explicit source of "today"
    pub fn with_clock(storage: SharedStorage, clock: Clock) -> Self {
        let bus = Rc::new(EventBus::new());
        let tasks = Rc::new(RefCell::new(TaskStore::load(
            Rc::clone(&storage),
            Rc::clone(&bus),
        )));
        let purge: Rc<RefCell<dyn TaskPurge>> = tasks.clone();
        let projects = ProjectStore::load(storage, Rc::clone(&bus), purge);

        App {
            bus,
            tasks,
            projects,
            clock,
        }
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    /// Start redrawing into `sink` on every change
    pub fn attach_renderer<S: RenderSink + 'static>(&self, sink: S) -> Rc<Renderer<S>> {
        let state = RenderState {
            tasks: self.tasks(),
            projects: self.projects(),
            current: self.current_project(),
            sort: self.sort_criteria(),
        };
        Renderer::attach(&self.bus, state, sink, Rc::clone(&self.clock))
    }

    // Reads

    /// Every task in sort order
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.borrow().list()
    }

    pub fn task(&self, id: u64) -> Option<Task> {
        self.tasks.borrow().find_by_id(id).cloned()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.projects.list()
    }

    pub fn current_project(&self) -> String {
        self.projects.current_project_name().to_string()
    }

    pub fn sort_criteria(&self) -> SortCriteria {
        self.tasks.borrow().sort_criteria()
    }

    /// Tasks shown for the current selection
    pub fn visible_tasks(&self) -> Vec<Task> {
        visible_tasks(
            &self.tasks(),
            self.projects.current_project_name(),
            (self.clock)(),
        )
    }

    /// Messages of failed writes that have not been superseded
    pub fn persistence_errors(&self) -> Vec<String> {
        let tasks = self.tasks.borrow();
        tasks
            .save_errors()
            .into_iter()
            .chain(self.projects.save_errors())
            .map(str::to_string)
            .collect()
    }

    // Task intents

    pub fn create_task(&mut self, new: NewTask) -> Result<Task> {
        self.check_category(new.category_or_default())?;
        Ok(self.tasks.borrow_mut().create(new)?)
    }

    pub fn update_task(&mut self, id: u64, patch: TaskPatch) -> Result<Task> {
        if let Some(category) = &patch.category {
            self.check_category(category)?;
        }
        Ok(self.tasks.borrow_mut().update(id, patch)?)
    }

    /// Remove a task without asking. Returns whether it existed.
    pub fn delete_task(&mut self, id: u64) -> bool {
        self.tasks.borrow_mut().delete(id)
    }

    pub fn toggle_task(&mut self, id: u64) -> Result<Task> {
        Ok(self.tasks.borrow_mut().toggle_complete(id)?)
    }

    pub fn set_priority(&mut self, id: u64, priority: Option<Priority>) -> Result<Task> {
        Ok(self.tasks.borrow_mut().set_priority(id, priority)?)
    }

    pub fn set_note(&mut self, id: u64, note: &str) -> Result<Task> {
        Ok(self.tasks.borrow_mut().set_note(id, note)?)
    }

    pub fn add_subtask(&mut self, task_id: u64, text: &str) -> Result<Subtask> {
        Ok(self.tasks.borrow_mut().add_subtask(task_id, text)?)
    }

    pub fn toggle_subtask(&mut self, task_id: u64, sub_id: u64) -> Result<Subtask> {
        Ok(self.tasks.borrow_mut().toggle_subtask(task_id, sub_id)?)
    }

    pub fn delete_subtask(&mut self, task_id: u64, sub_id: u64) -> Result<Subtask> {
        Ok(self.tasks.borrow_mut().delete_subtask(task_id, sub_id)?)
    }

    pub fn sort_by(&mut self, field: SortField) -> SortCriteria {
        self.tasks.borrow_mut().set_sort_criteria(field)
    }

    // Project intents

    pub fn add_project(&mut self, name: &str) -> Result<Project> {
        Ok(self.projects.add(name)?)
    }

    pub fn select_project(&mut self, name: &str) -> Result<()> {
        Ok(self.projects.set_current(name)?)
    }

    /// Remove a project and its tasks without asking
    pub fn delete_project(&mut self, name: &str) -> Result<()> {
        Ok(self.projects.delete(name)?)
    }

    // Confirmation

    /// Prepare the deletion of task `id` for the user to confirm
    pub fn request_task_deletion(&self, id: u64) -> Result<PendingDeletion> {
        let tasks = self.tasks.borrow();
        let task = tasks.find_by_id(id).ok_or(TaskError::NotFound(id))?;
        Ok(PendingDeletion {
            target: DeletionTarget::Task(id),
            message: format!("Delete #{} '{}'?", task.id, task.text),
        })
    }

    /// Prepare the deletion of project `name` for the user to confirm
    pub fn request_project_deletion(&self, name: &str) -> Result<PendingDeletion> {
        let name = name.trim();
        if SystemProject::is_system_name(name) {
            return Err(ProjectError::SystemProject(name.to_string()).into());
        }
        if !self.projects.contains(name) {
            return Err(ProjectError::NotFound(name.to_string()).into());
        }

        let affected = self.tasks.borrow().count_in(name);
        Ok(PendingDeletion {
            target: DeletionTarget::Project(name.to_string()),
            message: format!(
                "Delete project '{}' and its {} task(s)? This cannot be undone.",
                name, affected
            ),
        })
    }

    /// Carry out `pending` if the user agreed.
    ///
    /// Returns whether anything was deleted.
    pub fn resolve(&mut self, pending: PendingDeletion, confirmed: bool) -> Result<bool> {
        if !confirmed {
            log::info!("Cancelled.");
            return Ok(false);
        }
        match pending.target {
            DeletionTarget::Task(id) => {
                if self.delete_task(id) {
                    Ok(true)
                } else {
                    Err(TaskError::NotFound(id).into())
                }
            }
            DeletionTarget::Project(name) => {
                self.delete_project(&name)?;
                Ok(true)
            }
        }
    }

    /// Ask `confirm` before deleting `target`
    pub fn delete_with_confirmation(
        &mut self,
        target: DeletionTarget,
        confirm: &mut impl Confirm,
    ) -> Result<bool> {
        let pending = match &target {
            DeletionTarget::Task(id) => self.request_task_deletion(*id)?,
            DeletionTarget::Project(name) => self.request_project_deletion(name)?,
        };
        let confirmed = confirm.confirm(&pending.message);
        self.resolve(pending, confirmed)
    }

    fn check_category(&self, category: &str) -> Result<()> {
        if self.projects.is_assignable(category) {
            Ok(())
        } else {
            Err(AppError::UnknownCategory(category.to_string()))
        }
    }
}
