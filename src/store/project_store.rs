//! Projects (categories), the current selection, and cascading deletion

use crate::events::{Event, EventBus};
use crate::models::{ALL, INBOX, Project, SystemProject};
use crate::storage::{SharedStorage, StorageError, load_json, save_json};
use crate::store::task_store::TaskStore;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;

/// Storage key for the list of project names
pub const PROJECTS_KEY: &str = "todos-app-projects";

/// Storage key for the selected project
pub const CURRENT_PROJECT_KEY: &str = "todos-app-current-project";

/// Errors related to project operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectError {
    #[error("Project name cannot be empty")]
    EmptyName,
    #[error("Project name is reserved: {0}")]
    Reserved(String),
    #[error("Project already exists: {0}")]
    Duplicate(String),
    #[error("Cannot delete system project: {0}")]
    SystemProject(String),
    #[error("Project not found: {0}")]
    NotFound(String),
}

/// The one task-store capability project deletion needs
pub trait TaskPurge {
    /// Remove every task filed under `project`, returning how many went
    fn delete_by_project(&mut self, project: &str) -> usize;
}

impl TaskPurge for TaskStore {
    fn delete_by_project(&mut self, project: &str) -> usize {
        TaskStore::delete_by_project(self, project)
    }
}

/// Owns system and user projects plus the current selection
pub struct ProjectStore {
    projects: Vec<Project>,
    current: String,
    storage: SharedStorage,
    bus: Rc<EventBus>,
    tasks: Rc<RefCell<dyn TaskPurge>>,
    save_errors: BTreeMap<&'static str, String>,
}

impl ProjectStore {
    /// Rehydrate projects and the selection from storage.
    ///
    /// System projects are always present: stored user names are unioned
    /// onto them, never substituted for them.
    pub fn load(
        storage: SharedStorage,
        bus: Rc<EventBus>,
        tasks: Rc<RefCell<dyn TaskPurge>>,
    ) -> Self {
        let stored = match load_json::<Vec<String>>(&*storage, PROJECTS_KEY) {
            Ok(names) => names.unwrap_or_default(),
            Err(e) => {
                log::warn!("Error loading projects from storage, using defaults: {}", e);
                Vec::new()
            }
        };

        let mut projects: Vec<Project> = SystemProject::ORDERED
            .into_iter()
            .map(Project::from)
            .collect();
        for name in stored {
            let name = name.trim();
            if name.is_empty() || projects.iter().any(|p| p.name == name) {
                continue;
            }
            projects.push(Project::new(name));
        }

        let current = match load_json::<String>(&*storage, CURRENT_PROJECT_KEY) {
            Ok(Some(name)) if projects.iter().any(|p| p.name == name) => name,
            Ok(_) => INBOX.to_string(),
            Err(e) => {
                log::warn!("Error loading current project, using {}: {}", INBOX, e);
                INBOX.to_string()
            }
        };

        log::debug!("Loaded {} project(s), current {}", projects.len(), current);
        let store = ProjectStore {
            projects,
            current,
            storage,
            bus,
            tasks,
            save_errors: BTreeMap::new(),
        };
        store.publish();
        store
    }

    /// Every project, system ones first
    pub fn list(&self) -> Vec<Project> {
        self.projects.clone()
    }

    pub fn current_project_name(&self) -> &str {
        &self.current
    }

    pub fn contains(&self, name: &str) -> bool {
        self.projects.iter().any(|p| p.name == name)
    }

    /// Whether tasks may be filed under `name`
    pub fn is_assignable(&self, name: &str) -> bool {
        self.projects
            .iter()
            .any(|p| p.name == name && p.is_assignable())
    }

    /// Failed writes, one message per key
    pub fn save_errors(&self) -> Vec<&str> {
        self.save_errors.values().map(String::as_str).collect()
    }

    /// Make `name` the active selection
    pub fn set_current(&mut self, name: &str) -> Result<(), ProjectError> {
        if !self.contains(name) {
            return Err(ProjectError::NotFound(name.to_string()));
        }
        self.current = name.to_string();
        let result = save_json(&*self.storage, CURRENT_PROJECT_KEY, &self.current);
        self.record_save(CURRENT_PROJECT_KEY, result);

        self.publish();
        self.bus
            .publish(Event::TasksFilterChanged(self.current.clone()));
        Ok(())
    }

    /// Create a user project
    pub fn add(&mut self, name: &str) -> Result<Project, ProjectError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProjectError::EmptyName);
        }
        if name == ALL {
            return Err(ProjectError::Reserved(name.to_string()));
        }
        if self.contains(name) {
            return Err(ProjectError::Duplicate(name.to_string()));
        }

        let project = Project::new(name);
        self.projects.push(project.clone());
        log::debug!("Added project {}", name);
        self.commit();
        Ok(project)
    }

    /// Delete a user project together with its tasks
    pub fn delete(&mut self, name: &str) -> Result<(), ProjectError> {
        let name = name.trim();
        if SystemProject::is_system_name(name) {
            log::warn!("Cannot delete system project: {}", name);
            return Err(ProjectError::SystemProject(name.to_string()));
        }
        let pos = self
            .projects
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| ProjectError::NotFound(name.to_string()))?;

        let removed = self.tasks.borrow_mut().delete_by_project(name);
        self.projects.remove(pos);
        log::info!("Deleted project {} and {} task(s)", name, removed);

        if self.current == name {
            self.set_current(INBOX)?;
        }
        self.commit();
        Ok(())
    }

    fn commit(&mut self) {
        let names: Vec<&str> = self.projects.iter().map(|p| p.name.as_str()).collect();
        let result = save_json(&*self.storage, PROJECTS_KEY, &names);
        self.record_save(PROJECTS_KEY, result);
        self.publish();
    }

    fn record_save(&mut self, key: &'static str, result: Result<(), StorageError>) {
        match result {
            Ok(()) => {
                self.save_errors.remove(key);
            }
            Err(e) => {
                log::error!("Failed to save {}, keeping in-memory state: {}", key, e);
                self.save_errors.insert(key, e.to_string());
            }
        }
    }

    fn publish(&self) {
        self.bus.publish(Event::ProjectsUpdated {
            projects: self.list(),
            current: self.current.clone(),
        });
    }
}
