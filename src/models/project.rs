//! Project (category) model and the fixed set of system projects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default home for uncategorized tasks
pub const INBOX: &str = "Inbox";

/// Meta view meaning "no filter"
pub const ALL: &str = "All";

/// Built-in projects that always exist and cannot be deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemProject {
    All,
    Inbox,
    Today,
    Upcoming,
    Overdue,
}

impl SystemProject {
    /// All system projects in display order
    pub const ORDERED: [SystemProject; 5] = [
        SystemProject::All,
        SystemProject::Inbox,
        SystemProject::Today,
        SystemProject::Upcoming,
        SystemProject::Overdue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SystemProject::All => ALL,
            SystemProject::Inbox => INBOX,
            SystemProject::Today => "Today",
            SystemProject::Upcoming => "Upcoming",
            SystemProject::Overdue => "Overdue",
        }
    }

    /// Look up a system project by its exact name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ORDERED.into_iter().find(|p| p.name() == name)
    }

    /// Whether `name` is reserved for a system project
    pub fn is_system_name(name: &str) -> bool {
        Self::from_name(name).is_some()
    }
}

impl fmt::Display for SystemProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a project relates to tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    /// `All`: shows every task
    Meta,
    /// `Inbox`: a real, undeletable category
    Inbox,
    /// `Today`, `Upcoming`, `Overdue`: computed from due dates
    DateView,
    /// User-defined category
    User,
}

/// A named grouping of tasks
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Project { name: name.into() }
    }

    pub fn kind(&self) -> ProjectKind {
        match SystemProject::from_name(&self.name) {
            Some(SystemProject::All) => ProjectKind::Meta,
            Some(SystemProject::Inbox) => ProjectKind::Inbox,
            Some(_) => ProjectKind::DateView,
            None => ProjectKind::User,
        }
    }

    /// Whether tasks can be filed under this project
    pub fn is_assignable(&self) -> bool {
        matches!(self.kind(), ProjectKind::Inbox | ProjectKind::User)
    }
}

impl From<SystemProject> for Project {
    fn from(system: SystemProject) -> Self {
        Project::new(system.name())
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
