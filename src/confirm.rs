//! Yes/no confirmation in front of destructive actions

use std::fmt;

/// Asks the user to approve an action
pub trait Confirm {
    /// Show `message` and return whether the user agreed
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// What a pending deletion would remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionTarget {
    Task(u64),
    Project(String),
}

impl fmt::Display for DeletionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionTarget::Task(id) => write!(f, "task #{}", id),
            DeletionTarget::Project(name) => write!(f, "project {}", name),
        }
    }
}

/// A deletion waiting on the user's answer.
///
/// Dropping it without resolving is the same as declining.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending deletion does nothing until resolved"]
pub struct PendingDeletion {
    pub target: DeletionTarget,
    /// Prompt to show the user
    pub message: String,
}
