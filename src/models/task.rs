//! Task model and related types

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::models::project::INBOX;

/// Task priority. A task without a priority is represented as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Sort rank of an optional priority: `High=3, Medium=2, Low=1, None=0`
    pub fn rank(priority: Option<Priority>) -> u8 {
        match priority {
            Some(Priority::High) => 3,
            Some(Priority::Medium) => 2,
            Some(Priority::Low) => 1,
            None => 0,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// A checklist item owned by exactly one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    /// Unique within the parent task only. Stored ids that are not
    /// integers load as 0 and are renumbered by [`Task::repair_subtask_ids`].
    #[serde(default, deserialize_with = "subtask_id")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub done: bool,
}

/// A task with all its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub done: bool,
    /// Raw ISO 8601 date string, kept verbatim even when it does not parse
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default = "inbox", deserialize_with = "category_or_inbox")]
    pub category: String,
    #[serde(default, deserialize_with = "priority_or_none")]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtasks: Vec<Subtask>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create an open task in the Inbox with no due date and no priority
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Task {
            id,
            text: text.into(),
            done: false,
            due: None,
            category: inbox(),
            priority: None,
            note: String::new(),
            subtasks: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// The due date, if `due` holds a valid date
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due.as_deref().and_then(parse_due)
    }

    /// Flip the completion flag
    pub fn toggle_complete(&mut self) {
        self.done = !self.done;
    }

    /// Sort rank of this task's priority
    pub fn priority_rank(&self) -> u8 {
        Priority::rank(self.priority)
    }

    /// Next free subtask id within this task
    pub fn next_subtask_id(&self) -> u64 {
        self.subtasks.iter().map(|s| s.id).max().unwrap_or(0) + 1
    }

    /// Find a subtask by id for mutation
    pub fn subtask_mut(&mut self, sub_id: u64) -> Option<&mut Subtask> {
        self.subtasks.iter_mut().find(|s| s.id == sub_id)
    }

    /// Give subtasks with a missing or repeated id a fresh one.
    ///
    /// Returns whether any id changed.
    pub fn repair_subtask_ids(&mut self) -> bool {
        let mut next = self.next_subtask_id();
        let mut seen = HashSet::new();
        let mut changed = false;
        for sub in &mut self.subtasks {
            if sub.id == 0 || !seen.insert(sub.id) {
                sub.id = next;
                next += 1;
                changed = true;
            }
        }
        changed
    }

    /// Number of completed subtasks
    pub fn completed_subtasks(&self) -> usize {
        self.subtasks.iter().filter(|s| s.done).count()
    }
}

/// Fields for a task that has not been assigned an id yet.
///
/// Creation defaults: category `Inbox`, priority `Medium`, no due date.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub text: String,
    pub due: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
}

impl NewTask {
    pub fn new(text: impl Into<String>) -> Self {
        NewTask {
            text: text.into(),
            due: None,
            category: None,
            priority: Some(Priority::Medium),
        }
    }

    pub fn due(mut self, due: impl Into<String>) -> Self {
        self.due = Some(due.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = priority;
        self
    }

    /// The category the task will be filed under
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(INBOX)
    }
}

/// A field-level merge into an existing task.
///
/// `None` leaves the field untouched. For the nullable fields the inner
/// `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub done: Option<bool>,
    pub due: Option<Option<String>>,
    pub category: Option<String>,
    pub priority: Option<Option<Priority>>,
    pub note: Option<String>,
}

impl TaskPatch {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn done(mut self, done: bool) -> Self {
        self.done = Some(done);
        self
    }

    pub fn due(mut self, due: Option<String>) -> Self {
        self.due = Some(due);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// True when the patch would not change anything
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Merge the provided fields into `task`
    pub fn apply(self, task: &mut Task) {
        if let Some(text) = self.text {
            task.text = text;
        }
        if let Some(done) = self.done {
            task.done = done;
        }
        if let Some(due) = self.due {
            task.due = due;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(note) = self.note {
            task.note = note;
        }
    }
}

/// Parse a stored due value into a calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 date-times and naive `YYYY-MM-DDTHH:MM[:SS]`.
/// Anything else counts as "no due date".
pub fn parse_due(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

fn inbox() -> String {
    INBOX.to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Missing, empty or unrecognised priorities load as `None`
fn priority_or_none<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

/// Integer ids pass through, anything else becomes 0
fn subtask_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn category_or_inbox<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let category = Option::<String>::deserialize(deserializer)?;
    Ok(category.filter(|c| !c.is_empty()).unwrap_or_else(inbox))
}
