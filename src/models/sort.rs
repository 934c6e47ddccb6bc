//! Sort criteria for the derived task list

use crate::models::task::Task;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Field the task list is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Text,
    Due,
    Priority,
}

impl SortField {
    /// Direction used when this field is first selected.
    /// Priority starts descending so that `High` comes first.
    pub fn default_direction(self) -> SortDirection {
        match self {
            SortField::Text | SortField::Due => SortDirection::Asc,
            SortField::Priority => SortDirection::Desc,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortField::Text => write!(f, "text"),
            SortField::Due => write!(f, "due"),
            SortField::Priority => write!(f, "priority"),
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "name" => Ok(SortField::Text),
            "due" | "date" => Ok(SortField::Due),
            "priority" => Ok(SortField::Priority),
            _ => Err(format!("Unknown sort field: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Active field and direction, persisted for continuity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SortCriteria {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortCriteria {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        SortCriteria { field, direction }
    }

    /// Criteria after the user picks `field`: the same field flips
    /// direction, a new field starts at its default direction.
    pub fn select(self, field: SortField) -> Self {
        if self.field == field {
            SortCriteria::new(field, self.direction.flipped())
        } else {
            SortCriteria::new(field, field.default_direction())
        }
    }

    /// Stable in-place sort of `tasks`
    pub fn sort(&self, tasks: &mut [Task]) {
        let direction = self.direction;
        match self.field {
            SortField::Text => tasks.sort_by(|a, b| {
                direction.apply(a.text.to_lowercase().cmp(&b.text.to_lowercase()))
            }),
            SortField::Priority => {
                tasks.sort_by(|a, b| direction.apply(a.priority_rank().cmp(&b.priority_rank())))
            }
            // Undated tasks stay last whichever way dated ones run.
            SortField::Due => tasks.sort_by(|a, b| match (a.due_date(), b.due_date()) {
                (Some(x), Some(y)) => direction.apply(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }),
        }
    }
}

impl fmt::Display for SortCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction)
    }
}
