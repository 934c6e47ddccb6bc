//! Derived view: which tasks are visible for a project selection

use crate::models::{ALL, SystemProject, Task};
use chrono::{Local, NaiveDate};
use std::rc::Rc;

/// Source of the current calendar date
pub type Clock = Rc<dyn Fn() -> NaiveDate>;

/// Today's date in the host's local time zone
pub fn system_clock() -> Clock {
    Rc::new(|| Local::now().date_naive())
}

/// A clock pinned to one date
pub fn fixed_clock(date: NaiveDate) -> Clock {
    Rc::new(move || date)
}

/// Predicate a selection applies to tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewFilter<'a> {
    All,
    Today,
    Upcoming,
    Overdue,
    Project(&'a str),
}

impl<'a> ViewFilter<'a> {
    /// Classify a selected project name. An empty selection shows everything.
    pub fn from_selection(selection: &'a str) -> Self {
        if selection.is_empty() || selection == ALL {
            return ViewFilter::All;
        }
        match SystemProject::from_name(selection) {
            Some(SystemProject::Today) => ViewFilter::Today,
            Some(SystemProject::Upcoming) => ViewFilter::Upcoming,
            Some(SystemProject::Overdue) => ViewFilter::Overdue,
            _ => ViewFilter::Project(selection),
        }
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            ViewFilter::All => true,
            ViewFilter::Today => task.due_date() == Some(today),
            ViewFilter::Upcoming => task.due_date().is_some_and(|due| due > today),
            ViewFilter::Overdue => !task.done && task.due_date().is_some_and(|due| due < today),
            ViewFilter::Project(name) => task.category == *name,
        }
    }
}

/// The subset of `tasks` shown for `selection`, keeping their order
pub fn visible_tasks(tasks: &[Task], selection: &str, today: NaiveDate) -> Vec<Task> {
    let filter = ViewFilter::from_selection(selection);
    tasks
        .iter()
        .filter(|t| filter.matches(t, today))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn task(id: u64, due: Option<&str>, category: &str, done: bool) -> Task {
        let mut t = Task::new(id, format!("task {id}"));
        t.due = due.map(str::to_string);
        t.category = category.to_string();
        t.done = done;
        t
    }

    fn ids(tasks: &[Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.id).collect()
    }

    fn sample() -> Vec<Task> {
        vec![
            task(1, Some("2024-06-15"), "Inbox", false),
            task(2, Some("2024-06-16"), "Work", false),
            task(3, Some("2024-06-14"), "Work", false),
            task(4, Some("2024-06-14"), "Inbox", true),
            task(5, None, "Home", false),
            task(6, Some("not-a-date"), "Home", false),
            task(7, Some("2024-06-15"), "Home", true),
        ]
    }

    #[test]
    fn test_from_selection() {
        assert_eq!(ViewFilter::from_selection(""), ViewFilter::All);
        assert_eq!(ViewFilter::from_selection("All"), ViewFilter::All);
        assert_eq!(ViewFilter::from_selection("Today"), ViewFilter::Today);
        assert_eq!(ViewFilter::from_selection("Inbox"), ViewFilter::Project("Inbox"));
        assert_eq!(ViewFilter::from_selection("Work"), ViewFilter::Project("Work"));
    }

    #[test]
    fn test_all() {
        assert_eq!(ids(&visible_tasks(&sample(), "All", today())), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(visible_tasks(&sample(), "", today()).len(), 7);
    }

    #[test]
    fn test_today_ignores_completion() {
        assert_eq!(ids(&visible_tasks(&sample(), "Today", today())), vec![1, 7]);
    }

    #[test]
    fn test_upcoming_excludes_today() {
        assert_eq!(ids(&visible_tasks(&sample(), "Upcoming", today())), vec![2]);
    }

    #[test]
    fn test_overdue_excludes_done_and_today() {
        assert_eq!(ids(&visible_tasks(&sample(), "Overdue", today())), vec![3]);
    }

    #[test]
    fn test_project_membership() {
        assert_eq!(ids(&visible_tasks(&sample(), "Home", today())), vec![5, 6, 7]);
        assert_eq!(ids(&visible_tasks(&sample(), "Inbox", today())), vec![1, 4]);
        assert!(visible_tasks(&sample(), "Nowhere", today()).is_empty());
    }

    #[test]
    fn test_invalid_due_never_matches_date_views() {
        let tasks = vec![task(1, Some("not-a-date"), "Inbox", false)];
        for view in ["Today", "Upcoming", "Overdue"] {
            assert!(visible_tasks(&tasks, view, today()).is_empty(), "{view}");
        }
    }

    #[test]
    fn test_fixed_clock() {
        let clock = fixed_clock(today());
        assert_eq!(clock(), today());
    }
}
