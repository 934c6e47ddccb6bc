//! Display formatting for CLI output

use crate::models::{Project, ProjectKind, Task, parse_due};
use crate::render::Frame;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

/// Task row for table display
#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Done")]
    done: String,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Project")]
    category: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Checklist")]
    checklist: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        TaskRow {
            id: task.id.to_string(),
            done: if task.done { "x" } else { "" }.to_string(),
            text: truncate(&task.text, 40),
            due: task.due.as_deref().map(format_due).unwrap_or_default(),
            category: task.category.clone(),
            priority: task.priority.map(|p| p.to_string()).unwrap_or_default(),
            checklist: checklist_summary(task),
        }
    }
}

/// Display the visible tasks of a frame as a table
pub fn display_frame(frame: &Frame) {
    println!(
        "{} ({} of {}, sorted by {} {})",
        frame.title,
        frame.tasks.len(),
        frame.total,
        frame.sort.field,
        frame.sort.direction
    );

    if frame.tasks.is_empty() {
        log::info!("No tasks found.");
        return;
    }

    let rows: Vec<TaskRow> = frame.tasks.iter().map(TaskRow::from).collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(0)).with(Alignment::right()))
        .to_string();

    println!("{}", table);
}

/// Display detailed task information
pub fn display_task_detail(task: &Task) {
    println!("ID:       {}", task.id);
    println!("Task:     {}", task.text);
    println!("Status:   {}", if task.done { "done" } else { "open" });
    println!("Project:  {}", task.category);
    println!(
        "Priority: {}",
        task.priority.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
    );

    if let Some(due) = &task.due {
        println!("Due:      {}", format_due(due));
    }

    println!("Created:  {}", task.created_at.format("%Y-%m-%d %H:%M:%S"));

    if !task.subtasks.is_empty() {
        println!();
        println!("Checklist ({}):", checklist_summary(task));
        for sub in &task.subtasks {
            let mark = if sub.done { "x" } else { " " };
            println!("  [{}] {}. {}", mark, sub.id, sub.text);
        }
    }

    if !task.note.is_empty() {
        println!();
        println!("Note:");
        println!("{}", task.note);
    }
}

/// Project row for table display
#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "Project")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
}

/// Display every project, marking the current one
pub fn display_projects(projects: &[Project], current: &str) {
    let rows: Vec<ProjectRow> = projects
        .iter()
        .map(|p| ProjectRow {
            marker: if p.name == current { "*" } else { "" }.to_string(),
            name: p.name.clone(),
            kind: match p.kind() {
                ProjectKind::Meta => "view",
                ProjectKind::Inbox => "inbox",
                ProjectKind::DateView => "date view",
                ProjectKind::User => "project",
            }
            .to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Short form for valid dates, the raw value otherwise
fn format_due(raw: &str) -> String {
    match parse_due(raw) {
        Some(date) => date.format("%b %-d").to_string(),
        None => raw.to_string(),
    }
}

fn checklist_summary(task: &Task) -> String {
    if task.subtasks.is_empty() {
        String::new()
    } else {
        format!("{}/{}", task.completed_subtasks(), task.subtasks.len())
    }
}

/// Truncate a string to a maximum number of characters
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max - 3).collect();
        format!("{}...", kept)
    }
}

/// Format for success messages
pub fn success(msg: &str) {
    println!("{}", msg);
}

/// Format for error messages
pub fn error(msg: &str) {
    eprintln!("Error: {}", msg);
}
