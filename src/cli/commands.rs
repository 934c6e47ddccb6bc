//! CLI command definitions using clap

use crate::models::{Priority, SortField};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Personal task tracker with projects, checklists and due dates
#[derive(Parser, Debug)]
#[command(name = "todos")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Data directory (defaults to ~/.todos)
    #[arg(long, env = "TODOS_DIR", global = true)]
    pub dir: Option<PathBuf>,

    /// Select this project or view before running the command
    #[arg(short = 'P', long, global = true)]
    pub project: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new task
    Add {
        /// Task text
        text: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,

        /// Project to file the task under (default: Inbox)
        #[arg(short, long)]
        category: Option<String>,

        /// Priority (low, medium, high, none)
        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<PriorityArg>,
    },

    /// List tasks in the current project or view
    List,

    /// Show task details
    Show {
        /// Task ID
        id: u64,
    },

    /// Update task properties
    Edit {
        /// Task ID
        id: u64,

        /// New text
        #[arg(long)]
        text: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date, conflicts_with = "no_due")]
        due: Option<NaiveDate>,

        /// Remove the due date
        #[arg(long)]
        no_due: bool,

        /// Move to another project
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Toggle task(s) between done and not done
    Done {
        /// Task ID(s)
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Change task priority
    Priority {
        /// Task ID
        id: u64,

        /// New priority (low, medium, high, none)
        #[arg(value_parser = parse_priority)]
        priority: PriorityArg,
    },

    /// Replace the note attached to a task
    Note {
        /// Task ID
        id: u64,

        /// Note text (empty clears it)
        text: String,
    },

    /// Manage a task's checklist
    #[command(subcommand)]
    Sub(SubCommands),

    /// Delete a task
    Delete {
        /// Task ID
        id: u64,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Sort by a field; repeating the current field flips the direction
    Sort {
        /// text, due or priority
        #[arg(value_parser = parse_sort_field)]
        field: SortField,
    },

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommands),
}

#[derive(Subcommand, Debug)]
pub enum SubCommands {
    /// Add a checklist item
    Add {
        /// Task ID
        task: u64,

        /// Item text
        text: String,
    },

    /// Toggle a checklist item
    Done {
        /// Task ID
        task: u64,

        /// Item ID
        sub: u64,
    },

    /// Remove a checklist item
    Rm {
        /// Task ID
        task: u64,

        /// Item ID
        sub: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project
    Add {
        /// Project name
        name: String,
    },

    /// Delete a project and all of its tasks
    Rm {
        /// Project name
        name: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Switch to a project or view
    Use {
        /// Project or view name (All, Inbox, Today, Upcoming, Overdue, ...)
        name: String,
    },

    /// List projects
    List,
}

/// A priority given on the command line, where `none` clears it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityArg(pub Option<Priority>);

fn parse_priority(s: &str) -> Result<PriorityArg, String> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(PriorityArg(None));
    }
    s.parse().map(|p| PriorityArg(Some(p)))
}

fn parse_sort_field(s: &str) -> Result<SortField, String> {
    s.parse()
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date: {}", e))
}
