//! Command-line interface

pub mod commands;
pub mod display;
pub mod prompt;

pub use commands::{Cli, Commands, PriorityArg, ProjectCommands, SubCommands};
pub use prompt::StdinConfirm;
