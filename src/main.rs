//! todos CLI - personal task tracker

use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::rc::Rc;
use todos::app::App;
use todos::cli::display::{display_frame, display_projects, display_task_detail, error, success};
use todos::cli::{Cli, Commands, PriorityArg, ProjectCommands, StdinConfirm, SubCommands};
use todos::confirm::DeletionTarget;
use todos::models::{NewTask, TaskPatch};
use todos::render::RecordingSink;
use todos::storage::{FileStorage, SharedStorage, StorageLocation};
use todos::store::TaskError;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let cli = Cli::parse();

    let result = run(cli);

    if let Err(e) = &result {
        error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let location = StorageLocation::resolve(cli.dir.as_deref())?;
    log::debug!("Using data directory {:?}", location.data_dir);
    let storage: SharedStorage = Rc::new(FileStorage::new(location));

    let mut app = App::new(storage);
    let renderer = app.attach_renderer(RecordingSink::new());

    if let Some(project) = &cli.project {
        app.select_project(project)?;
    }

    let show_list = match cli.command {
        Commands::Add {
            text,
            due,
            category,
            priority,
        } => {
            let mut new = NewTask::new(text);
            if let Some(d) = due {
                new = new.due(d.format("%Y-%m-%d").to_string());
            }
            if let Some(c) = category {
                new = new.category(c);
            }
            if let Some(PriorityArg(p)) = priority {
                new = new.priority(p);
            }

            let created = app.create_task(new)?;
            success(&format!(
                "Created #{} in {}: {}",
                created.id, created.category, created.text
            ));
            true
        }

        Commands::List => true,

        Commands::Show { id } => {
            let task = app.task(id).ok_or(TaskError::NotFound(id))?;
            display_task_detail(&task);
            false
        }

        Commands::Edit {
            id,
            text,
            due,
            no_due,
            category,
        } => {
            let mut patch = TaskPatch::default();
            if let Some(t) = text {
                patch = patch.text(t);
            }
            if let Some(d) = due {
                patch = patch.due(Some(d.format("%Y-%m-%d").to_string()));
            } else if no_due {
                patch = patch.due(None);
            }
            if let Some(c) = category {
                patch = patch.category(c);
            }

            if patch.is_empty() {
                log::info!("Nothing to update.");
                return Ok(());
            }
            let task = app.update_task(id, patch)?;
            success(&format!("Updated #{}: {}", task.id, task.text));
            true
        }

        Commands::Done { ids } => {
            for id in ids {
                let task = app.toggle_task(id)?;
                let verb = if task.done { "Completed" } else { "Reopened" };
                success(&format!("{} #{}: {}", verb, task.id, task.text));
            }
            true
        }

        Commands::Priority {
            id,
            priority: PriorityArg(priority),
        } => {
            let task = app.set_priority(id, priority)?;
            let shown = priority.map(|p| p.to_string()).unwrap_or_else(|| "none".to_string());
            success(&format!("Set #{} priority to {}", task.id, shown));
            true
        }

        Commands::Note { id, text } => {
            let task = app.set_note(id, &text)?;
            if task.note.is_empty() {
                success(&format!("Cleared note on #{}", task.id));
            } else {
                success(&format!("Updated note on #{}", task.id));
            }
            false
        }

        Commands::Sub(sub) => {
            let task_id = match sub {
                SubCommands::Add { task, text } => {
                    let item = app.add_subtask(task, &text)?;
                    success(&format!("Added item {} to #{}", item.id, task));
                    task
                }
                SubCommands::Done { task, sub } => {
                    let item = app.toggle_subtask(task, sub)?;
                    let verb = if item.done { "Checked" } else { "Unchecked" };
                    success(&format!("{} item {} on #{}", verb, item.id, task));
                    task
                }
                SubCommands::Rm { task, sub } => {
                    let item = app.delete_subtask(task, sub)?;
                    success(&format!("Removed item {} from #{}: {}", item.id, task, item.text));
                    task
                }
            };
            if let Some(task) = app.task(task_id) {
                display_task_detail(&task);
            }
            false
        }

        Commands::Delete { id, force } => {
            let mut confirm = StdinConfirm::new(force);
            let deleted = app.delete_with_confirmation(DeletionTarget::Task(id), &mut confirm)?;
            if deleted {
                success(&format!("Deleted #{}", id));
            }
            deleted
        }

        Commands::Sort { field } => {
            let criteria = app.sort_by(field);
            success(&format!(
                "Sorting by {} {}",
                criteria.field, criteria.direction
            ));
            true
        }

        Commands::Project(command) => match command {
            ProjectCommands::Add { name } => {
                let project = app.add_project(&name)?;
                success(&format!("Created project {}", project));
                false
            }
            ProjectCommands::Rm { name, force } => {
                let mut confirm = StdinConfirm::new(force);
                let target = DeletionTarget::Project(name.clone());
                if app.delete_with_confirmation(target, &mut confirm)? {
                    success(&format!("Deleted project {}", name));
                }
                false
            }
            ProjectCommands::Use { name } => {
                app.select_project(&name)?;
                true
            }
            ProjectCommands::List => {
                display_projects(&app.projects(), &app.current_project());
                false
            }
        },
    };

    if show_list {
        if let Some(frame) = renderer.sink().last() {
            display_frame(frame);
        }
    }

    for e in app.persistence_errors() {
        log::warn!("Changes were kept in memory but not saved: {}", e);
    }

    Ok(())
}
