use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::core::{ApiError, Patch};
use crate::model::EntityId;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "wut",
    version,
    about = "A keyboard-driven terminal client for Wunderlist.",
    after_help = "Examples:\n  wut                       Launch the TUI (same as `wut tui`)\n  wut tasks Groceries --completed\n  wut add Work Send the weekly report --set starred=true\n  wut delete Work 123 456"
)]
pub struct Cli {
    /// Config file (defaults to $WUT_CONFIG_PATH, then ~/.wutrc)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Tracing filter for the log file (e.g. "info", "wut_core=debug")
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    /// Write logs here instead of the platform data directory
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Launch the terminal UI (default command)
    Tui,
    /// Print every list, inbox first
    Lists,
    /// Print the tasks of a list
    Tasks(TasksArgs),
    /// Create a task in a list
    Add(AddArgs),
    /// Mark tasks completed
    Done(DoneArgs),
    /// Delete one or more tasks by id
    Delete(DeleteArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TasksArgs {
    /// Title of the list
    #[arg(value_name = "LIST")]
    pub list: String,

    /// Show completed tasks instead of open ones
    #[arg(long)]
    pub completed: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Title of the list to add to
    #[arg(value_name = "LIST")]
    pub list: String,

    /// Task title
    #[arg(value_name = "TEXT", required = true)]
    pub text: Vec<String>,

    /// Star the task
    #[arg(long)]
    pub starred: bool,

    /// Due date (YYYY-MM-DD)
    #[arg(long = "due", value_name = "DATE")]
    pub due: Option<NaiveDate>,

    /// Extra task property as key=value; values are read as JSON when they parse
    #[arg(long = "set", value_name = "KEY=VALUE", action = ArgAction::Append)]
    pub set: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DoneArgs {
    /// Title of the list holding the tasks
    #[arg(value_name = "LIST")]
    pub list: String,

    /// One or more task ids
    #[arg(value_name = "ID", required = true)]
    pub ids: Vec<EntityId>,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// Title of the list holding the tasks
    #[arg(value_name = "LIST")]
    pub list: String,

    /// One or more task ids to delete
    #[arg(value_name = "ID", required = true)]
    pub ids: Vec<EntityId>,
}

impl AddArgs {
    pub fn title(&self) -> String {
        self.text.join(" ")
    }

    /// Property set for the new task; `--set` pairs are applied last.
    pub fn to_patch(&self) -> Result<Patch, ApiError> {
        let mut patch = Patch::new().title(self.title());
        if self.starred {
            patch = patch.starred(true);
        }
        if let Some(due) = self.due {
            patch = patch.due_date(due);
        }
        for assignment in &self.set {
            patch = patch.with_assignment(assignment)?;
        }
        Ok(patch)
    }
}
