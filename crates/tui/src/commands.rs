use std::fmt;
use std::io::Write;

use anyhow::{anyhow, Result};

use crate::cli::{AddArgs, CliCommand, DeleteArgs, DoneArgs, TasksArgs};
use crate::core::commands as core_commands;
use crate::core::patch::PatchOp;
use crate::core::TodoApi;
use crate::model::{DeleteResult, EntityId, ItemKind, StatusUpdate};

pub fn execute<W: Write>(api: &dyn TodoApi, command: CliCommand, mut writer: W) -> Result<()> {
    match command {
        CliCommand::Lists => handle_lists(api, &mut writer),
        CliCommand::Tasks(args) => handle_tasks(api, &args, &mut writer),
        CliCommand::Add(args) => handle_add(api, &args, &mut writer),
        CliCommand::Done(args) => handle_done(api, &args, &mut writer),
        CliCommand::Delete(args) => handle_delete(api, &args, &mut writer),
        CliCommand::Tui => Err(anyhow!("launch the terminal UI directly")),
    }
}

fn handle_lists<W: Write>(api: &dyn TodoApi, mut writer: W) -> Result<()> {
    for list in api.get_lists()? {
        let suffix = if list.is_inbox() { "  (inbox)" } else { "" };
        writeln!(writer, "{:>10}  {}{}", list.id, list.title, suffix)?;
    }
    Ok(())
}

fn handle_tasks<W: Write>(api: &dyn TodoApi, args: &TasksArgs, mut writer: W) -> Result<()> {
    let list = api.find_list_by_title(&args.list)?;
    let tasks = api.get_tasks(list.id, args.completed)?;
    if tasks.is_empty() {
        writeln!(writer, "No {} tasks in {}", state_word(args.completed), list.title)?;
        return Ok(());
    }
    for task in tasks {
        let mut line = format!(
            "{:>10}  [{}] {}",
            task.id,
            if task.completed { "x" } else { " " },
            task.title
        );
        if task.starred {
            line.push_str("  ★");
        }
        if let Some(due) = task.due_date {
            line.push_str(&format!("  due {}", due.format("%Y-%m-%d")));
        }
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

fn state_word(completed: bool) -> &'static str {
    if completed {
        "completed"
    } else {
        "open"
    }
}

fn handle_add<W: Write>(api: &dyn TodoApi, args: &AddArgs, mut writer: W) -> Result<()> {
    let patch = args.to_patch()?;
    patch.validate(ItemKind::Task, PatchOp::Create)?;
    let list = api.find_list_by_title(&args.list)?;
    let task = api.create_task(list.id, &patch)?;
    writeln!(writer, "Created task {} in {}: {}", task.id, list.title, task.title)?;
    Ok(())
}

fn handle_done<W: Write>(api: &dyn TodoApi, args: &DoneArgs, mut writer: W) -> Result<()> {
    let list = api.find_list_by_title(&args.list)?;
    let results = core_commands::complete_tasks(api, list.id, &args.ids)?;
    DoneSummary::from_results(&results).write_to(&mut writer)
}

fn handle_delete<W: Write>(api: &dyn TodoApi, args: &DeleteArgs, mut writer: W) -> Result<()> {
    let list = api.find_list_by_title(&args.list)?;
    let results = core_commands::delete_tasks(api, list.id, &args.ids)?;
    DeleteSummary::from_results(&results).write_to(&mut writer)
}

fn join_ids(ids: &[EntityId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

struct DoneSummary {
    completed: usize,
    unchanged: Vec<EntityId>,
    missing: Vec<EntityId>,
}

impl DoneSummary {
    fn from_results(results: &[StatusUpdate]) -> Self {
        let mut summary = Self {
            completed: 0,
            unchanged: Vec::new(),
            missing: Vec::new(),
        };
        for result in results {
            match (result.found, result.changed) {
                (true, true) => summary.completed += 1,
                (true, false) => summary.unchanged.push(result.id),
                (false, _) => summary.missing.push(result.id),
            }
        }
        summary
    }

    fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", SummaryLine::new("Completed", self.completed))?;
        if !self.unchanged.is_empty() {
            writeln!(writer, "Already done: {}", join_ids(&self.unchanged))?;
        }
        if !self.missing.is_empty() {
            writeln!(writer, "Not found: {}", join_ids(&self.missing))?;
        }
        Ok(())
    }
}

struct DeleteSummary {
    deleted: usize,
    missing: Vec<EntityId>,
}

impl DeleteSummary {
    fn from_results(results: &[DeleteResult]) -> Self {
        let mut deleted = 0usize;
        let mut missing = Vec::new();
        for result in results {
            if result.deleted {
                deleted += 1;
            } else {
                missing.push(result.id);
            }
        }
        Self { deleted, missing }
    }

    fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", SummaryLine::new("Deleted", self.deleted))?;
        if !self.missing.is_empty() {
            writeln!(writer, "Not found: {}", join_ids(&self.missing))?;
        }
        Ok(())
    }
}

struct SummaryLine {
    verb: &'static str,
    count: usize,
}

impl SummaryLine {
    fn new(verb: &'static str, count: usize) -> Self {
        Self { verb, count }
    }
}

impl fmt::Display for SummaryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            0 => write!(f, "No tasks {}", self.verb.to_lowercase()),
            1 => write!(f, "{} 1 task", self.verb),
            n => write!(f, "{} {} tasks", self.verb, n),
        }
    }
}
