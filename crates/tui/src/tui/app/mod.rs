use std::time::Instant;

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};

use super::buffer::TitleBuffer;
use super::collection::{ButtonRow, EntityCollection, Row, RowKey};
use super::completion::{commit, CommitOutcome, CompletionCommitter, Items};
use super::constants::*;
use super::focus::preserve_focus;
use crate::core::{Patch, TodoApi};
use crate::model::{EntityId, ListDescriptor, Task, TodoItem};

mod input;
mod render;

pub(crate) use input::KeyOutcome;

type Lists = EntityCollection<ListDescriptor, ButtonRow>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    ListSelection,
    TaskBrowsing,
    SubtaskBrowsing,
    CreateDialog,
    EditDialog,
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordKey {
    List(EntityId),
    Task(EntityId),
}

/// The entity whose children are on screen.
#[derive(Debug, Clone)]
pub(crate) enum ActiveRecord {
    List(ListDescriptor),
    Task(Task),
}

impl ActiveRecord {
    pub(crate) fn key(&self) -> RecordKey {
        match self {
            ActiveRecord::List(list) => RecordKey::List(list.id),
            ActiveRecord::Task(task) => RecordKey::Task(task.id),
        }
    }

    pub(crate) fn id(&self) -> EntityId {
        match self {
            ActiveRecord::List(list) => list.id,
            ActiveRecord::Task(task) => task.id,
        }
    }

    /// Records are the same when their ids match; the service allocates ids
    /// from one sequence for every kind.
    pub(crate) fn same_record(&self, other: &ActiveRecord) -> bool {
        self.id() == other.id()
    }

    pub(crate) fn title(&self) -> &str {
        match self {
            ActiveRecord::List(list) => &list.title,
            ActiveRecord::Task(task) => &task.title,
        }
    }

    fn browse_mode(&self) -> Mode {
        match self {
            ActiveRecord::List(_) => Mode::TaskBrowsing,
            ActiveRecord::Task(_) => Mode::SubtaskBrowsing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmChoice {
    Yes,
    No,
}

impl ConfirmChoice {
    fn toggle(self) -> Self {
        match self {
            ConfirmChoice::Yes => ConfirmChoice::No,
            ConfirmChoice::No => ConfirmChoice::Yes,
        }
    }
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    kind: StatusKind,
    created_at: Instant,
}

impl StatusMessage {
    fn new<T: Into<String>>(text: T, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: Instant::now(),
        }
    }

    fn style(&self) -> Style {
        match self.kind {
            StatusKind::Info => Style::default().fg(Color::Cyan),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusKind {
    Info,
    Error,
}

pub(crate) struct App {
    api: Box<dyn TodoApi>,
    mode: Mode,
    active: Option<ActiveRecord>,
    current_list: Option<ListDescriptor>,
    lists: Lists,
    items: Items,
    show_completed: bool,
    editor: TitleBuffer,
    editing: Option<RowKey>,
    pending_delete: Option<RowKey>,
    confirm_choice: ConfirmChoice,
    completions: CompletionCommitter,
    status: Option<StatusMessage>,
    should_quit: bool,
}

impl App {
    /// Load the lists and, when `start_list` names one, open it straight away.
    pub(crate) fn new(api: Box<dyn TodoApi>, start_list: Option<&str>) -> Self {
        let mut app = Self {
            api,
            mode: Mode::ListSelection,
            active: None,
            current_list: None,
            lists: Lists::new(),
            items: Items::new(),
            show_completed: false,
            editor: TitleBuffer::new(),
            editing: None,
            pending_delete: None,
            confirm_choice: ConfirmChoice::No,
            completions: CompletionCommitter::default(),
            status: None,
            should_quit: false,
        };

        if let Err(err) = app.refresh_lists(true) {
            app.report(err);
            return app;
        }
        if let Some(title) = start_list {
            if let Err(err) = app.open_list_titled(title) {
                app.report(err);
            }
        }
        app
    }

    fn open_list_titled(&mut self, title: &str) -> Result<()> {
        let list = self.api.find_list_by_title(title)?;
        let found = self.lists.iter().position(|(l, _)| l.id == list.id);
        if let Some(index) = found {
            if let Err(err) = self.lists.set_focus_position(index) {
                tracing::debug!(error = %err, "start list not focusable");
            }
        }
        self.set_active(ActiveRecord::List(list))
    }

    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    pub(crate) fn active(&self) -> Option<&ActiveRecord> {
        self.active.as_ref()
    }

    pub(crate) fn show_completed(&self) -> bool {
        self.show_completed
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub(crate) fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }

    /// Earliest pending completion deadline, for sizing the poll timeout.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.completions.next_deadline()
    }

    pub(crate) fn on_tick(&mut self) {
        if let Some(status) = &self.status {
            if status.created_at.elapsed() > STATUS_TTL {
                self.status = None;
            }
        }
        self.process_timers(Instant::now());
    }

    /// Commit every completion whose delay has elapsed by `now`.
    pub(crate) fn process_timers(&mut self, now: Instant) {
        for pending in self.completions.fire_due(now) {
            let title = pending.item.title().to_string();
            match commit(self.api.as_ref(), &mut self.items, pending) {
                Ok(CommitOutcome::Removed) => self.set_status_info(format!("Completed \"{}\"", title)),
                Ok(CommitOutcome::Replaced) => self.set_status_info(format!("Reopened \"{}\"", title)),
                Ok(CommitOutcome::Detached) => {}
                Err(err) => {
                    self.set_status_error(format!("Could not update \"{}\": {}", title, err))
                }
            }
        }
    }

    /// Browsing mode for the active record.
    fn browse_mode(&self) -> Mode {
        self.active
            .as_ref()
            .map(ActiveRecord::browse_mode)
            .unwrap_or(Mode::ListSelection)
    }

    pub(crate) fn set_active(&mut self, record: ActiveRecord) -> Result<()> {
        let reset = !self
            .active
            .as_ref()
            .is_some_and(|previous| previous.same_record(&record));
        let fresh = self.fetch_children(&record)?;

        self.mode = record.browse_mode();
        if let ActiveRecord::List(list) = &record {
            self.current_list = Some(list.clone());
        }
        self.active = Some(record);
        preserve_focus(&mut self.items, reset, 0, |items| {
            items.clear();
            items.extend(fresh);
        });
        Ok(())
    }

    fn fetch_children(&self, record: &ActiveRecord) -> Result<Vec<TodoItem>> {
        let items = match record {
            ActiveRecord::List(list) => self
                .api
                .get_tasks(list.id, self.show_completed)?
                .into_iter()
                .map(TodoItem::Task)
                .collect(),
            ActiveRecord::Task(task) => self
                .api
                .get_subtasks(task.id, self.show_completed)?
                .into_iter()
                .map(TodoItem::Subtask)
                .collect(),
        };
        Ok(items)
    }

    fn refresh_lists(&mut self, reset: bool) -> Result<()> {
        let fresh = self.api.get_lists()?;
        preserve_focus(&mut self.lists, reset, 0, |lists| {
            lists.clear();
            lists.extend(fresh);
        });
        Ok(())
    }

    fn refresh_items(&mut self, reset: bool) -> Result<()> {
        let Some(record) = &self.active else {
            return Ok(());
        };
        let fresh = self.fetch_children(record)?;
        preserve_focus(&mut self.items, reset, 0, |items| {
            items.clear();
            items.extend(fresh);
        });
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        match self.mode {
            Mode::ListSelection => self.refresh_lists(false)?,
            _ => self.refresh_items(true)?,
        }
        self.set_status_info(STATUS_REFRESHED);
        Ok(())
    }

    fn drill_in(&mut self) -> Result<()> {
        let record = match self.mode {
            Mode::ListSelection => self
                .lists
                .focused()
                .map(|(_, list)| ActiveRecord::List(list.clone())),
            Mode::TaskBrowsing => match self.items.focused() {
                Some((_, TodoItem::Task(task))) => Some(ActiveRecord::Task(task.clone())),
                _ => None,
            },
            _ => return Ok(()),
        };
        match record {
            Some(record) => self.set_active(record),
            None => {
                self.set_status_info(STATUS_NOTHING_FOCUSED);
                Ok(())
            }
        }
    }

    fn go_back(&mut self) -> Result<()> {
        match self.active.clone() {
            Some(ActiveRecord::Task(task)) => {
                let list = self.api.get_list(task.list_id)?;
                self.set_active(ActiveRecord::List(list))
            }
            Some(ActiveRecord::List(_)) => {
                self.current_list = None;
                self.mode = Mode::ListSelection;
                self.refresh_lists(false)
            }
            None => Ok(()),
        }
    }

    fn toggle_show_completed(&mut self) -> Result<()> {
        self.show_completed = !self.show_completed;
        if let Err(err) = self.refresh_items(true) {
            self.show_completed = !self.show_completed;
            return Err(err);
        }
        self.set_status_info(if self.show_completed {
            "Showing completed items"
        } else {
            "Showing open items"
        });
        Ok(())
    }

    fn toggle_completion(&mut self, now: Instant) {
        match self.items.focus_position() {
            Ok(index) => {
                self.completions.toggle(&mut self.items, index, now);
            }
            Err(_) => self.set_status_info(STATUS_NOTHING_FOCUSED),
        }
    }

    fn focused_row_key(&self) -> Option<RowKey> {
        let index = self.items.focus_position().ok()?;
        Some(self.items.row(index).key())
    }

    fn begin_create(&mut self) {
        self.editor.clear();
        self.mode = Mode::CreateDialog;
    }

    fn begin_edit(&mut self) {
        let Some(key) = self.focused_row_key() else {
            self.set_status_info(STATUS_NOTHING_FOCUSED);
            return;
        };
        if let Some(index) = self.items.position_of(key) {
            self.editor.set(self.items.get(index).title());
        }
        self.editing = Some(key);
        self.mode = Mode::EditDialog;
    }

    fn close_dialog(&mut self) {
        self.editor.clear();
        self.editing = None;
        self.pending_delete = None;
        self.mode = self.browse_mode();
    }

    fn submit_editor(&mut self) -> Result<()> {
        let title = self.editor.as_str().to_string();
        let mode = self.mode;
        let editing = self.editing;
        self.close_dialog();
        if title.is_empty() {
            return Ok(());
        }
        match (mode, editing) {
            (Mode::CreateDialog, _) => self.create_item(title),
            (Mode::EditDialog, Some(key)) => self.rename_item(key, title),
            _ => Ok(()),
        }
    }

    fn create_item(&mut self, title: String) -> Result<()> {
        let patch = Patch::new().title(title);
        let created: TodoItem = match &self.active {
            Some(ActiveRecord::List(list)) => self.api.create_task(list.id, &patch)?.into(),
            Some(ActiveRecord::Task(task)) => self.api.create_subtask(task.id, &patch)?.into(),
            None => return Err(anyhow!("open a list before adding tasks")),
        };
        tracing::info!(id = created.id(), kind = created.kind().as_str(), "item created");

        let message = format!("Created \"{}\"", created.title());
        if created.completed() == self.show_completed {
            preserve_focus(&mut self.items, false, 1, |items| items.insert(0, created));
        }
        self.set_status_info(message);
        Ok(())
    }

    fn rename_item(&mut self, key: RowKey, title: String) -> Result<()> {
        let Some(index) = self.items.position_of(key) else {
            self.set_status_info("That item is no longer listed");
            return Ok(());
        };
        let item = self.items.get(index).clone();
        if item.title() == title {
            return Ok(());
        }
        let updated = self.api.update_item(&item, &Patch::new().title(title))?;

        let Some(index) = self.items.position_of(key) else {
            return Ok(());
        };
        let (alarm, checked) = {
            let row = self.items.row(index);
            (row.alarm, row.checked)
        };
        self.set_status_info(format!("Renamed to \"{}\"", updated.title()));
        self.items.set(index, updated);
        if alarm.is_some() {
            let row = self.items.row_mut(index);
            row.alarm = alarm;
            row.checked = checked;
        }
        Ok(())
    }

    fn prompt_delete(&mut self) {
        let Some(key) = self.focused_row_key() else {
            self.set_status_info(STATUS_NOTHING_FOCUSED);
            return;
        };
        self.pending_delete = Some(key);
        self.confirm_choice = ConfirmChoice::No;
        self.mode = Mode::ConfirmDelete;
    }

    fn confirm_delete(&mut self) -> Result<()> {
        let target = self.pending_delete;
        let choice = self.confirm_choice;
        self.close_dialog();
        match (choice, target) {
            (ConfirmChoice::Yes, Some(key)) => self.delete_item(key),
            _ => {
                self.set_status_info(STATUS_DELETE_CANCELLED);
                Ok(())
            }
        }
    }

    fn delete_item(&mut self, key: RowKey) -> Result<()> {
        let Some(index) = self.items.position_of(key) else {
            return Ok(());
        };
        let item = self.items.get(index).clone();
        self.api.delete_item(&item)?;
        tracing::info!(id = item.id(), kind = item.kind().as_str(), "item deleted");

        if let Some(index) = self.items.position_of(key) {
            self.completions.cancel_row(&mut self.items, index);
            preserve_focus(&mut self.items, false, 0, |items| {
                items.delete(index);
            });
        }
        self.set_status_info(format!("Deleted \"{}\"", item.title()));
        Ok(())
    }

    fn report(&mut self, err: anyhow::Error) {
        tracing::warn!(error = %err, "action failed");
        self.set_status_error(err.to_string());
    }

    pub(crate) fn set_status_info<T: Into<String>>(&mut self, message: T) {
        let mut text = String::from("ℹ️  ");
        text.push_str(&message.into());
        self.status = Some(StatusMessage::new(text, StatusKind::Info));
    }

    pub(crate) fn set_status_error<T: Into<String>>(&mut self, message: T) {
        let mut text = String::from("⚠️  ");
        text.push_str(&message.into());
        self.status = Some(StatusMessage::new(text, StatusKind::Error));
    }
}
