use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Longest title the remote service accepts, counted in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

pub type EntityId = u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Inbox,
    #[default]
    #[serde(alias = "list")]
    Normal,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::Inbox => "inbox",
            ListType::Normal => "normal",
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ListType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inbox" => Ok(ListType::Inbox),
            "normal" | "list" => Ok(ListType::Normal),
            other => Err(anyhow!("Unknown list type '{}': expected inbox|normal", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListDescriptor {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub list_type: ListType,
    #[serde(default)]
    pub revision: u64,
}

impl ListDescriptor {
    pub fn is_inbox(&self) -> bool {
        self.list_type == ListType::Inbox
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: EntityId,
    pub list_id: EntityId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub revision: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub starred: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subtask {
    pub id: EntityId,
    pub task_id: EntityId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub revision: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Declared display order for the children of one container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionList {
    pub id: EntityId,
    #[serde(default)]
    pub values: Vec<EntityId>,
    #[serde(default)]
    pub revision: u64,
}

/// Entities that can be ordered by a [`PositionList`].
pub trait Identified {
    fn id(&self) -> EntityId;
}

impl Identified for ListDescriptor {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Identified for Task {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Identified for Subtask {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// The two kinds of completable entity, used to pick property sets and endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Task,
    Subtask,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Task => "task",
            ItemKind::Subtask => "subtask",
        }
    }

    pub(crate) fn collection(&self) -> &'static str {
        match self {
            ItemKind::Task => "tasks",
            ItemKind::Subtask => "subtasks",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A row in the task browser: either a task of a list or a subtask of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoItem {
    Task(Task),
    Subtask(Subtask),
}

impl TodoItem {
    pub fn id(&self) -> EntityId {
        match self {
            TodoItem::Task(task) => task.id,
            TodoItem::Subtask(subtask) => subtask.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            TodoItem::Task(task) => &task.title,
            TodoItem::Subtask(subtask) => &subtask.title,
        }
    }

    pub fn completed(&self) -> bool {
        match self {
            TodoItem::Task(task) => task.completed,
            TodoItem::Subtask(subtask) => subtask.completed,
        }
    }

    pub fn revision(&self) -> u64 {
        match self {
            TodoItem::Task(task) => task.revision,
            TodoItem::Subtask(subtask) => subtask.revision,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            TodoItem::Task(_) => ItemKind::Task,
            TodoItem::Subtask(_) => ItemKind::Subtask,
        }
    }

    pub fn starred(&self) -> bool {
        matches!(self, TodoItem::Task(task) if task.starred)
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        match self {
            TodoItem::Task(task) => task.due_date,
            TodoItem::Subtask(_) => None,
        }
    }
}

impl From<Task> for TodoItem {
    fn from(task: Task) -> Self {
        TodoItem::Task(task)
    }
}

impl From<Subtask> for TodoItem {
    fn from(subtask: Subtask) -> Self {
        TodoItem::Subtask(subtask)
    }
}

impl Identified for TodoItem {
    fn id(&self) -> EntityId {
        TodoItem::id(self)
    }
}

/// Outcome of deleting one task by id from the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    pub id: EntityId,
    pub deleted: bool,
}

/// Outcome of completing one task by id from the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub id: EntityId,
    pub found: bool,
    pub changed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_descriptor_deserializes_wire_shape() {
        let raw = r#"{"id": 1, "title": "inbox", "list_type": "inbox", "revision": 4, "type": "list"}"#;
        let list: ListDescriptor = serde_json::from_str(raw).expect("decode list");
        assert_eq!(list.id, 1);
        assert!(list.is_inbox());
        assert_eq!(list.revision, 4);
    }

    #[test]
    fn list_type_defaults_to_normal_and_accepts_list_alias() {
        let raw = r#"{"id": 2, "title": "Work", "list_type": "list"}"#;
        let list: ListDescriptor = serde_json::from_str(raw).expect("decode list");
        assert_eq!(list.list_type, ListType::Normal);

        let raw = r#"{"id": 3, "title": "Home"}"#;
        let list: ListDescriptor = serde_json::from_str(raw).expect("decode list");
        assert_eq!(list.list_type, ListType::Normal);
    }

    #[test]
    fn task_deserializes_optional_properties() {
        let raw = r#"{
            "id": 10, "list_id": 2, "title": "Buy milk", "completed": false,
            "revision": 7, "starred": true, "due_date": "2024-05-01",
            "created_at": "2024-04-01T10:00:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(raw).expect("decode task");
        assert_eq!(task.revision, 7);
        assert!(task.starred);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!(task.assignee_id.is_none());
    }

    #[test]
    fn todo_item_exposes_common_fields() {
        let subtask = Subtask {
            id: 5,
            task_id: 10,
            title: "Whole milk".into(),
            completed: true,
            revision: 2,
            created_at: None,
        };
        let item = TodoItem::from(subtask);
        assert_eq!(item.id(), 5);
        assert_eq!(item.title(), "Whole milk");
        assert!(item.completed());
        assert_eq!(item.kind(), ItemKind::Subtask);
        assert!(!item.starred());
    }
}
