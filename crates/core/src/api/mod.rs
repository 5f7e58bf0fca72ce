//! Client for the hosted to-do service.
//!
//! [`TodoApi`] is the seam the UI talks to. [`TodoClient`] implements it on top
//! of any [`Transport`], validating property sets before a request is built.

mod transport;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::model::{EntityId, ItemKind, ListDescriptor, PositionList, Subtask, Task, TodoItem};
use crate::ordering::{move_inbox_to_front, reorder};
use crate::patch::{Patch, PatchOp};

pub use transport::{ApiRequest, HttpTransport, Method, Transport};

pub trait TodoApi {
    /// All lists, in declared order with the inbox first.
    fn get_lists(&self) -> Result<Vec<ListDescriptor>, ApiError>;
    fn get_list(&self, id: EntityId) -> Result<ListDescriptor, ApiError>;
    fn get_tasks(&self, list_id: EntityId, completed: bool) -> Result<Vec<Task>, ApiError>;
    fn get_subtasks(&self, task_id: EntityId, completed: bool) -> Result<Vec<Subtask>, ApiError>;
    fn create_task(&self, list_id: EntityId, patch: &Patch) -> Result<Task, ApiError>;
    fn create_subtask(&self, task_id: EntityId, patch: &Patch) -> Result<Subtask, ApiError>;
    fn update_task(&self, task: &Task, patch: &Patch) -> Result<Task, ApiError>;
    fn update_subtask(&self, subtask: &Subtask, patch: &Patch) -> Result<Subtask, ApiError>;
    fn delete_task(&self, task: &Task) -> Result<(), ApiError>;
    fn delete_subtask(&self, subtask: &Subtask) -> Result<(), ApiError>;

    /// The single list titled `title`.
    fn find_list_by_title(&self, title: &str) -> Result<ListDescriptor, ApiError> {
        let mut matches: Vec<ListDescriptor> = self
            .get_lists()?
            .into_iter()
            .filter(|list| list.title == title)
            .collect();
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(ApiError::lookup(format!("no list titled '{}'", title))),
            n => Err(ApiError::lookup(format!(
                "{} lists titled '{}'; rename one to disambiguate",
                n, title
            ))),
        }
    }

    fn update_item(&self, item: &TodoItem, patch: &Patch) -> Result<TodoItem, ApiError> {
        match item {
            TodoItem::Task(task) => self.update_task(task, patch).map(TodoItem::Task),
            TodoItem::Subtask(subtask) => self.update_subtask(subtask, patch).map(TodoItem::Subtask),
        }
    }

    fn delete_item(&self, item: &TodoItem) -> Result<(), ApiError> {
        match item {
            TodoItem::Task(task) => self.delete_task(task),
            TodoItem::Subtask(subtask) => self.delete_subtask(subtask),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    pub inbox_first: bool,
    pub use_positions: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            inbox_first: true,
            use_positions: true,
        }
    }
}

impl From<&AppConfig> for ClientOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            inbox_first: config.inbox_first(),
            use_positions: config.use_positions(),
        }
    }
}

pub struct TodoClient<T: Transport> {
    transport: T,
    options: ClientOptions,
}

impl TodoClient<HttpTransport> {
    pub fn connect(config: &AppConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(transport, ClientOptions::from(config)))
    }
}

impl<T: Transport> TodoClient<T> {
    pub fn new(transport: T, options: ClientOptions) -> Self {
        Self { transport, options }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn fetch<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        let value = self.transport.send(request)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Positions endpoints answer with a one-element array per container.
    fn fetch_positions(&self, request: ApiRequest) -> Result<Vec<EntityId>, ApiError> {
        let path = request.path.clone();
        let mut positions: Vec<PositionList> = self.fetch(request)?;
        if positions.len() != 1 {
            return Err(ApiError::lookup(format!(
                "expected one position list from {}, got {}",
                path,
                positions.len()
            )));
        }
        Ok(positions.remove(0).values)
    }

    fn create<R: DeserializeOwned>(
        &self,
        kind: ItemKind,
        parent: (&'static str, EntityId),
        patch: &Patch,
    ) -> Result<R, ApiError> {
        patch.validate(kind, PatchOp::Create)?;
        let mut body = patch.clone().into_body();
        body.insert(parent.0.to_string(), json!(parent.1));
        tracing::debug!(kind = kind.as_str(), parent = parent.1, "creating item");
        self.fetch(ApiRequest::post(kind.collection(), Value::Object(body)))
    }

    fn update<R: DeserializeOwned>(
        &self,
        kind: ItemKind,
        id: EntityId,
        revision: u64,
        patch: &Patch,
    ) -> Result<R, ApiError> {
        patch.validate(kind, PatchOp::Update)?;
        let mut body = patch.clone().into_body();
        body.insert("revision".to_string(), json!(revision));
        tracing::debug!(kind = kind.as_str(), id, revision, "updating item");
        self.fetch(ApiRequest::patch(
            format!("{}/{}", kind.collection(), id),
            Value::Object(body),
        ))
    }

    fn delete(&self, kind: ItemKind, id: EntityId, revision: u64) -> Result<(), ApiError> {
        tracing::debug!(kind = kind.as_str(), id, revision, "deleting item");
        self.transport.send(
            ApiRequest::delete(format!("{}/{}", kind.collection(), id)).query("revision", revision),
        )?;
        Ok(())
    }
}

impl<T: Transport> TodoApi for TodoClient<T> {
    fn get_lists(&self) -> Result<Vec<ListDescriptor>, ApiError> {
        let lists: Vec<ListDescriptor> = self.fetch(ApiRequest::get("lists"))?;
        let mut ordered = if self.options.use_positions {
            let positions = self.fetch_positions(ApiRequest::get("list_positions"))?;
            reorder(lists, &positions)
        } else {
            lists
        };
        if self.options.inbox_first {
            move_inbox_to_front(&mut ordered);
        }
        tracing::debug!(count = ordered.len(), "fetched lists");
        Ok(ordered)
    }

    fn get_list(&self, id: EntityId) -> Result<ListDescriptor, ApiError> {
        self.fetch(ApiRequest::get(format!("lists/{}", id)))
    }

    fn get_tasks(&self, list_id: EntityId, completed: bool) -> Result<Vec<Task>, ApiError> {
        let tasks: Vec<Task> = self.fetch(
            ApiRequest::get("tasks")
                .query("list_id", list_id)
                .query("completed", completed),
        )?;
        let tasks = if self.options.use_positions {
            let positions =
                self.fetch_positions(ApiRequest::get("task_positions").query("list_id", list_id))?;
            reorder(tasks, &positions)
        } else {
            tasks
        };
        tracing::debug!(list_id, completed, count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    fn get_subtasks(&self, task_id: EntityId, completed: bool) -> Result<Vec<Subtask>, ApiError> {
        let subtasks: Vec<Subtask> = self.fetch(
            ApiRequest::get("subtasks")
                .query("task_id", task_id)
                .query("completed", completed),
        )?;
        let subtasks = if self.options.use_positions {
            let positions = self.fetch_positions(
                ApiRequest::get("subtask_positions").query("task_id", task_id),
            )?;
            reorder(subtasks, &positions)
        } else {
            subtasks
        };
        tracing::debug!(task_id, completed, count = subtasks.len(), "fetched subtasks");
        Ok(subtasks)
    }

    fn create_task(&self, list_id: EntityId, patch: &Patch) -> Result<Task, ApiError> {
        self.create(ItemKind::Task, ("list_id", list_id), patch)
    }

    fn create_subtask(&self, task_id: EntityId, patch: &Patch) -> Result<Subtask, ApiError> {
        self.create(ItemKind::Subtask, ("task_id", task_id), patch)
    }

    fn update_task(&self, task: &Task, patch: &Patch) -> Result<Task, ApiError> {
        self.update(ItemKind::Task, task.id, task.revision, patch)
    }

    fn update_subtask(&self, subtask: &Subtask, patch: &Patch) -> Result<Subtask, ApiError> {
        self.update(ItemKind::Subtask, subtask.id, subtask.revision, patch)
    }

    fn delete_task(&self, task: &Task) -> Result<(), ApiError> {
        self.delete(ItemKind::Task, task.id, task.revision)
    }

    fn delete_subtask(&self, subtask: &Subtask) -> Result<(), ApiError> {
        self.delete(ItemKind::Subtask, subtask.id, subtask.revision)
    }
}

#[cfg(test)]
mod tests;
