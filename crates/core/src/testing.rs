//! In-memory stand-in for the remote service, used by tests across the workspace.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::api::{ApiRequest, ClientOptions, Method, TodoClient, Transport};
use crate::error::ApiError;
use crate::model::{EntityId, ListDescriptor, ListType, Subtask, Task};

#[derive(Debug, Default)]
struct ServiceState {
    lists: Vec<ListDescriptor>,
    list_positions: Vec<EntityId>,
    tasks: Vec<Task>,
    task_positions: HashMap<EntityId, Vec<EntityId>>,
    subtasks: Vec<Subtask>,
    subtask_positions: HashMap<EntityId, Vec<EntityId>>,
    next_id: EntityId,
    requests: Vec<ApiRequest>,
    fail_next: Option<(u16, String)>,
}

/// Simulated service with revision checks and a request log.
///
/// Clones share state, so a test can keep a handle after moving one into a client.
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    state: Rc<RefCell<ServiceState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.state.borrow_mut().next_id = 1000;
        fake
    }

    /// A client over a shared handle to this fake.
    pub fn client(&self) -> TodoClient<FakeTransport> {
        TodoClient::new(self.clone(), ClientOptions::default())
    }

    pub fn with_list(self, id: EntityId, title: &str, list_type: ListType) -> Self {
        self.state.borrow_mut().lists.push(ListDescriptor {
            id,
            title: title.to_string(),
            list_type,
            revision: 1,
        });
        self
    }

    pub fn with_list_positions(self, positions: Vec<EntityId>) -> Self {
        self.state.borrow_mut().list_positions = positions;
        self
    }

    pub fn with_task(self, list_id: EntityId, id: EntityId, title: &str, completed: bool) -> Self {
        self.state.borrow_mut().tasks.push(Task {
            id,
            list_id,
            title: title.to_string(),
            completed,
            revision: 1,
            assignee_id: None,
            recurrence_type: None,
            recurrence_count: None,
            due_date: None,
            starred: false,
            created_at: None,
        });
        self
    }

    pub fn with_task_positions(self, list_id: EntityId, positions: Vec<EntityId>) -> Self {
        self.state
            .borrow_mut()
            .task_positions
            .insert(list_id, positions);
        self
    }

    pub fn with_subtask(
        self,
        task_id: EntityId,
        id: EntityId,
        title: &str,
        completed: bool,
    ) -> Self {
        self.state.borrow_mut().subtasks.push(Subtask {
            id,
            task_id,
            title: title.to_string(),
            completed,
            revision: 1,
            created_at: None,
        });
        self
    }

    /// Make the next request fail with `status`.
    pub fn fail_next(&self, status: u16, message: &str) {
        self.state.borrow_mut().fail_next = Some((status, message.to_string()));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.borrow().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.borrow().requests.len()
    }

    pub fn count(&self, method: Method, path_prefix: &str) -> usize {
        self.state
            .borrow()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(path_prefix))
            .count()
    }

    pub fn clear_requests(&self) {
        self.state.borrow_mut().requests.clear();
    }

    pub fn list(&self, id: EntityId) -> Option<ListDescriptor> {
        self.state.borrow().lists.iter().find(|l| l.id == id).cloned()
    }

    pub fn task(&self, id: EntityId) -> Option<Task> {
        self.state.borrow().tasks.iter().find(|t| t.id == id).cloned()
    }

    pub fn subtask(&self, id: EntityId) -> Option<Subtask> {
        self.state
            .borrow()
            .subtasks
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    /// Bump a task's revision as if another client had edited it.
    pub fn touch_task(&self, id: EntityId) {
        if let Some(task) = self
            .state
            .borrow_mut()
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
        {
            task.revision += 1;
        }
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let mut state = self.state.borrow_mut();
        state.requests.push(request.clone());

        if let Some((status, message)) = state.fail_next.take() {
            return Err(remote(&request, status, &message));
        }

        let segments: Vec<&str> = request.path.split('/').collect();
        match (request.method, segments.as_slice()) {
            (Method::Get, ["lists"]) => encode(&state.lists),
            (Method::Get, ["lists", id]) => {
                let id = parse_id(&request, id)?;
                match state.lists.iter().find(|l| l.id == id) {
                    Some(list) => encode(list),
                    None => Err(remote(&request, 404, "not found")),
                }
            }
            (Method::Get, ["list_positions"]) => Ok(json!([{
                "id": 1,
                "values": state.list_positions,
                "revision": 1,
            }])),
            (Method::Get, ["tasks"]) => {
                let list_id = query_id(&request, "list_id")?;
                let completed = request.query_value("completed") == Some("true");
                let tasks: Vec<&Task> = state
                    .tasks
                    .iter()
                    .filter(|t| t.list_id == list_id && t.completed == completed)
                    .collect();
                encode(&tasks)
            }
            (Method::Get, ["task_positions"]) => {
                let list_id = query_id(&request, "list_id")?;
                let values = state.task_positions.get(&list_id).cloned().unwrap_or_default();
                Ok(json!([{ "id": list_id, "values": values, "revision": 1 }]))
            }
            (Method::Get, ["subtasks"]) => {
                let task_id = query_id(&request, "task_id")?;
                let completed = request.query_value("completed") == Some("true");
                let subtasks: Vec<&Subtask> = state
                    .subtasks
                    .iter()
                    .filter(|s| s.task_id == task_id && s.completed == completed)
                    .collect();
                encode(&subtasks)
            }
            (Method::Get, ["subtask_positions"]) => {
                let task_id = query_id(&request, "task_id")?;
                let values = state
                    .subtask_positions
                    .get(&task_id)
                    .cloned()
                    .unwrap_or_default();
                Ok(json!([{ "id": task_id, "values": values, "revision": 1 }]))
            }
            (Method::Post, ["tasks"]) => {
                let id = state.allocate_id();
                let task: Task = created(&request, id)?;
                state.tasks.push(task.clone());
                encode(&task)
            }
            (Method::Post, ["subtasks"]) => {
                let id = state.allocate_id();
                let subtask: Subtask = created(&request, id)?;
                state.subtasks.push(subtask.clone());
                encode(&subtask)
            }
            (Method::Patch, ["tasks", id]) => {
                let id = parse_id(&request, id)?;
                let idx = find_index(&request, state.tasks.iter().map(|t| (t.id, t.revision)), id)?;
                let updated: Task = patched(&request, &state.tasks[idx])?;
                state.tasks[idx] = updated.clone();
                encode(&updated)
            }
            (Method::Patch, ["subtasks", id]) => {
                let id = parse_id(&request, id)?;
                let idx = find_index(
                    &request,
                    state.subtasks.iter().map(|s| (s.id, s.revision)),
                    id,
                )?;
                let updated: Subtask = patched(&request, &state.subtasks[idx])?;
                state.subtasks[idx] = updated.clone();
                encode(&updated)
            }
            (Method::Delete, ["tasks", id]) => {
                let id = parse_id(&request, id)?;
                let idx = find_index(&request, state.tasks.iter().map(|t| (t.id, t.revision)), id)?;
                state.tasks.remove(idx);
                Ok(Value::Null)
            }
            (Method::Delete, ["subtasks", id]) => {
                let id = parse_id(&request, id)?;
                let idx = find_index(
                    &request,
                    state.subtasks.iter().map(|s| (s.id, s.revision)),
                    id,
                )?;
                state.subtasks.remove(idx);
                Ok(Value::Null)
            }
            _ => Err(remote(&request, 404, "no such endpoint")),
        }
    }
}

impl ServiceState {
    fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Value, ApiError> {
    Ok(serde_json::to_value(value)?)
}

fn remote(request: &ApiRequest, status: u16, message: &str) -> ApiError {
    ApiError::Remote {
        method: request.method.as_str(),
        path: request.path.clone(),
        status,
        message: message.to_string(),
    }
}

fn parse_id(request: &ApiRequest, raw: &str) -> Result<EntityId, ApiError> {
    raw.parse()
        .map_err(|_| remote(request, 400, "malformed id"))
}

fn query_id(request: &ApiRequest, key: &str) -> Result<EntityId, ApiError> {
    let raw = request
        .query_value(key)
        .ok_or_else(|| remote(request, 400, "missing parent id"))?;
    parse_id(request, raw)
}

/// The revision a mutation claims to have seen, from the body or the query.
fn claimed_revision(request: &ApiRequest) -> Option<u64> {
    request
        .body
        .as_ref()
        .and_then(|body| body.get("revision"))
        .and_then(Value::as_u64)
        .or_else(|| request.query_value("revision").and_then(|r| r.parse().ok()))
}

fn find_index(
    request: &ApiRequest,
    entries: impl Iterator<Item = (EntityId, u64)>,
    id: EntityId,
) -> Result<usize, ApiError> {
    for (idx, (entry_id, revision)) in entries.enumerate() {
        if entry_id != id {
            continue;
        }
        if claimed_revision(request) != Some(revision) {
            return Err(remote(request, 409, "revision conflict"));
        }
        return Ok(idx);
    }
    Err(remote(request, 404, "not found"))
}

fn created<T: DeserializeOwned>(request: &ApiRequest, id: EntityId) -> Result<T, ApiError> {
    let mut body = request
        .body
        .as_ref()
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    body.insert("id".into(), json!(id));
    body.insert("revision".into(), json!(1));
    body.entry("completed").or_insert(json!(false));
    Ok(serde_json::from_value(Value::Object(body))?)
}

fn patched<T: Serialize + DeserializeOwned>(
    request: &ApiRequest,
    current: &T,
) -> Result<T, ApiError> {
    let Value::Object(mut fields) = serde_json::to_value(current)? else {
        return Err(remote(request, 500, "entity is not an object"));
    };
    let changes: Map<String, Value> = request
        .body
        .as_ref()
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    for (key, value) in changes {
        match key.as_str() {
            "revision" => {}
            "remove" => {
                for name in value.as_array().into_iter().flatten() {
                    if let Some(name) = name.as_str() {
                        fields.remove(name);
                    }
                }
            }
            _ => {
                fields.insert(key, value);
            }
        }
    }

    let revision = fields.get("revision").and_then(Value::as_u64).unwrap_or(0);
    fields.insert("revision".into(), json!(revision + 1));
    Ok(serde_json::from_value(Value::Object(fields))?)
}
