use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::model::{ItemKind, MAX_TITLE_LENGTH};

pub const TASK_CREATE_PROPERTIES: &[&str] = &[
    "title",
    "assignee_id",
    "completed",
    "recurrence_type",
    "recurrence_count",
    "due_date",
    "starred",
];

pub const TASK_UPDATE_PROPERTIES: &[&str] = &[
    "title",
    "assignee_id",
    "completed",
    "recurrence_type",
    "recurrence_count",
    "due_date",
    "starred",
    "remove",
];

pub const SUBTASK_PROPERTIES: &[&str] = &["title", "completed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOp {
    Create,
    Update,
}

/// Property bag sent with create and update calls.
///
/// Keys are checked against the allowed set for the entity kind before the
/// request leaves the client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    fields: BTreeMap<String, Value>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title<T: Into<String>>(self, title: T) -> Self {
        self.set("title", Value::String(title.into()))
    }

    pub fn completed(self, completed: bool) -> Self {
        self.set("completed", Value::Bool(completed))
    }

    pub fn starred(self, starred: bool) -> Self {
        self.set("starred", Value::Bool(starred))
    }

    pub fn due_date(self, date: NaiveDate) -> Self {
        self.set("due_date", Value::String(date.format("%Y-%m-%d").to_string()))
    }

    pub fn set<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Parse a `key=value` assignment; JSON literals are kept typed, anything
    /// else becomes a string.
    pub fn with_assignment(self, assignment: &str) -> Result<Self, ApiError> {
        let Some((key, raw)) = assignment.split_once('=') else {
            return Err(ApiError::validation(format!(
                "expected key=value, got '{}'",
                assignment
            )));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(ApiError::validation("property name cannot be empty"));
        }
        let value = serde_json::from_str(raw.trim())
            .unwrap_or_else(|_| Value::String(raw.trim().to_string()));
        Ok(self.set(key, value))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn validate(&self, kind: ItemKind, op: PatchOp) -> Result<(), ApiError> {
        let allowed = allowed_properties(kind, op);
        let unknown: Vec<&str> = self
            .keys()
            .filter(|key| !allowed.contains(key))
            .collect();
        if !unknown.is_empty() {
            return Err(ApiError::validation(format!(
                "unsupported {} properties: {}",
                kind,
                unknown.join(", ")
            )));
        }

        match (self.fields.get("title"), op) {
            (None, PatchOp::Create) => {
                return Err(ApiError::validation("title is required"));
            }
            (Some(Value::String(title)), _) => {
                if title.chars().count() > MAX_TITLE_LENGTH {
                    return Err(ApiError::validation(format!(
                        "title exceeds {} characters",
                        MAX_TITLE_LENGTH
                    )));
                }
            }
            (Some(_), _) => return Err(ApiError::validation("title must be a string")),
            (None, PatchOp::Update) => {}
        }

        Ok(())
    }

    pub(crate) fn into_body(self) -> Map<String, Value> {
        self.fields.into_iter().collect()
    }
}

pub fn allowed_properties(kind: ItemKind, op: PatchOp) -> &'static [&'static str] {
    match (kind, op) {
        (ItemKind::Task, PatchOp::Create) => TASK_CREATE_PROPERTIES,
        (ItemKind::Task, PatchOp::Update) => TASK_UPDATE_PROPERTIES,
        (ItemKind::Subtask, _) => SUBTASK_PROPERTIES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn create_requires_title() {
        let err = Patch::new()
            .completed(false)
            .validate(ItemKind::Task, PatchOp::Create)
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "invalid request: title is required");
    }

    #[test]
    fn update_does_not_require_title() {
        Patch::new()
            .completed(true)
            .validate(ItemKind::Task, PatchOp::Update)
            .expect("valid update");
    }

    #[rstest]
    #[case(ItemKind::Task, PatchOp::Create, "remove", false)]
    #[case(ItemKind::Task, PatchOp::Update, "remove", true)]
    #[case(ItemKind::Task, PatchOp::Update, "starred", true)]
    #[case(ItemKind::Subtask, PatchOp::Update, "starred", false)]
    #[case(ItemKind::Subtask, PatchOp::Update, "completed", true)]
    #[case(ItemKind::Task, PatchOp::Update, "list_id", false)]
    fn property_sets_follow_entity_kind(
        #[case] kind: ItemKind,
        #[case] op: PatchOp,
        #[case] key: &str,
        #[case] accepted: bool,
    ) {
        let patch = Patch::new().title("t").set(key, true);
        assert_eq!(patch.validate(kind, op).is_ok(), accepted);
    }

    #[test]
    fn unknown_keys_are_listed_sorted() {
        let err = Patch::new()
            .title("t")
            .set("zeta", 1)
            .set("alpha", 2)
            .validate(ItemKind::Task, PatchOp::Create)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid request: unsupported task properties: alpha, zeta"
        );
    }

    #[test]
    fn long_titles_are_rejected() {
        let title = "x".repeat(MAX_TITLE_LENGTH + 1);
        let err = Patch::new()
            .title(title)
            .validate(ItemKind::Task, PatchOp::Create)
            .unwrap_err();
        assert!(err.is_validation());

        let title = "x".repeat(MAX_TITLE_LENGTH);
        Patch::new()
            .title(title)
            .validate(ItemKind::Task, PatchOp::Create)
            .expect("boundary title accepted");
    }

    #[test]
    fn assignments_keep_json_literals_typed() {
        let patch = Patch::new()
            .with_assignment("starred=true")
            .and_then(|p| p.with_assignment("recurrence_count = 3"))
            .and_then(|p| p.with_assignment("recurrence_type=week"))
            .expect("parse assignments");
        assert_eq!(patch.get("starred"), Some(&Value::Bool(true)));
        assert_eq!(patch.get("recurrence_count"), Some(&Value::from(3)));
        assert_eq!(
            patch.get("recurrence_type"),
            Some(&Value::String("week".into()))
        );

        assert!(Patch::new().with_assignment("starred").is_err());
    }
}
