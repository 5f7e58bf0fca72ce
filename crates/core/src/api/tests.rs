use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use super::*;
use crate::model::ListType;
use crate::testing::FakeTransport;

fn sample_service() -> FakeTransport {
    FakeTransport::new()
        .with_list(1, "Inbox", ListType::Inbox)
        .with_list(2, "Work", ListType::Normal)
        .with_list_positions(vec![2, 1])
        .with_task(2, 10, "Write report", false)
        .with_task(2, 11, "File expenses", false)
        .with_task(2, 12, "Old chore", true)
        .with_task_positions(2, vec![11, 10])
}

/// Answers position queries with two lists instead of one.
struct DoubledPositions;

impl Transport for DoubledPositions {
    fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        if request.path.ends_with("_positions") {
            Ok(json!([
                {"id": 1, "values": [1], "revision": 1},
                {"id": 2, "values": [2], "revision": 1}
            ]))
        } else {
            Ok(Value::Array(Vec::new()))
        }
    }
}

#[test]
fn lists_put_inbox_first_despite_declared_order() {
    let fake = sample_service();
    let lists = fake.client().get_lists().expect("lists");
    let ids: Vec<u64> = lists.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(lists[0].title, "Inbox");
}

#[test]
fn lists_follow_positions_when_inbox_first_disabled() {
    let fake = sample_service();
    let client = TodoClient::new(
        fake.clone(),
        ClientOptions {
            inbox_first: false,
            use_positions: true,
        },
    );
    let ids: Vec<u64> = client.get_lists().expect("lists").iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn tasks_are_filtered_and_reordered() {
    let fake = sample_service();
    let client = fake.client();

    let open: Vec<u64> = client.get_tasks(2, false).expect("tasks").iter().map(|t| t.id).collect();
    assert_eq!(open, vec![11, 10]);

    let done: Vec<u64> = client.get_tasks(2, true).expect("tasks").iter().map(|t| t.id).collect();
    assert_eq!(done, vec![12]);
    assert_eq!(fake.count(Method::Get, "task_positions"), 2);
}

#[test]
fn positions_can_be_skipped() {
    let fake = sample_service();
    let client = TodoClient::new(
        fake.clone(),
        ClientOptions {
            inbox_first: true,
            use_positions: false,
        },
    );
    let ids: Vec<u64> = client.get_tasks(2, false).expect("tasks").iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![10, 11]);
    assert_eq!(fake.count(Method::Get, "task_positions"), 0);
}

#[test]
fn create_without_title_never_reaches_transport() {
    let fake = sample_service();
    let client = fake.client();

    let err = client
        .create_task(2, &Patch::new().completed(false))
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(fake.request_count(), 0);
}

#[test]
fn disallowed_keywords_never_reach_transport() {
    let fake = sample_service().with_subtask(10, 50, "Outline", false);
    let client = fake.client();
    let subtask = fake.subtask(50).expect("seeded subtask");

    let err = client
        .update_subtask(&subtask, &Patch::new().starred(true))
        .unwrap_err();
    assert!(err.is_validation());

    let task = fake.task(10).expect("seeded task");
    let err = client
        .update_task(&task, &Patch::new().set("list_id", 1))
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(fake.request_count(), 0);
}

#[test]
fn create_task_posts_parent_and_properties() {
    let fake = sample_service();
    let task = fake
        .client()
        .create_task(2, &Patch::new().title("Plan sprint").completed(false))
        .expect("create");

    assert_eq!(task.list_id, 2);
    assert_eq!(task.title, "Plan sprint");
    assert!(!task.completed);

    let request = fake.requests().pop().expect("request recorded");
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, "tasks");
    assert_eq!(
        request.body,
        Some(json!({"list_id": 2, "title": "Plan sprint", "completed": false}))
    );
}

#[test]
fn update_sends_revision_and_returns_bumped_copy() {
    let fake = sample_service();
    let client = fake.client();
    let task = fake.task(10).expect("seeded task");

    let updated = client
        .update_task(&task, &Patch::new().title("Write final report"))
        .expect("update");

    assert_eq!(updated.title, "Write final report");
    assert_eq!(updated.revision, task.revision + 1);
    let request = fake.requests().pop().expect("request recorded");
    assert_eq!(request.path, "tasks/10");
    assert_eq!(
        request.body.as_ref().and_then(|b| b.get("revision")),
        Some(&json!(task.revision))
    );
}

#[test]
fn stale_revision_is_a_remote_rejection() {
    let fake = sample_service();
    let client = fake.client();
    let task = fake.task(10).expect("seeded task");
    fake.touch_task(10);

    let err = client
        .update_task(&task, &Patch::new().completed(true))
        .unwrap_err();
    assert!(err.is_conflict());

    let err = client.delete_task(&task).unwrap_err();
    assert!(err.is_conflict());
    assert!(fake.task(10).is_some());
}

#[test]
fn delete_passes_revision_as_query() {
    let fake = sample_service();
    let task = fake.task(11).expect("seeded task");
    fake.client().delete_task(&task).expect("delete");

    let request = fake.requests().pop().expect("request recorded");
    assert_eq!(request.method, Method::Delete);
    assert_eq!(request.query_value("revision"), Some("1"));
    assert!(fake.task(11).is_none());
}

#[test]
fn unexpected_position_shape_is_a_lookup_error() {
    let client = TodoClient::new(DoubledPositions, ClientOptions::default());
    let err = client.get_subtasks(4, false).unwrap_err();
    assert!(matches!(err, ApiError::Lookup(_)));
}

#[test]
fn find_list_by_title_requires_exactly_one_match() {
    let fake = sample_service().with_list(3, "Work", ListType::Normal);
    let client = fake.client();

    assert_eq!(client.find_list_by_title("Inbox").expect("inbox").id, 1);
    assert!(matches!(
        client.find_list_by_title("Work"),
        Err(ApiError::Lookup(_))
    ));
    assert!(matches!(
        client.find_list_by_title("Home"),
        Err(ApiError::Lookup(_))
    ));
}

#[test]
fn update_item_dispatches_on_kind() {
    let fake = sample_service().with_subtask(10, 50, "Outline", false);
    let client = fake.client();
    let item = TodoItem::Subtask(fake.subtask(50).expect("seeded subtask"));

    let updated = client
        .update_item(&item, &Patch::new().completed(true))
        .expect("update");
    assert!(updated.completed());
    assert_eq!(fake.count(Method::Patch, "subtasks/50"), 1);
}
