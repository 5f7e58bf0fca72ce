use anyhow::Result;

use crate::api::TodoApi;
use crate::model::{DeleteResult, EntityId, StatusUpdate, Task};
use crate::patch::Patch;

/// Open and completed tasks of a list, open first.
fn all_tasks(api: &dyn TodoApi, list_id: EntityId) -> Result<Vec<Task>> {
    let mut tasks = api.get_tasks(list_id, false)?;
    tasks.extend(api.get_tasks(list_id, true)?);
    Ok(tasks)
}

/// Delete the tasks with the provided ids from a list and return per-id results.
pub fn delete_tasks(
    api: &dyn TodoApi,
    list_id: EntityId,
    ids: &[EntityId],
) -> Result<Vec<DeleteResult>> {
    let tasks = all_tasks(api, list_id)?;
    let mut results = Vec::with_capacity(ids.len());
    for id in ids {
        let deleted = match tasks.iter().find(|task| task.id == *id) {
            Some(task) => {
                api.delete_task(task)?;
                true
            }
            None => false,
        };
        results.push(DeleteResult { id: *id, deleted });
    }
    Ok(results)
}

/// Mark the tasks with the provided ids completed; already-completed tasks are left alone.
pub fn complete_tasks(
    api: &dyn TodoApi,
    list_id: EntityId,
    ids: &[EntityId],
) -> Result<Vec<StatusUpdate>> {
    let tasks = all_tasks(api, list_id)?;
    let mut results = Vec::with_capacity(ids.len());
    for id in ids {
        let update = match tasks.iter().find(|task| task.id == *id) {
            Some(task) if task.completed => StatusUpdate {
                id: *id,
                found: true,
                changed: false,
            },
            Some(task) => {
                api.update_task(task, &Patch::new().completed(true))?;
                StatusUpdate {
                    id: *id,
                    found: true,
                    changed: true,
                }
            }
            None => StatusUpdate {
                id: *id,
                found: false,
                changed: false,
            },
        };
        results.push(update);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::model::ListType;
    use crate::testing::FakeTransport;
    use pretty_assertions::assert_eq;

    fn service() -> FakeTransport {
        FakeTransport::new()
            .with_list(2, "Work", ListType::Normal)
            .with_task(2, 10, "Write report", false)
            .with_task(2, 11, "Shipped", true)
    }

    #[test]
    fn delete_reports_deleted_and_missing() {
        let fake = service();
        let client = fake.client();
        let results = delete_tasks(&client, 2, &[11, 99]).expect("delete");
        assert_eq!(
            results,
            vec![
                DeleteResult {
                    id: 11,
                    deleted: true
                },
                DeleteResult {
                    id: 99,
                    deleted: false
                },
            ]
        );
        assert!(fake.task(11).is_none());
    }

    #[test]
    fn complete_skips_tasks_already_done() {
        let fake = service();
        let client = fake.client();
        let results = complete_tasks(&client, 2, &[10, 11]).expect("complete");
        assert!(results[0].changed);
        assert!(results[1].found && !results[1].changed);
        assert_eq!(fake.count(Method::Patch, "tasks/"), 1);
        assert!(fake.task(10).expect("task").completed);
    }
}
