//! Delayed, cancellable completion commits for checkbox rows.
//!
//! Toggling a row flips its checkbox immediately and schedules the remote update a
//! moment later, so a quick second toggle takes the change back without a request.

use std::time::{Duration, Instant};

use super::collection::{CheckboxRow, EntityCollection, Row, RowKey};
use super::focus::preserve_focus;
use super::timers::TimerQueue;
use crate::core::{ApiError, Patch, TodoApi};
use crate::model::TodoItem;

pub(crate) const COMPLETION_DELAY: Duration = Duration::from_millis(800);

pub(crate) type Items = EntityCollection<TodoItem, CheckboxRow>;

#[derive(Debug, Clone)]
pub(crate) struct PendingCompletion {
    pub(crate) item: TodoItem,
    pub(crate) row: RowKey,
    pub(crate) completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToggleOutcome {
    Scheduled,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommitOutcome {
    /// Completed and taken out of the view.
    Removed,
    /// Reopened; the row now holds the service's copy.
    Replaced,
    /// Committed, but the row had already left the view.
    Detached,
}

#[derive(Debug)]
pub(crate) struct CompletionCommitter {
    timers: TimerQueue<PendingCompletion>,
    delay: Duration,
}

impl Default for CompletionCommitter {
    fn default() -> Self {
        Self::new(COMPLETION_DELAY)
    }
}

impl CompletionCommitter {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            timers: TimerQueue::new(),
            delay,
        }
    }

    /// Flip the checkbox at `index`, scheduling a commit or cancelling the pending one.
    pub(crate) fn toggle(&mut self, items: &mut Items, index: usize, now: Instant) -> ToggleOutcome {
        let item = items.get(index).clone();
        let row = items.row_mut(index);
        row.checked = !row.checked;

        if let Some(handle) = row.alarm.take() {
            self.timers.cancel(handle);
            tracing::debug!(id = item.id(), "completion toggle cancelled");
            return ToggleOutcome::Cancelled;
        }

        let pending = PendingCompletion {
            item,
            row: row.key(),
            completed: row.checked,
        };
        tracing::debug!(
            id = pending.item.id(),
            completed = pending.completed,
            "completion commit scheduled"
        );
        row.alarm = Some(self.timers.schedule(now, self.delay, pending));
        ToggleOutcome::Scheduled
    }

    /// Drop the pending commit of the row at `index`, restoring its checkbox.
    pub(crate) fn cancel_row(&mut self, items: &mut Items, index: usize) -> bool {
        let row = items.row_mut(index);
        match row.alarm.take() {
            Some(handle) => {
                self.timers.cancel(handle);
                row.checked = !row.checked;
                true
            }
            None => false,
        }
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub(crate) fn fire_due(&mut self, now: Instant) -> Vec<PendingCompletion> {
        self.timers.fire_due(now)
    }

    pub(crate) fn pending(&self) -> usize {
        self.timers.len()
    }
}

/// Send a fired completion to the service and reconcile the view with the answer.
///
/// A rejected commit puts the checkbox back the way it was before the toggle.
pub(crate) fn commit(
    api: &dyn TodoApi,
    items: &mut Items,
    pending: PendingCompletion,
) -> Result<CommitOutcome, ApiError> {
    let index = items.position_of(pending.row);
    let current = match index {
        Some(idx) => {
            items.row_mut(idx).alarm = None;
            items.get(idx).clone()
        }
        None => pending.item.clone(),
    };

    let patch = Patch::new().completed(pending.completed);
    let updated = match api.update_item(&current, &patch) {
        Ok(updated) => updated,
        Err(err) => {
            tracing::warn!(id = current.id(), error = %err, "completion commit rejected");
            if let Some(idx) = index {
                items.row_mut(idx).checked = !pending.completed;
            }
            return Err(err);
        }
    };
    tracing::info!(id = updated.id(), completed = pending.completed, "completion committed");

    let Some(idx) = index else {
        return Ok(CommitOutcome::Detached);
    };
    if pending.completed {
        preserve_focus(items, false, 0, |c| {
            c.delete(idx);
        });
        Ok(CommitOutcome::Removed)
    } else {
        items.set(idx, updated);
        Ok(CommitOutcome::Replaced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::Method;
    use crate::core::testing::FakeTransport;
    use crate::model::ListType;
    use pretty_assertions::assert_eq;

    fn service() -> FakeTransport {
        FakeTransport::new()
            .with_list(2, "Work", ListType::Normal)
            .with_task(2, 10, "Write report", false)
            .with_task(2, 11, "File expenses", false)
            .with_task(2, 12, "Archive mail", true)
    }

    fn load(fake: &FakeTransport, ids: &[u64]) -> Items {
        let mut items = Items::new();
        items.extend(ids.iter().filter_map(|id| fake.task(*id)).map(TodoItem::Task));
        items
    }

    #[test]
    fn double_toggle_cancels_without_request() {
        let fake = service();
        let mut items = load(&fake, &[10, 11]);
        let mut committer = CompletionCommitter::default();
        let start = Instant::now();

        assert_eq!(committer.toggle(&mut items, 0, start), ToggleOutcome::Scheduled);
        assert!(items.row(0).checked);
        assert_eq!(
            committer.toggle(&mut items, 0, start + Duration::from_millis(300)),
            ToggleOutcome::Cancelled
        );
        assert!(!items.row(0).checked);
        assert!(items.row(0).alarm.is_none());

        assert!(committer.fire_due(start + Duration::from_secs(5)).is_empty());
        assert_eq!(fake.request_count(), 0);
    }

    #[test]
    fn fired_completion_updates_and_removes_row() {
        let fake = service();
        let client = fake.client();
        let mut items = load(&fake, &[10, 11]);
        items.set_focus_position(1).expect("focus");
        let mut committer = CompletionCommitter::default();
        let start = Instant::now();

        committer.toggle(&mut items, 0, start);
        assert!(committer.fire_due(start + Duration::from_millis(500)).is_empty());

        let due = committer.fire_due(start + COMPLETION_DELAY);
        assert_eq!(due.len(), 1);
        for pending in due {
            let outcome = commit(&client, &mut items, pending).expect("commit");
            assert_eq!(outcome, CommitOutcome::Removed);
        }

        assert_eq!(fake.count(Method::Patch, "tasks/10"), 1);
        assert!(fake.task(10).expect("task").completed);
        assert_eq!(items.len(), 1);
        assert_eq!(items.get(0).id(), 11);
        assert_eq!(items.focus_position(), Ok(0));
    }

    #[test]
    fn reopening_replaces_entity_with_bumped_revision() {
        let fake = service();
        let client = fake.client();
        let mut items = load(&fake, &[12]);
        let mut committer = CompletionCommitter::default();
        let start = Instant::now();

        committer.toggle(&mut items, 0, start);
        for pending in committer.fire_due(start + Duration::from_secs(1)) {
            assert_eq!(
                commit(&client, &mut items, pending).expect("commit"),
                CommitOutcome::Replaced
            );
        }

        assert_eq!(items.len(), 1);
        assert!(!items.get(0).completed());
        assert_eq!(items.get(0).revision(), 2);
        assert!(!items.row(0).checked);
    }

    #[test]
    fn rejected_commit_restores_checkbox() {
        let fake = service();
        let client = fake.client();
        let mut items = load(&fake, &[10]);
        let mut committer = CompletionCommitter::default();
        let start = Instant::now();

        committer.toggle(&mut items, 0, start);
        fake.touch_task(10);
        let pending = committer
            .fire_due(start + Duration::from_secs(1))
            .pop()
            .expect("due commit");

        let err = commit(&client, &mut items, pending).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(items.len(), 1);
        assert!(!items.row(0).checked);
        assert!(items.row(0).alarm.is_none());
    }

    #[test]
    fn commit_for_departed_row_still_reaches_service() {
        let fake = service();
        let client = fake.client();
        let mut items = load(&fake, &[10, 11]);
        let mut committer = CompletionCommitter::default();
        let start = Instant::now();

        committer.toggle(&mut items, 1, start);
        items.clear();
        items.extend(load(&fake, &[10]).iter().map(|(item, _)| item.clone()));

        let pending = committer
            .fire_due(start + Duration::from_secs(1))
            .pop()
            .expect("due commit");
        assert_eq!(
            commit(&client, &mut items, pending).expect("commit"),
            CommitOutcome::Detached
        );
        assert!(fake.task(11).expect("task").completed);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn cancel_row_drops_pending_commit() {
        let fake = service();
        let mut items = load(&fake, &[10]);
        let mut committer = CompletionCommitter::default();

        committer.toggle(&mut items, 0, Instant::now());
        assert_eq!(committer.pending(), 1);
        assert!(committer.cancel_row(&mut items, 0));
        assert_eq!(committer.pending(), 0);
        assert!(!items.row(0).checked);
        assert!(!committer.cancel_row(&mut items, 0));
    }
}
