use std::time::{Duration, Instant};

/// Identifies one scheduled timer; stale handles are ignored by [`TimerQueue::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TimerHandle(u64);

#[derive(Debug)]
struct Entry<T> {
    handle: TimerHandle,
    deadline: Instant,
    payload: T,
}

/// Deadline-ordered timers driven by the event loop.
///
/// Nothing fires on its own: the loop asks for [`TimerQueue::next_deadline`] to size its
/// poll timeout and calls [`TimerQueue::fire_due`] afterwards.
#[derive(Debug)]
pub(crate) struct TimerQueue<T> {
    entries: Vec<Entry<T>>,
    next_handle: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_handle: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn schedule(&mut self, now: Instant, delay: Duration, payload: T) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.entries.push(Entry {
            handle,
            deadline: now + delay,
            payload,
        });
        handle
    }

    /// Drop the timer and hand back its payload if it had not fired yet.
    pub(crate) fn cancel(&mut self, handle: TimerHandle) -> Option<T> {
        let idx = self.entries.iter().position(|e| e.handle == handle)?;
        Some(self.entries.remove(idx).payload)
    }

    pub(crate) fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Remove and return every payload whose deadline is at or before `now`,
    /// earliest deadline first.
    pub(crate) fn fire_due(&mut self, now: Instant) -> Vec<T> {
        let mut due = Vec::new();
        let mut idx = 0;
        while idx < self.entries.len() {
            if self.entries[idx].deadline <= now {
                due.push(self.entries.remove(idx));
            } else {
                idx += 1;
            }
        }
        due.sort_by_key(|e| (e.deadline, e.handle.0));
        due.into_iter().map(|e| e.payload).collect()
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fires_only_due_entries_in_deadline_order() {
        let start = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule(start, Duration::from_millis(500), "late");
        queue.schedule(start, Duration::from_millis(100), "early");
        queue.schedule(start, Duration::from_secs(5), "pending");

        assert_eq!(queue.next_deadline(), Some(start + Duration::from_millis(100)));
        assert!(queue.fire_due(start).is_empty());
        assert_eq!(queue.fire_due(start + Duration::from_secs(1)), vec!["early", "late"]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let start = Instant::now();
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(start, Duration::from_millis(800), 7);

        assert!(queue.is_pending(handle));
        assert_eq!(queue.cancel(handle), Some(7));
        assert_eq!(queue.cancel(handle), None);
        assert!(queue.fire_due(start + Duration::from_secs(10)).is_empty());
        assert!(queue.is_empty());
        assert_eq!(queue.next_deadline(), None);
    }
}
