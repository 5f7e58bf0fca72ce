use std::ops::{Deref, DerefMut};

use super::collection::{EntityCollection, Row};

/// Restores focus on a collection when dropped.
///
/// The focused index is captured on creation. On drop the focus moves to the top
/// when `reset` is set (or nothing was focused), otherwise to `old + delta`
/// clamped to the last row. An empty collection is left unfocused.
pub(crate) struct FocusGuard<'a, E, R: Row<E>> {
    collection: &'a mut EntityCollection<E, R>,
    previous: Option<usize>,
    reset: bool,
    delta: usize,
}

impl<'a, E, R: Row<E>> FocusGuard<'a, E, R> {
    pub(crate) fn new(collection: &'a mut EntityCollection<E, R>, reset: bool, delta: usize) -> Self {
        let previous = collection.focus_position().ok();
        Self {
            reset: reset || previous.is_none(),
            collection,
            previous,
            delta,
        }
    }
}

impl<E, R: Row<E>> Deref for FocusGuard<'_, E, R> {
    type Target = EntityCollection<E, R>;

    fn deref(&self) -> &Self::Target {
        self.collection
    }
}

impl<E, R: Row<E>> DerefMut for FocusGuard<'_, E, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.collection
    }
}

impl<E, R: Row<E>> Drop for FocusGuard<'_, E, R> {
    fn drop(&mut self) {
        let len = self.collection.len();
        if len == 0 {
            self.collection.clear_focus();
            return;
        }
        let target = match self.previous {
            Some(old) if !self.reset => (old + self.delta).min(len - 1),
            _ => 0,
        };
        if self.collection.set_focus_position(target).is_err() {
            self.collection.clear_focus();
        }
    }
}

/// Run `body` against the collection and re-apply focus afterwards.
pub(crate) fn preserve_focus<E, R, T, F>(
    collection: &mut EntityCollection<E, R>,
    reset: bool,
    delta: usize,
    body: F,
) -> T
where
    R: Row<E>,
    F: FnOnce(&mut EntityCollection<E, R>) -> T,
{
    let mut guard = FocusGuard::new(collection, reset, delta);
    body(&mut guard)
}
