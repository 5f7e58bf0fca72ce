//! Ordered entities paired index-for-index with their rendered rows.

use thiserror::Error;

use super::timers::TimerHandle;
use crate::model::{ListDescriptor, TodoItem};

/// Stable identity of a row, unaffected by inserts and deletes around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RowKey(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum FocusError {
    #[error("collection is empty")]
    Empty,
    #[error("no row is focused")]
    Unfocused,
    #[error("index {index} out of range for {len} rows")]
    OutOfRange { index: usize, len: usize },
}

pub(crate) trait Row<E> {
    fn build(key: RowKey, entity: &E) -> Self;
    fn key(&self) -> RowKey;
}

/// A togglable row for tasks and subtasks.
#[derive(Debug, Clone)]
pub(crate) struct CheckboxRow {
    key: RowKey,
    pub(crate) label: String,
    pub(crate) checked: bool,
    /// Pending completion commit for this row.
    pub(crate) alarm: Option<TimerHandle>,
}

impl Row<TodoItem> for CheckboxRow {
    fn build(key: RowKey, item: &TodoItem) -> Self {
        Self {
            key,
            label: item.title().to_string(),
            checked: item.completed(),
            alarm: None,
        }
    }

    fn key(&self) -> RowKey {
        self.key
    }
}

/// A row that can only be activated, used for lists.
#[derive(Debug, Clone)]
pub(crate) struct ButtonRow {
    key: RowKey,
    pub(crate) label: String,
}

impl Row<ListDescriptor> for ButtonRow {
    fn build(key: RowKey, list: &ListDescriptor) -> Self {
        Self {
            key,
            label: list.title.clone(),
        }
    }

    fn key(&self) -> RowKey {
        self.key
    }
}

/// Two parallel vectors that always have the same length, plus the focused index.
///
/// Index arguments past the end panic, like slice indexing.
#[derive(Debug)]
pub(crate) struct EntityCollection<E, R> {
    entities: Vec<E>,
    rows: Vec<R>,
    focus: Option<usize>,
    next_key: u64,
}

impl<E, R> Default for EntityCollection<E, R> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            rows: Vec::new(),
            focus: None,
            next_key: 0,
        }
    }
}

impl<E, R: Row<E>> EntityCollection<E, R> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn build_row(&mut self, entity: &E) -> R {
        self.next_key += 1;
        R::build(RowKey(self.next_key), entity)
    }

    pub(crate) fn len(&self) -> usize {
        self.entities.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn get(&self, index: usize) -> &E {
        &self.entities[index]
    }

    /// Replace the entity at `index` and rebuild its row under the same key.
    pub(crate) fn set(&mut self, index: usize, entity: E) {
        let key = self.rows[index].key();
        self.rows[index] = R::build(key, &entity);
        self.entities[index] = entity;
    }

    pub(crate) fn delete(&mut self, index: usize) -> E {
        self.rows.remove(index);
        let entity = self.entities.remove(index);
        if let Some(focus) = self.focus {
            if self.entities.is_empty() {
                self.focus = None;
            } else if focus >= self.entities.len() {
                self.focus = Some(self.entities.len() - 1);
            }
        }
        entity
    }

    pub(crate) fn insert(&mut self, index: usize, entity: E) {
        assert!(index <= self.len(), "insert index {} past end {}", index, self.len());
        let row = self.build_row(&entity);
        self.rows.insert(index, row);
        self.entities.insert(index, entity);
    }

    pub(crate) fn append(&mut self, entity: E) {
        let row = self.build_row(&entity);
        self.rows.push(row);
        self.entities.push(entity);
    }

    pub(crate) fn extend<I: IntoIterator<Item = E>>(&mut self, entities: I) {
        for entity in entities {
            self.append(entity);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entities.clear();
        self.rows.clear();
        self.focus = None;
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&E, &R)> {
        self.entities.iter().zip(self.rows.iter())
    }

    pub(crate) fn row(&self, index: usize) -> &R {
        &self.rows[index]
    }

    pub(crate) fn row_mut(&mut self, index: usize) -> &mut R {
        &mut self.rows[index]
    }

    pub(crate) fn position_of(&self, key: RowKey) -> Option<usize> {
        self.rows.iter().position(|row| row.key() == key)
    }

    pub(crate) fn focus_position(&self) -> Result<usize, FocusError> {
        if self.is_empty() {
            return Err(FocusError::Empty);
        }
        self.focus.ok_or(FocusError::Unfocused)
    }

    pub(crate) fn set_focus_position(&mut self, index: usize) -> Result<(), FocusError> {
        if self.is_empty() {
            return Err(FocusError::Empty);
        }
        if index >= self.len() {
            return Err(FocusError::OutOfRange {
                index,
                len: self.len(),
            });
        }
        self.focus = Some(index);
        Ok(())
    }

    pub(crate) fn clear_focus(&mut self) {
        self.focus = None;
    }

    pub(crate) fn focused(&self) -> Option<(usize, &E)> {
        let index = self.focus_position().ok()?;
        Some((index, &self.entities[index]))
    }

    pub(crate) fn focus_next(&mut self) {
        let target = match self.focus {
            Some(index) => index + 1,
            None => 0,
        };
        let _ = self.set_focus_position(target);
    }

    pub(crate) fn focus_prev(&mut self) {
        let target = self.focus.map(|index| index.saturating_sub(1)).unwrap_or(0);
        let _ = self.set_focus_position(target);
    }

    pub(crate) fn focus_first(&mut self) {
        let _ = self.set_focus_position(0);
    }

    pub(crate) fn focus_last(&mut self) {
        if let Some(last) = self.len().checked_sub(1) {
            let _ = self.set_focus_position(last);
        }
    }
}


#[cfg(test)]
mod properties {
    use std::collections::HashSet;

    use proptest::prelude::*;
    use proptest::sample::Index;

    use super::*;
    use crate::model::ListType;

    #[derive(Debug, Clone)]
    enum Op {
        Insert(Index, u64),
        Append(u64),
        Set(Index, u64),
        Delete(Index),
        Focus(Index),
        Clear,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (any::<Index>(), 0u64..500).prop_map(|(at, id)| Op::Insert(at, id)),
            4 => (0u64..500).prop_map(Op::Append),
            3 => (any::<Index>(), 0u64..500).prop_map(|(at, id)| Op::Set(at, id)),
            3 => any::<Index>().prop_map(Op::Delete),
            2 => any::<Index>().prop_map(Op::Focus),
            1 => Just(Op::Clear),
        ]
    }

    fn list(id: u64) -> ListDescriptor {
        ListDescriptor {
            id,
            title: format!("list {}", id),
            list_type: ListType::Normal,
            revision: 1,
        }
    }

    fn apply(lists: &mut EntityCollection<ListDescriptor, ButtonRow>, op: Op) {
        let len = lists.len();
        match op {
            Op::Insert(at, id) => lists.insert(at.index(len + 1), list(id)),
            Op::Append(id) => lists.append(list(id)),
            Op::Set(at, id) if len > 0 => lists.set(at.index(len), list(id)),
            Op::Delete(at) if len > 0 => {
                lists.delete(at.index(len));
            }
            Op::Focus(at) if len > 0 => {
                lists
                    .set_focus_position(at.index(len))
                    .expect("index within bounds");
            }
            Op::Clear => lists.clear(),
            Op::Set(..) | Op::Delete(_) | Op::Focus(_) => {}
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn rows_stay_aligned_for_any_mutation_sequence(ops in prop::collection::vec(arb_op(), 0..40)) {
            let mut lists: EntityCollection<ListDescriptor, ButtonRow> = EntityCollection::new();
            for op in ops {
                apply(&mut lists, op);

                prop_assert_eq!(lists.entities.len(), lists.rows.len());
                for (entity, row) in lists.iter() {
                    prop_assert_eq!(&entity.title, &row.label);
                }
                let keys: HashSet<RowKey> = lists.rows.iter().map(|row| row.key()).collect();
                prop_assert_eq!(keys.len(), lists.len());
                match lists.focus_position() {
                    Ok(index) => prop_assert!(index < lists.len()),
                    Err(FocusError::Empty) => prop_assert!(lists.is_empty()),
                    Err(FocusError::Unfocused) => prop_assert!(!lists.is_empty()),
                    Err(err) => prop_assert!(false, "unexpected focus error {:?}", err),
                }
            }
        }
    }
}
