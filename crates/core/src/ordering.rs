//! Applies the service's declared positions to fetched entities.
//!
//! The service documents that resources missing from a position list trail the
//! listed ones in ascending id order. The client has always placed them first,
//! newest (highest id) on top, and that observed order is what `reorder` keeps.

use std::collections::{HashMap, HashSet};

use crate::model::{EntityId, Identified, ListDescriptor};

/// Order `entities` by `positions`.
///
/// Ids absent from `positions` come first, sorted by id descending, followed by
/// the listed ids in their declared order. Listed ids with no matching entity
/// are skipped.
pub fn reorder<T: Identified>(entities: Vec<T>, positions: &[EntityId]) -> Vec<T> {
    let listed: HashSet<EntityId> = positions.iter().copied().collect();
    let mut unlisted = Vec::new();
    let mut by_id = HashMap::with_capacity(entities.len());

    for entity in entities {
        if listed.contains(&entity.id()) {
            by_id.insert(entity.id(), entity);
        } else {
            unlisted.push(entity);
        }
    }

    unlisted.sort_by(|a, b| b.id().cmp(&a.id()));

    let mut ordered = unlisted;
    ordered.reserve(by_id.len());
    for id in positions {
        if let Some(entity) = by_id.remove(id) {
            ordered.push(entity);
        }
    }
    ordered
}

/// Order lists by `positions`, then move the inbox to the front.
pub fn order_lists(
    lists: Vec<ListDescriptor>,
    positions: &[EntityId],
    inbox_first: bool,
) -> Vec<ListDescriptor> {
    let mut ordered = reorder(lists, positions);
    if inbox_first {
        move_inbox_to_front(&mut ordered);
    }
    ordered
}

/// Move the first inbox-typed list to index 0, keeping the others in place.
pub fn move_inbox_to_front(lists: &mut Vec<ListDescriptor>) {
    if let Some(idx) = lists.iter().position(ListDescriptor::is_inbox) {
        let inbox = lists.remove(idx);
        lists.insert(0, inbox);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ListType;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(EntityId);

    impl Identified for Item {
        fn id(&self) -> EntityId {
            self.0
        }
    }

    fn ids(items: &[Item]) -> Vec<EntityId> {
        items.iter().map(|item| item.0).collect()
    }

    fn list(id: EntityId, title: &str, list_type: ListType) -> ListDescriptor {
        ListDescriptor {
            id,
            title: title.into(),
            list_type,
            revision: 1,
        }
    }

    #[test]
    fn unlisted_ids_lead_in_descending_order() {
        let items = vec![Item(5), Item(6), Item(7)];
        assert_eq!(ids(&reorder(items, &[6])), vec![7, 5, 6]);
    }

    #[test]
    fn listed_ids_without_entities_are_dropped() {
        let items = vec![Item(1), Item(2)];
        assert_eq!(ids(&reorder(items, &[9, 2, 8, 1])), vec![2, 1]);
    }

    #[test]
    fn reorder_is_deterministic_for_shuffled_input() {
        let positions = [4, 2];
        let first = reorder(vec![Item(1), Item(2), Item(3), Item(4)], &positions);
        let second = reorder(vec![Item(4), Item(3), Item(2), Item(1)], &positions);
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec![3, 1, 4, 2]);
    }

    #[test]
    fn empty_positions_sort_everything_descending() {
        let items = vec![Item(2), Item(9), Item(4)];
        assert_eq!(ids(&reorder(items, &[])), vec![9, 4, 2]);
    }

    #[test]
    fn inbox_moves_to_front_despite_declared_order() {
        let lists = vec![
            list(1, "Inbox", ListType::Inbox),
            list(2, "Work", ListType::Normal),
        ];
        let ordered = order_lists(lists, &[2, 1], true);
        let titles: Vec<&str> = ordered.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Inbox", "Work"]);
    }

    #[test]
    fn inbox_keeps_declared_slot_when_disabled() {
        let lists = vec![
            list(1, "Inbox", ListType::Inbox),
            list(2, "Work", ListType::Normal),
        ];
        let ordered = order_lists(lists, &[2, 1], false);
        assert_eq!(ordered[0].title, "Work");
    }
}

#[cfg(test)]
mod properties {
    use std::collections::HashSet;

    use proptest::collection::{hash_set, vec};
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(EntityId);

    impl Identified for Item {
        fn id(&self) -> EntityId {
            self.0
        }
    }

    /// Entity ids in two orders that are permutations of each other.
    fn arb_ids() -> impl Strategy<Value = (Vec<EntityId>, Vec<EntityId>)> {
        hash_set(0u64..60, 0..25).prop_flat_map(|set| {
            let ids: Vec<EntityId> = set.into_iter().collect();
            (Just(ids.clone()), Just(ids).prop_shuffle())
        })
    }

    fn expected(ids: &[EntityId], positions: &[EntityId]) -> Vec<EntityId> {
        let present: HashSet<EntityId> = ids.iter().copied().collect();
        let listed: HashSet<EntityId> = positions.iter().copied().collect();
        let mut out: Vec<EntityId> = ids.iter().copied().filter(|id| !listed.contains(id)).collect();
        out.sort_unstable_by(|a, b| b.cmp(a));
        let mut seen = HashSet::new();
        for id in positions {
            if present.contains(id) && seen.insert(*id) {
                out.push(*id);
            }
        }
        out
    }

    fn run(ids: &[EntityId], positions: &[EntityId]) -> Vec<EntityId> {
        let items = ids.iter().copied().map(Item).collect();
        reorder(items, positions).into_iter().map(|item| item.0).collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn unlisted_descending_then_listed_in_declared_order(
            (ids, _) in arb_ids(),
            positions in vec(0u64..60, 0..30),
        ) {
            prop_assert_eq!(run(&ids, &positions), expected(&ids, &positions));
        }

        #[test]
        fn output_is_a_permutation_of_the_input(
            (ids, _) in arb_ids(),
            positions in vec(0u64..60, 0..30),
        ) {
            let mut out = run(&ids, &positions);
            let mut input = ids.clone();
            out.sort_unstable();
            input.sort_unstable();
            prop_assert_eq!(out, input);
        }

        #[test]
        fn input_order_does_not_matter(
            (ids, shuffled) in arb_ids(),
            positions in vec(0u64..60, 0..30),
        ) {
            prop_assert_eq!(run(&ids, &positions), run(&shuffled, &positions));
        }
    }
}
