//! Incremental index deltas.
//!
//! The host keeps its own copy of the index and tells us which ids it holds.
//! Applying `added` and `removed` to that set must reproduce the current snapshot.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexDelta<T> {
    /// Entries the host does not have yet, in snapshot order
    pub added: Vec<T>,
    /// Ids the host has that are no longer current, sorted
    pub removed: Vec<String>,
}

/// Compute the delta between `current` and the host's `known` ids.
///
/// `id_of` must be the same id scheme the host was given, otherwise every
/// entry looks new.
#[must_use]
pub fn diff<T>(
    current: Vec<T>,
    known: &HashSet<String>,
    id_of: impl Fn(&T) -> String,
) -> IndexDelta<T> {
    let current_ids: HashSet<String> = current.iter().map(&id_of).collect();

    let mut removed: Vec<String> = known
        .iter()
        .filter(|id| !current_ids.contains(*id))
        .cloned()
        .collect();
    removed.sort();

    let added = current
        .into_iter()
        .filter(|entry| !known.contains(&id_of(entry)))
        .collect();

    IndexDelta { added, removed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use waypoint_types::IndexItem;

    fn item(id: &str) -> IndexItem {
        IndexItem {
            id: id.to_string(),
            name: id.to_string(),
            ..Default::default()
        }
    }

    fn id_of(item: &IndexItem) -> String {
        item.id.clone()
    }

    fn ids(items: &[IndexItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn known(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_empty_known_adds_everything() {
        let delta = diff(vec![item("a"), item("b")], &HashSet::new(), id_of);
        assert_eq!(ids(&delta.added), vec!["a", "b"]);
        assert!(delta.removed.is_empty());
    }

    #[test]
    fn test_unchanged_snapshot_is_empty_delta() {
        let delta = diff(vec![item("a"), item("b")], &known(&["a", "b"]), id_of);
        assert!(delta.added.is_empty());
        assert!(delta.removed.is_empty());
    }

    #[test]
    fn test_added_and_removed() {
        let delta = diff(vec![item("b"), item("c")], &known(&["z", "a", "b"]), id_of);
        assert_eq!(ids(&delta.added), vec!["c"]);
        assert_eq!(delta.removed, vec!["a", "z"]);
    }

    #[test]
    fn test_empty_current_removes_everything() {
        let delta = diff(vec![], &known(&["a", "b"]), id_of);
        assert!(delta.added.is_empty());
        assert_eq!(delta.removed, vec!["a", "b"]);
    }

    proptest! {
        #[test]
        fn prop_applying_delta_reproduces_current(
            known_ids in proptest::collection::hash_set("[a-f]{1,2}", 0..20),
            current_ids in proptest::collection::hash_set("[a-f]{1,2}", 0..20),
        ) {
            let current: Vec<IndexItem> = current_ids.iter().map(|id| item(id)).collect();
            let delta = diff(current, &known_ids, id_of);

            let mut applied = known_ids.clone();
            for id in &delta.removed {
                prop_assert!(applied.remove(id));
            }
            for added in &delta.added {
                prop_assert!(applied.insert(added.id.clone()));
            }

            prop_assert_eq!(applied, current_ids);
        }
    }
}
