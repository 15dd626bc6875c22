//! Partially retroactive set: retroactive updates, present-only queries.
//!
//! The simpler sibling of [`crate::retro::set::RetroSet`]. Updates may be
//! inserted into or deleted from the past, but only at the edit frontier
//! of each key (after its latest event), so the present membership set can
//! be maintained directly and queried without any time machinery.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::ops::Bound;

use crate::treap::Time;

/// A partially retroactive unique-key set.
#[derive(Clone, Debug)]
pub struct PartialRetroSet<T> {
    /// Every logged update, keyed by its (unique) time.
    operations: BTreeMap<Time, T>,
    /// Per-key event times, strictly increasing, alternating
    /// insert/erase starting with insert.
    sequences: BTreeMap<T, Vec<Time>>,
    /// The members right now.
    elements: BTreeSet<T>,
}

impl<T: Clone + Ord> PartialRetroSet<T> {
    /// Create an empty set.
    pub fn new() -> PartialRetroSet<T> {
        return PartialRetroSet {
            operations: BTreeMap::new(),
            sequences: BTreeMap::new(),
            elements: BTreeSet::new(),
        };
    }

    fn last_time(&self) -> Time {
        return self.operations.last_key_value().map_or(0, |(tm, _)| tm + 1);
    }

    /// Retroactively insert `x` at time `tm`. Admissible when `tm` is
    /// unused, `x` is absent over `[tm, now]` (its event sequence has even
    /// length), and `tm` lies after the key's latest event.
    pub fn insert_at(&mut self, x: T, tm: Time) -> bool {
        if self.operations.contains_key(&tm) {
            return false;
        }
        if let Some(events) = self.sequences.get(&x) {
            if events.len() % 2 != 0 || events.last().is_some_and(|&last| last > tm) {
                return false;
            }
        }
        self.operations.insert(tm, x.clone());
        self.elements.insert(x.clone());
        self.sequences.entry(x).or_default().push(tm);
        return true;
    }

    /// Retroactively erase `x` at time `tm`. Admissible when `tm` is
    /// unused, `x` is currently present (odd event sequence), and `tm`
    /// lies after the key's latest event.
    pub fn erase_at(&mut self, x: T, tm: Time) -> bool {
        if self.operations.contains_key(&tm) {
            return false;
        }
        let Some(events) = self.sequences.get_mut(&x) else {
            return false;
        };
        match events.last() {
            Some(&last) if events.len() % 2 == 1 && last <= tm => {}
            _ => return false,
        }
        events.push(tm);
        self.operations.insert(tm, x.clone());
        self.elements.remove(&x);
        return true;
    }

    /// Insert `x` at the present.
    pub fn insert(&mut self, x: T) -> bool {
        let tm = self.last_time();
        return self.insert_at(x, tm);
    }

    /// Erase `x` at the present.
    pub fn erase(&mut self, x: T) -> bool {
        let tm = self.last_time();
        return self.erase_at(x, tm);
    }

    /// Remove the update logged at `tm`. Only the most recent event of its
    /// key may be deleted; anything earlier would leave a dangling pair.
    pub fn delete_operation(&mut self, tm: Time) -> bool {
        let Some(x) = self.operations.get(&tm).cloned() else {
            return false;
        };
        let Some(events) = self.sequences.get_mut(&x) else {
            return false;
        };
        if events.last() != Some(&tm) {
            return false;
        }
        events.pop();
        if events.len() % 2 == 1 {
            // An erase was deleted; the key is present again.
            self.elements.insert(x.clone());
        } else {
            self.elements.remove(&x);
        }
        if events.is_empty() {
            self.sequences.remove(&x);
        }
        self.operations.remove(&tm);
        return true;
    }

    /// Is `x` a member now?
    pub fn contains(&self, x: &T) -> bool {
        return self.elements.contains(x);
    }

    /// Smallest present member >= `x`.
    pub fn lower_bound(&self, x: &T) -> Option<T> {
        return self.elements.range(x..).next().cloned();
    }

    /// Smallest present member > `x`.
    pub fn upper_bound(&self, x: &T) -> Option<T> {
        return self
            .elements
            .range((Bound::Excluded(x), Bound::Unbounded))
            .next()
            .cloned();
    }

    /// Number of present members.
    pub fn len(&self) -> usize {
        return self.elements.len();
    }

    /// True when no member is present.
    pub fn is_empty(&self) -> bool {
        return self.elements.is_empty();
    }

    /// Drop the whole history.
    pub fn clear(&mut self) {
        self.operations.clear();
        self.sequences.clear();
        self.elements.clear();
    }
}

impl<T: Clone + Ord> Default for PartialRetroSet<T> {
    fn default() -> Self {
        return Self::new();
    }
}

/// Equality compares the logged histories.
impl<T: Clone + Ord> PartialEq for PartialRetroSet<T> {
    fn eq(&self, other: &Self) -> bool {
        return self.operations == other.operations;
    }
}

impl<T: Clone + Ord> Eq for PartialRetroSet<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_query() {
        let mut set = PartialRetroSet::new();
        assert!(set.insert(5u64));
        assert!(set.contains(&5));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn double_insert_is_rejected() {
        let mut set = PartialRetroSet::new();
        assert!(set.insert_at(5u64, 10));
        assert!(!set.insert_at(5u64, 20));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn erase_requires_presence() {
        let mut set = PartialRetroSet::new();
        assert!(!set.erase(5u64));
        set.insert_at(5u64, 10);
        assert!(set.erase_at(5u64, 20));
        assert!(!set.contains(&5));
        assert!(!set.erase_at(5u64, 30));
    }

    #[test]
    fn retroactive_insert_must_follow_latest_event() {
        let mut set = PartialRetroSet::new();
        set.insert_at(5u64, 10);
        set.erase_at(5u64, 20);
        // Before the erase: out of order.
        assert!(!set.insert_at(5u64, 15));
        // After it: fine.
        assert!(set.insert_at(5u64, 25));
        assert!(set.contains(&5));
    }

    #[test]
    fn duplicate_time_is_rejected_across_keys() {
        let mut set = PartialRetroSet::new();
        assert!(set.insert_at(1u64, 7));
        assert!(!set.insert_at(2u64, 7));
        assert!(!set.contains(&2));
    }

    #[test]
    fn bounds_walk_present_members() {
        let mut set = PartialRetroSet::new();
        set.insert(10u64);
        set.insert(20u64);
        set.insert(30u64);
        set.erase(20u64);
        assert_eq!(set.lower_bound(&10), Some(10));
        assert_eq!(set.lower_bound(&11), Some(30));
        assert_eq!(set.upper_bound(&10), Some(30));
        assert_eq!(set.upper_bound(&30), None);
    }

    #[test]
    fn delete_operation_only_at_key_frontier() {
        let mut set = PartialRetroSet::new();
        set.insert_at(5u64, 10);
        set.erase_at(5u64, 20);
        // The insert is not the latest event on key 5.
        assert!(!set.delete_operation(10));
        assert!(set.delete_operation(20));
        assert!(set.contains(&5));
        assert!(set.delete_operation(10));
        assert!(!set.contains(&5));
    }

    #[test]
    fn delete_then_redo_restores_equality() {
        let mut set = PartialRetroSet::new();
        set.insert_at(5u64, 10);
        set.insert_at(6u64, 20);
        let snapshot = set.clone();
        assert!(set.delete_operation(20));
        assert!(set.insert_at(6u64, 20));
        assert_eq!(set, snapshot);
    }

    #[test]
    fn clone_copies_sequences() {
        // The copy must keep the per-key history, not just the members:
        // admission on the copy still depends on it.
        let mut set = PartialRetroSet::new();
        set.insert_at(5u64, 10);
        let mut copy = set.clone();
        assert!(!copy.insert_at(5u64, 20));
        assert!(copy.erase_at(5u64, 20));
        assert!(set.contains(&5));
    }

    #[test]
    fn clear_then_replay_matches_fresh() {
        let mut set = PartialRetroSet::new();
        set.insert(1u64);
        set.insert(2u64);
        set.erase(1u64);
        set.clear();
        set.insert(1u64);
        set.insert(2u64);
        set.erase(1u64);

        let mut fresh = PartialRetroSet::new();
        fresh.insert(1u64);
        fresh.insert(2u64);
        fresh.erase(1u64);
        assert_eq!(set, fresh);
    }
}
