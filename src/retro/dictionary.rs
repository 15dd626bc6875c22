//! Retroactive dictionary: a membership set with unrestricted histories.
//!
//! The dictionary records insert/erase events per key without validating
//! that they alternate; membership at time `t` is simply the polarity of
//! the most recent event at or before `t`. That makes every retroactive
//! update admissible (only duplicate times are rejected) and makes the
//! fully retroactive `contains_at` a single ordered-map probe.

use std::collections::BTreeMap;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::treap::Time;

/// A fully retroactive membership dictionary.
#[derive(Clone, Debug)]
pub struct RetroDictionary<T> {
    /// Every logged update, keyed by its (unique) time.
    operations: BTreeMap<Time, T>,
    /// Per-key event maps: time -> true for insert, false for erase.
    sequences: FxHashMap<T, BTreeMap<Time, bool>>,
}

impl<T: Clone + Eq + Hash> RetroDictionary<T> {
    /// Create an empty dictionary.
    pub fn new() -> RetroDictionary<T> {
        return RetroDictionary {
            operations: BTreeMap::new(),
            sequences: FxHashMap::default(),
        };
    }

    fn last_time(&self) -> Time {
        return self.operations.last_key_value().map_or(0, |(tm, _)| tm + 1);
    }

    fn record(&mut self, x: T, tm: Time, ins: bool) -> bool {
        if self.operations.contains_key(&tm) {
            return false;
        }
        self.sequences.entry(x.clone()).or_default().insert(tm, ins);
        self.operations.insert(tm, x);
        return true;
    }

    /// Retroactively insert `x` at time `tm`. Fails only when `tm` is
    /// already taken; the dictionary accepts any event history, including
    /// inserting a key that is already present.
    pub fn insert_at(&mut self, x: T, tm: Time) -> bool {
        return self.record(x, tm, true);
    }

    /// Retroactively erase `x` at time `tm`. Fails only on a duplicate
    /// time; erasing an absent key is a recorded no-op.
    pub fn erase_at(&mut self, x: T, tm: Time) -> bool {
        return self.record(x, tm, false);
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

    /// Remove the update logged at `tm` from the history.
    pub fn delete_operation(&mut self, tm: Time) -> bool {
        let Some(x) = self.operations.remove(&tm) else {
            return false;
        };
        if let Some(events) = self.sequences.get_mut(&x) {
            events.remove(&tm);
            if events.is_empty() {
                self.sequences.remove(&x);
            }
        }
        return true;
    }

    /// Was `x` a member at time `tm`? True when the most recent event on
    /// `x` at or before `tm` is an insert.
    pub fn contains_at(&self, x: &T, tm: Time) -> bool {
        let Some(events) = self.sequences.get(x) else {
            return false;
        };
        return events.range(..=tm).next_back().map_or(false, |(_, &ins)| ins);
    }

    /// Is `x` a member now?
    pub fn contains(&self, x: &T) -> bool {
        return self.contains_at(x, Time::MAX);
    }

    /// Number of logged updates.
    pub fn operation_count(&self) -> usize {
        return self.operations.len();
    }

    /// Drop the whole history.
    pub fn clear(&mut self) {
        self.operations.clear();
        self.sequences.clear();
    }
}

impl<T: Clone + Eq + Hash> Default for RetroDictionary<T> {
    fn default() -> Self {
        return Self::new();
    }
}

/// Two dictionaries are equal when they logged the same updates at the
/// same times; the per-key maps are derived from the log.
impl<T: Clone + Eq + Hash> PartialEq for RetroDictionary<T> {
    fn eq(&self, other: &Self) -> bool {
        return self.operations == other.operations;
    }
}

impl<T: Clone + Eq + Hash> Eq for RetroDictionary<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dictionary_contains_nothing() {
        let dict: RetroDictionary<u64> = RetroDictionary::new();
        assert!(!dict.contains(&1));
        assert!(!dict.contains_at(&1, 100));
    }

    #[test]
    fn insert_then_contains() {
        let mut dict = RetroDictionary::new();
        assert!(dict.insert_at(7u64, 10));
        assert!(dict.contains(&7));
        assert!(dict.contains_at(&7, 10));
        assert!(!dict.contains_at(&7, 9));
    }

    #[test]
    fn erase_hides_key_from_later_times() {
        let mut dict = RetroDictionary::new();
        dict.insert_at(7u64, 10);
        dict.erase_at(7u64, 20);
        assert!(dict.contains_at(&7, 15));
        assert!(!dict.contains_at(&7, 20));
        assert!(!dict.contains(&7));
    }

    #[test]
    fn duplicate_time_is_rejected() {
        let mut dict = RetroDictionary::new();
        assert!(dict.insert_at(1u64, 5));
        assert!(!dict.insert_at(2u64, 5));
        assert!(!dict.erase_at(1u64, 5));
        assert!(dict.contains_at(&1, 5));
        assert!(!dict.contains_at(&2, 5));
    }

    #[test]
    fn double_insert_is_tolerated() {
        // The dictionary does not police alternation.
        let mut dict = RetroDictionary::new();
        assert!(dict.insert_at(9u64, 5));
        assert!(dict.insert_at(9u64, 10));
        assert!(dict.contains_at(&9, 7));
        assert!(dict.contains(&9));
    }

    #[test]
    fn retroactive_erase_rewrites_membership() {
        let mut dict = RetroDictionary::new();
        dict.insert_at(3u64, 10);
        assert!(dict.contains_at(&3, 50));
        dict.erase_at(3u64, 20);
        assert!(!dict.contains_at(&3, 50));
        assert!(dict.contains_at(&3, 15));
    }

    #[test]
    fn present_time_updates_advance_the_clock() {
        let mut dict = RetroDictionary::new();
        dict.insert(1u64);
        dict.insert(2u64);
        dict.erase(1u64);
        // Times 0, 1, 2 were synthesized in order.
        assert!(dict.contains_at(&1, 1));
        assert!(!dict.contains_at(&1, 2));
        assert!(dict.contains(&2));
    }

    #[test]
    fn delete_operation_unwinds_an_event() {
        let mut dict = RetroDictionary::new();
        dict.insert_at(5u64, 10);
        dict.erase_at(5u64, 20);
        assert!(!dict.contains(&5));
        assert!(dict.delete_operation(20));
        assert!(dict.contains(&5));
        assert!(!dict.delete_operation(20));
    }

    #[test]
    fn delete_operation_then_redo_restores_equality() {
        let mut dict = RetroDictionary::new();
        dict.insert_at(5u64, 10);
        dict.erase_at(5u64, 20);
        let snapshot = dict.clone();
        assert!(dict.delete_operation(10));
        assert_ne!(dict, snapshot);
        assert!(dict.insert_at(5u64, 10));
        assert_eq!(dict, snapshot);
    }

    #[test]
    fn clear_resets_the_clock() {
        let mut dict = RetroDictionary::new();
        dict.insert(1u64);
        dict.clear();
        assert_eq!(dict.operation_count(), 0);
        assert!(!dict.contains(&1));
        // A fresh insert starts at time 0 again.
        dict.insert(2u64);
        assert!(dict.contains_at(&2, 0));
    }

    #[test]
    fn clone_is_independent() {
        let mut dict = RetroDictionary::new();
        dict.insert_at(1u64, 10);
        let mut copy = dict.clone();
        copy.erase_at(1u64, 20);
        assert!(dict.contains(&1));
        assert!(!copy.contains(&1));
    }
}
