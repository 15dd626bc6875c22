//! Retroactive unordered multiset.
//!
//! Each key owns a balance treap of its +1/-1 events over time. The
//! invariant that makes retroactive edits cheap is per-key: every prefix
//! sum of the signed event stream stays >= 0, i.e. nothing is ever removed
//! that was not there. Admission is a tentative edit followed by one O(1)
//! read of the treap's prefix minimum, rolled back on violation.
//!
//! Queries at a past time split the key's treap at the query time, read an
//! aggregate off the left part, and splice the treap back together.

use std::collections::BTreeMap;
use std::hash::Hash;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;

use crate::treap::Time;
use crate::treap::Treap;

/// A fully retroactive multiset tracking per-key multiplicities.
#[derive(Clone, Debug)]
pub struct RetroMultiset<T> {
    /// Every logged update, keyed by its (unique) time.
    operations: BTreeMap<Time, T>,
    /// Per-key signed event treaps.
    sequences: FxHashMap<T, Treap>,
    /// Priority source for every per-key treap.
    rng: StdRng,
}

impl<T: Clone + Eq + Hash> RetroMultiset<T> {
    /// Create an empty multiset with entropy-seeded treap priorities.
    pub fn new() -> RetroMultiset<T> {
        return RetroMultiset::from_rng(StdRng::from_entropy());
    }

    /// Create an empty multiset with a fixed priority seed, for
    /// reproducible tree shapes in tests.
    pub fn with_seed(seed: u64) -> RetroMultiset<T> {
        return RetroMultiset::from_rng(StdRng::seed_from_u64(seed));
    }

    fn from_rng(rng: StdRng) -> RetroMultiset<T> {
        return RetroMultiset {
            operations: BTreeMap::new(),
            sequences: FxHashMap::default(),
            rng,
        };
    }

    fn last_time(&self) -> Time {
        return self.operations.last_key_value().map_or(0, |(tm, _)| tm + 1);
    }

    /// Retroactively insert one copy of `x` at time `tm`. Adding a copy
    /// can never invalidate the history, so this fails only when `tm` is
    /// already taken.
    pub fn insert_at(&mut self, x: T, tm: Time) -> bool {
        if self.operations.contains_key(&tm) {
            return false;
        }
        let treap = self.sequences.entry(x.clone()).or_default();
        treap.insert(tm, true, &mut self.rng);
        self.operations.insert(tm, x);
        return true;
    }

    /// Retroactively erase one copy of `x` at time `tm`. Rejected (and
    /// rolled back) when some moment in `[tm, now]` would replay to a
    /// negative count.
    pub fn erase_at(&mut self, x: T, tm: Time) -> bool {
        if self.operations.contains_key(&tm) {
            return false;
        }
        let treap = self.sequences.entry(x.clone()).or_default();
        treap.insert(tm, false, &mut self.rng);
        if treap.min_prefix() < 0 {
            treap.erase(tm);
            if treap.is_empty() {
                self.sequences.remove(&x);
            }
            return false;
        }
        self.operations.insert(tm, x);
        return true;
    }

    /// Insert one copy of `x` at the present.
    pub fn insert(&mut self, x: T) -> bool {
        let tm = self.last_time();
        return self.insert_at(x, tm);
    }

    /// Erase one copy of `x` at the present.
    pub fn erase(&mut self, x: T) -> bool {
        let tm = self.last_time();
        return self.erase_at(x, tm);
    }

    /// Remove the update logged at `tm`. Rejected when the history would
    /// no longer replay (which can only happen when `tm` was an insert
    /// whose copy a later erase consumes).
    pub fn delete_operation(&mut self, tm: Time) -> bool {
        let Some(x) = self.operations.get(&tm).cloned() else {
            return false;
        };
        let Some(treap) = self.sequences.get_mut(&x) else {
            return false;
        };
        treap.erase(tm);
        if treap.min_prefix() < 0 {
            // Removing an erase only raises prefix sums, so the event at
            // `tm` must have been an insert.
            treap.insert(tm, true, &mut self.rng);
            return false;
        }
        if treap.is_empty() {
            self.sequences.remove(&x);
        }
        self.operations.remove(&tm);
        return true;
    }

    /// Was at least one copy of `x` present at time `tm`?
    pub fn contains_at(&mut self, x: &T, tm: Time) -> bool {
        let Some(treap) = self.sequences.get_mut(x) else {
            return false;
        };
        let right = treap.split_off(tm);
        // On a history with all prefix sums >= 0 the maximum suffix sum of
        // the prefix equals its balance, i.e. the count at `tm`.
        let ans = treap.max_suffix() > 0;
        treap.append(right);
        return ans;
    }

    /// Is at least one copy of `x` present now?
    pub fn contains(&mut self, x: &T) -> bool {
        return self.contains_at(x, Time::MAX);
    }

    /// Multiplicity of `x` at time `tm`.
    pub fn count_at(&mut self, x: &T, tm: Time) -> u64 {
        let Some(treap) = self.sequences.get_mut(x) else {
            return 0;
        };
        let right = treap.split_off(tm);
        let count = treap.balance().max(0) as u64;
        treap.append(right);
        return count;
    }

    /// Multiplicity of `x` now.
    pub fn count(&mut self, x: &T) -> u64 {
        return self.count_at(x, Time::MAX);
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

impl<T: Clone + Eq + Hash> Default for RetroMultiset<T> {
    fn default() -> Self {
        return Self::new();
    }
}

/// Two multisets are equal when they logged the same updates and every
/// key replays the same event stream; treap shapes (priorities) are not
/// observable.
impl<T: Clone + Eq + Hash> PartialEq for RetroMultiset<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.operations != other.operations || self.sequences.len() != other.sequences.len() {
            return false;
        }
        for (key, treap) in &self.sequences {
            match other.sequences.get(key) {
                Some(other_treap) if other_treap.events() == treap.events() => {}
                _ => return false,
            }
        }
        return true;
    }
}

impl<T: Clone + Eq + Hash> Eq for RetroMultiset<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_contains() {
        let mut ms = RetroMultiset::with_seed(1);
        assert!(ms.insert_at("a", 10));
        assert!(ms.contains(&"a"));
        assert!(ms.contains_at(&"a", 10));
        assert!(!ms.contains_at(&"a", 9));
    }

    #[test]
    fn multiplicity_accumulates() {
        let mut ms = RetroMultiset::with_seed(1);
        ms.insert_at("a", 10);
        ms.insert_at("a", 20);
        ms.insert_at("a", 30);
        ms.erase_at("a", 40);
        assert_eq!(ms.count_at(&"a", 15), 1);
        assert_eq!(ms.count_at(&"a", 35), 3);
        assert_eq!(ms.count(&"a"), 2);
    }

    #[test]
    fn erase_of_absent_copy_is_rejected_and_rolled_back() {
        let mut ms = RetroMultiset::with_seed(1);
        assert!(!ms.erase_at("a", 10));
        assert_eq!(ms.operation_count(), 0);
        assert!(!ms.contains(&"a"));

        // An erase before the only insert is just as bad.
        ms.insert_at("a", 20);
        assert!(!ms.erase_at("a", 15));
        assert_eq!(ms.count(&"a"), 1);
    }

    #[test]
    fn erase_after_insert_is_admitted() {
        let mut ms = RetroMultiset::with_seed(1);
        ms.insert_at("a", 10);
        assert!(ms.erase_at("a", 20));
        assert!(ms.contains_at(&"a", 15));
        assert!(!ms.contains_at(&"a", 20));
    }

    #[test]
    fn duplicate_time_is_rejected() {
        let mut ms = RetroMultiset::with_seed(1);
        assert!(ms.insert_at("a", 10));
        assert!(!ms.insert_at("b", 10));
        assert!(!ms.erase_at("a", 10));
    }

    #[test]
    fn delete_operation_of_consumed_insert_is_rejected() {
        let mut ms = RetroMultiset::with_seed(1);
        ms.insert_at("x", 10);
        ms.erase_at("x", 20);
        // Deleting the insert would drive the count negative at t=20.
        assert!(!ms.delete_operation(10));
        assert!(ms.contains_at(&"x", 15));
        // Deleting the erase is always fine.
        assert!(ms.delete_operation(20));
        assert!(ms.contains(&"x"));
    }

    #[test]
    fn delete_then_redo_restores_equality() {
        let mut ms = RetroMultiset::with_seed(1);
        ms.insert_at("x", 10);
        ms.insert_at("x", 20);
        ms.erase_at("x", 30);
        let snapshot = ms.clone();
        assert!(ms.delete_operation(20));
        assert!(ms.insert_at("x", 20));
        assert_eq!(ms, snapshot);
    }

    #[test]
    fn equality_ignores_treap_shape() {
        // Different priority seeds give different tree shapes; the
        // containers must still compare equal.
        let mut a = RetroMultiset::with_seed(1);
        let mut b = RetroMultiset::with_seed(999);
        for tm in 0..32i64 {
            a.insert_at("k", tm);
            b.insert_at("k", tm);
        }
        assert_eq!(a, b);
        b.erase_at("k", 100);
        assert_ne!(a, b);
    }

    #[test]
    fn present_time_updates_advance_the_clock() {
        let mut ms = RetroMultiset::with_seed(1);
        ms.insert("a");
        ms.insert("a");
        assert!(ms.erase("a"));
        assert_eq!(ms.count(&"a"), 1);
        assert_eq!(ms.count_at(&"a", 1), 2);
    }

    #[test]
    fn clear_then_replay_matches_fresh() {
        let mut ms = RetroMultiset::with_seed(7);
        ms.insert_at("a", 10);
        ms.erase_at("a", 20);
        ms.clear();
        ms.insert_at("a", 10);
        ms.erase_at("a", 20);

        let mut fresh = RetroMultiset::with_seed(8);
        fresh.insert_at("a", 10);
        fresh.erase_at("a", 20);
        assert_eq!(ms, fresh);
    }

    #[test]
    fn clone_is_independent() {
        let mut ms = RetroMultiset::with_seed(1);
        ms.insert_at("a", 10);
        let mut copy = ms.clone();
        copy.erase_at("a", 20);
        assert!(ms.contains(&"a"));
        assert!(!copy.contains(&"a"));
        assert_ne!(ms, copy);
    }
}
