//! Fully retroactive ordered set.
//!
//! For unique keys a valid history makes "the set contains `x`" a union of
//! disjoint time intervals: each insert at `t_ins` opens `[t_ins, +inf)`,
//! and a later erase at `t_er` trims it to `[t_ins, t_er - 1]`. Those
//! intervals live in a shared [`SegmentTree`], which turns `lower_bound` /
//! `upper_bound` / membership at any past time into a single root-to-leaf
//! walk.
//!
//! Updates are only admitted at the edit frontier of their key (after its
//! latest event, with inserts and erases alternating), which is exactly
//! what keeps the interval picture well-formed.

use std::collections::BTreeMap;

use crate::segment_tree::SegKey;
use crate::segment_tree::SegmentTree;
use crate::treap::Time;

/// A fully retroactive ordered set of numeric keys.
///
/// `K::MAX` is reserved as the "no such element" sentinel returned by the
/// bound queries and must not be stored.
#[derive(Clone, Debug)]
pub struct RetroSet<K: SegKey> {
    /// Every logged update, keyed by its (unique) time.
    operations: BTreeMap<Time, K>,
    /// Per-key event times, strictly increasing, alternating
    /// insert/erase starting with insert.
    sequences: BTreeMap<K, Vec<Time>>,
    /// Live intervals per key.
    tree: SegmentTree<K>,
}

impl<K: SegKey> RetroSet<K> {
    /// Create an empty set.
    pub fn new() -> RetroSet<K> {
        return RetroSet {
            operations: BTreeMap::new(),
            sequences: BTreeMap::new(),
            tree: SegmentTree::new(),
        };
    }

    fn last_time(&self) -> Time {
        return self.operations.last_key_value().map_or(0, |(tm, _)| tm + 1);
    }

    /// Retroactively insert `x` at time `tm`: opens the interval
    /// `[tm, +inf)` for `x`. Admissible when `tm` is unused, the key's
    /// event sequence has even length, and `tm` lies after its latest
    /// event.
    pub fn insert_at(&mut self, x: K, tm: Time) -> bool {
        if self.operations.contains_key(&tm) {
            return false;
        }
        if let Some(events) = self.sequences.get(&x) {
            if events.len() % 2 != 0 || events.last().is_some_and(|&last| last > tm) {
                return false;
            }
        }
        self.operations.insert(tm, x);
        self.tree.add(tm, Time::MAX, x);
        self.sequences.entry(x).or_default().push(tm);
        return true;
    }

    /// Retroactively erase `x` at time `tm`: trims the key's open interval
    /// to `[t_ins, tm - 1]`. Admissible when `tm` is unused, the key is
    /// present (odd event sequence), and `tm` lies after its latest event.
    pub fn erase_at(&mut self, x: K, tm: Time) -> bool {
        if self.operations.contains_key(&tm) {
            return false;
        }
        let Some(events) = self.sequences.get_mut(&x) else {
            return false;
        };
        let prev = match events.last() {
            Some(&last) if events.len() % 2 == 1 && last <= tm => last,
            _ => return false,
        };
        events.push(tm);
        self.operations.insert(tm, x);
        self.tree.remove(prev, Time::MAX, x);
        self.tree.add(prev, tm - 1, x);
        return true;
    }

    /// Insert `x` at the present.
    pub fn insert(&mut self, x: K) -> bool {
        let tm = self.last_time();
        return self.insert_at(x, tm);
    }

    /// Erase `x` at the present.
    pub fn erase(&mut self, x: K) -> bool {
        let tm = self.last_time();
        return self.erase_at(x, tm);
    }

    /// Remove the update logged at `tm`, restoring the prior interval
    /// shape. Only the most recent event of its key may be deleted.
    pub fn delete_operation(&mut self, tm: Time) -> bool {
        let Some(&x) = self.operations.get(&tm) else {
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
            // Deleted an erase: the preceding insert is open again.
            let prev = events[events.len() - 1];
            self.tree.remove(prev, tm - 1, x);
            self.tree.add(prev, Time::MAX, x);
        } else {
            // Deleted an insert.
            self.tree.remove(tm, Time::MAX, x);
        }
        if events.is_empty() {
            self.sequences.remove(&x);
        }
        self.operations.remove(&tm);
        return true;
    }

    /// Smallest member >= `x` at time `tm`, or `K::MAX` if none.
    pub fn lower_bound_at(&self, x: K, tm: Time) -> K {
        return self.tree.lower_bound(tm, x);
    }

    /// Smallest member > `x` at time `tm`, or `K::MAX` if none.
    pub fn upper_bound_at(&self, x: K, tm: Time) -> K {
        return self.tree.upper_bound(tm, x);
    }

    /// Was `x` a member at time `tm`?
    pub fn contains_at(&self, x: K, tm: Time) -> bool {
        return self.lower_bound_at(x, tm) == x;
    }

    /// Smallest member >= `x` now, or `K::MAX` if none.
    pub fn lower_bound(&self, x: K) -> K {
        return self.lower_bound_at(x, Time::MAX);
    }

    /// Smallest member > `x` now, or `K::MAX` if none.
    pub fn upper_bound(&self, x: K) -> K {
        return self.upper_bound_at(x, Time::MAX);
    }

    /// Is `x` a member now?
    pub fn contains(&self, x: K) -> bool {
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
        self.tree.clear();
    }
}

impl<K: SegKey> Default for RetroSet<K> {
    fn default() -> Self {
        return Self::new();
    }
}

/// Equality compares the logged histories.
impl<K: SegKey> PartialEq for RetroSet<K> {
    fn eq(&self, other: &Self) -> bool {
        return self.operations == other.operations;
    }
}

impl<K: SegKey> Eq for RetroSet<K> {}
