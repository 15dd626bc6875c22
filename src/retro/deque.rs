//! Retroactive deque.
//!
//! Three balance treaps carry the edited history:
//!
//! - `ul`: left-side events (`push_front` = +1, `pop_front` = -1)
//! - `ur`: right-side events (`push_back` = +1, `pop_back` = -1)
//! - `bal`: every event combined, whose running prefix sum is the deque's
//!   size over time
//!
//! Admission is a tentative insert into `bal` plus one read of its prefix
//! minimum: a history is valid exactly when the size never dips below
//! zero. The endpoint queries are the delicate part. Splitting both side
//! treaps at the query time, the element at the back is either the
//! youngest surviving `push_back` or, when the front-side pop stream has
//! eaten through every right push, the deepest surviving `push_front`:
//!
//! - if `max_suffix(ur) > max(0, -min_prefix(ul))`, some right push
//!   survives every pop aimed at the back, and the back is the event
//!   where `ur`'s suffix sum first reaches 1;
//! - otherwise the back comes from the left stream: the event where `ul`'s
//!   suffix sum reaches `balance(ul) + balance(ur)`, the deque size, which
//!   is how deep the back sits counting from the left end.
//!
//! `front` is the mirror image with the two trees swapped.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::treap::Time;
use crate::treap::Treap;

/// A retroactive double-ended queue.
#[derive(Clone, Debug)]
pub struct RetroDeque<T> {
    /// Push operations and their values, keyed by (unique) time.
    operations: BTreeMap<Time, T>,
    /// Times at which pops happened.
    pop_operations: BTreeSet<Time>,
    /// Left-side events.
    ul: Treap,
    /// Right-side events.
    ur: Treap,
    /// All events; its prefix minimum guards admission.
    bal: Treap,
    /// Priority source for all three treaps.
    rng: StdRng,
}

impl<T: Clone> RetroDeque<T> {
    /// Create an empty deque with entropy-seeded treap priorities.
    pub fn new() -> RetroDeque<T> {
        return RetroDeque::from_rng(StdRng::from_entropy());
    }

    /// Create an empty deque with a fixed priority seed, for reproducible
    /// tree shapes in tests.
    pub fn with_seed(seed: u64) -> RetroDeque<T> {
        return RetroDeque::from_rng(StdRng::seed_from_u64(seed));
    }

    fn from_rng(rng: StdRng) -> RetroDeque<T> {
        return RetroDeque {
            operations: BTreeMap::new(),
            pop_operations: BTreeSet::new(),
            ul: Treap::new(),
            ur: Treap::new(),
            bal: Treap::new(),
            rng,
        };
    }

    fn last_time(&self) -> Time {
        let last_push = self.operations.last_key_value().map(|(&tm, _)| tm);
        let last_pop = self.pop_operations.last().copied();
        return match last_push.max(last_pop) {
            Some(tm) => tm + 1,
            None => 0,
        };
    }

    fn time_taken(&self, tm: Time) -> bool {
        return self.operations.contains_key(&tm) || self.pop_operations.contains(&tm);
    }

    fn insert_push(&mut self, x: T, tm: Time, back_side: bool) -> bool {
        if self.time_taken(tm) {
            return false;
        }
        self.bal.insert(tm, true, &mut self.rng);
        if self.bal.min_prefix() < 0 {
            self.bal.erase(tm);
            return false;
        }
        self.operations.insert(tm, x);
        let side = if back_side { &mut self.ur } else { &mut self.ul };
        side.insert(tm, true, &mut self.rng);
        return true;
    }

    fn insert_pop(&mut self, tm: Time, back_side: bool) -> bool {
        if self.time_taken(tm) {
            return false;
        }
        self.bal.insert(tm, false, &mut self.rng);
        if self.bal.min_prefix() < 0 {
            self.bal.erase(tm);
            return false;
        }
        self.pop_operations.insert(tm);
        let side = if back_side { &mut self.ur } else { &mut self.ul };
        side.insert(tm, false, &mut self.rng);
        return true;
    }

    /// Retroactively push `x` onto the back at time `tm`.
    pub fn push_back_at(&mut self, x: T, tm: Time) -> bool {
        return self.insert_push(x, tm, true);
    }

    /// Retroactively push `x` onto the front at time `tm`.
    pub fn push_front_at(&mut self, x: T, tm: Time) -> bool {
        return self.insert_push(x, tm, false);
    }

    /// Retroactively pop the back at time `tm`. Rejected when some moment
    /// in `[tm, now]` would replay to a negative size.
    pub fn pop_back_at(&mut self, tm: Time) -> bool {
        return self.insert_pop(tm, true);
    }

    /// Retroactively pop the front at time `tm`.
    pub fn pop_front_at(&mut self, tm: Time) -> bool {
        return self.insert_pop(tm, false);
    }

    /// Remove the operation logged at `tm`. Removing a pop always
    /// replays; removing a push is rejected when a later pop needs it.
    pub fn delete_operation(&mut self, tm: Time) -> bool {
        if self.operations.contains_key(&tm) {
            self.bal.erase(tm);
            if self.bal.min_prefix() < 0 {
                self.bal.insert(tm, true, &mut self.rng);
                return false;
            }
            self.ul.erase(tm);
            self.ur.erase(tm);
            self.operations.remove(&tm);
            return true;
        }
        if self.pop_operations.contains(&tm) {
            self.bal.erase(tm);
            if self.bal.min_prefix() < 0 {
                self.bal.insert(tm, false, &mut self.rng);
                return false;
            }
            self.ul.erase(tm);
            self.ur.erase(tm);
            self.pop_operations.remove(&tm);
            return true;
        }
        return false;
    }

    /// The element at the back as of time `tm`. `None` when the deque was
    /// empty at `tm`.
    pub fn back_at(&mut self, tm: Time) -> Option<T> {
        let ul_rest = self.ul.split_off(tm);
        let ur_rest = self.ur.split_off(tm);
        let found = if self.ur.max_suffix() > i64::max(0, -self.ul.min_prefix()) {
            // A right push survives: the youngest one whose suffix sum
            // hits 1.
            self.ur.kth_time(1)
        } else {
            let size = self.ul.balance() + self.ur.balance();
            self.ul.kth_time(size)
        };
        self.ul.append(ul_rest);
        self.ur.append(ur_rest);
        let tm = found?;
        return self.operations.get(&tm).cloned();
    }

    /// The element at the front as of time `tm`. `None` when the deque
    /// was empty at `tm`.
    pub fn front_at(&mut self, tm: Time) -> Option<T> {
        let ul_rest = self.ul.split_off(tm);
        let ur_rest = self.ur.split_off(tm);
        let found = if self.ul.max_suffix() > i64::max(0, -self.ur.min_prefix()) {
            self.ul.kth_time(1)
        } else {
            let size = self.ur.balance() + self.ul.balance();
            self.ur.kth_time(size)
        };
        self.ul.append(ul_rest);
        self.ur.append(ur_rest);
        let tm = found?;
        return self.operations.get(&tm).cloned();
    }

    /// The element currently at the back.
    pub fn back(&mut self) -> Option<T> {
        return self.back_at(Time::MAX);
    }

    /// The element currently at the front.
    pub fn front(&mut self) -> Option<T> {
        return self.front_at(Time::MAX);
    }

    /// Push `x` onto the back now; returns the synthesized time.
    pub fn push_back(&mut self, x: T) -> Time {
        let tm = self.last_time();
        self.push_back_at(x, tm);
        return tm;
    }

    /// Push `x` onto the front now; returns the synthesized time.
    pub fn push_front(&mut self, x: T) -> Time {
        let tm = self.last_time();
        self.push_front_at(x, tm);
        return tm;
    }

    /// Pop the back now; returns the synthesized time. Popping an empty
    /// deque is undefined: the pop is not recorded, but callers must
    /// check `is_empty` first rather than rely on that.
    pub fn pop_back(&mut self) -> Time {
        let tm = self.last_time();
        self.pop_back_at(tm);
        return tm;
    }

    /// Pop the front now; returns the synthesized time. Same empty-deque
    /// caveat as [`RetroDeque::pop_back`].
    pub fn pop_front(&mut self) -> Time {
        let tm = self.last_time();
        self.pop_front_at(tm);
        return tm;
    }

    /// Current number of elements.
    pub fn len(&self) -> usize {
        return self.bal.balance().max(0) as usize;
    }

    /// True when the deque is currently empty.
    pub fn is_empty(&self) -> bool {
        return self.len() == 0;
    }

    /// Drop the whole history.
    pub fn clear(&mut self) {
        self.operations.clear();
        self.pop_operations.clear();
        self.ul.clear();
        self.ur.clear();
        self.bal.clear();
    }
}

impl<T: Clone> Default for RetroDeque<T> {
    fn default() -> Self {
        return Self::new();
    }
}

/// Equality compares the logged histories: the push log with its values
/// and the pop times.
impl<T: Clone + PartialEq> PartialEq for RetroDeque<T> {
    fn eq(&self, other: &Self) -> bool {
        return self.operations == other.operations
            && self.pop_operations == other.pop_operations;
    }
}

impl<T: Clone + Eq> Eq for RetroDeque<T> {}
