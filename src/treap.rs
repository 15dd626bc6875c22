//! Balance treap: a randomized BST over logical time with running-sum summaries.
//!
//! Each node records one signed event (+1 for an insert or push, -1 for an
//! erase or pop) at a distinct time. Every subtree maintains four aggregates
//! of its in-time-order event sequence:
//!
//! - `balance`: the signed sum of the whole subtree
//! - `min_pref`: the minimum running sum over non-empty prefixes
//! - `min_suff` / `max_suff`: the min/max running sum over non-empty
//!   suffixes, accumulated from the right end
//!
//! The prefix minimum is what admission checks look at (a valid event
//! history never dips below zero), and the suffix range is what lets
//! [`Treap::kth_time`] walk straight to the event where the running sum
//! from the right reaches a target value.
//!
//! # Operations
//!
//! - `insert(tm, ins, rng)` / `erase(tm)`: O(log n) point updates
//! - `split_off(tm)` / `append(other)`: O(log n) structural surgery
//! - `balance()` / `min_prefix()` / `max_suffix()`: O(1) reads
//! - `kth_time(k)`: O(log n) running-sum search
//!
//! Balancing uses random heap priorities. A priority is 30 bits built from
//! two 15-bit draws of a caller-supplied [`StdRng`], so no single draw's
//! high bits are trusted. Callers that need reproducible shapes seed the
//! generator with `StdRng::seed_from_u64`.

use rand::Rng;
use rand::rngs::StdRng;

/// Logical time. All events in a treap carry distinct times.
pub type Time = i64;

type Link = Option<Box<Node>>;

#[derive(Clone, Debug)]
struct Node {
    left: Link,
    right: Link,
    prior: u32,
    /// True for a +1 event, false for a -1 event.
    ins: bool,
    tm: Time,
    balance: i64,
    min_pref: i64,
    min_suff: i64,
    max_suff: i64,
}

fn balance_of(link: Option<&Node>) -> i64 {
    return link.map_or(0, |n| n.balance);
}

fn min_pref_of(link: Option<&Node>) -> i64 {
    return link.map_or(0, |n| n.min_pref);
}

fn min_suff_of(link: Option<&Node>) -> i64 {
    return link.map_or(0, |n| n.min_suff);
}

fn max_suff_of(link: Option<&Node>) -> i64 {
    return link.map_or(0, |n| n.max_suff);
}

impl Node {
    fn new(tm: Time, ins: bool, prior: u32) -> Node {
        let sign = if ins { 1 } else { -1 };
        return Node {
            left: None,
            right: None,
            prior,
            ins,
            tm,
            balance: sign,
            min_pref: sign,
            min_suff: sign,
            max_suff: sign,
        };
    }

    fn sign(&self) -> i64 {
        return if self.ins { 1 } else { -1 };
    }

    /// Recompute this node's aggregates from its children.
    ///
    /// A missing child contributes 0 to the balance; for its own extreme it
    /// contributes the identity (+inf for minima, -inf for maxima), while
    /// the cross term clamps it through `min(0, ..)` / `max(0, ..)` so an
    /// empty side never extends a prefix or suffix.
    fn update(&mut self) {
        let l = self.left.as_deref();
        let r = self.right.as_deref();
        let sign = self.sign();
        self.balance = sign + balance_of(l) + balance_of(r);
        self.min_pref = i64::min(
            l.map_or(i64::MAX, |n| n.min_pref),
            balance_of(l) + sign + i64::min(0, min_pref_of(r)),
        );
        self.min_suff = i64::min(
            r.map_or(i64::MAX, |n| n.min_suff),
            balance_of(r) + sign + i64::min(0, min_suff_of(l)),
        );
        self.max_suff = i64::max(
            r.map_or(i64::MIN, |n| n.max_suff),
            balance_of(r) + sign + i64::max(0, max_suff_of(l)),
        );
    }
}

/// Merge two treaps; every time in `l` must be <= every time in `r`.
fn merge(l: Link, r: Link) -> Link {
    match (l, r) {
        (None, r) => return r,
        (l, None) => return l,
        (Some(mut l), Some(mut r)) => {
            if l.prior > r.prior {
                l.right = merge(l.right.take(), Some(r));
                l.update();
                return Some(l);
            } else {
                r.left = merge(Some(l), r.left.take());
                r.update();
                return Some(r);
            }
        }
    }
}

/// Split into (times <= x, times > x), recomputing aggregates on the path.
fn split(link: Link, x: Time) -> (Link, Link) {
    let Some(mut node) = link else {
        return (None, None);
    };
    if node.tm <= x {
        let (l, r) = split(node.right.take(), x);
        node.right = l;
        node.update();
        return (Some(node), r);
    } else {
        let (l, r) = split(node.left.take(), x);
        node.left = r;
        node.update();
        return (l, Some(node));
    }
}

/// Draw a 30-bit priority from two 15-bit halves.
fn priority(rng: &mut StdRng) -> u32 {
    return ((rng.gen::<u32>() & 0x7fff) << 15) | (rng.gen::<u32>() & 0x7fff);
}

/// A treap of signed events keyed by time.
#[derive(Clone, Debug, Default)]
pub struct Treap {
    root: Link,
}

impl Treap {
    /// Create an empty treap.
    pub fn new() -> Treap {
        return Treap { root: None };
    }

    /// True if the treap holds no events.
    pub fn is_empty(&self) -> bool {
        return self.root.is_none();
    }

    /// Signed sum of every event. 0 when empty.
    pub fn balance(&self) -> i64 {
        return balance_of(self.root.as_deref());
    }

    /// Minimum running sum over prefixes. 0 when empty, so an empty
    /// history always passes a `min_prefix() >= 0` admission check.
    pub fn min_prefix(&self) -> i64 {
        return min_pref_of(self.root.as_deref());
    }

    /// Maximum running sum over suffixes. 0 when empty.
    pub fn max_suffix(&self) -> i64 {
        return max_suff_of(self.root.as_deref());
    }

    /// Record an event at time `tm`. The caller guarantees `tm` is not
    /// already present; duplicate-time policing lives in the containers'
    /// operation logs.
    pub fn insert(&mut self, tm: Time, ins: bool, rng: &mut StdRng) {
        let (l, r) = split(self.root.take(), tm);
        let node = Some(Box::new(Node::new(tm, ins, priority(rng))));
        self.root = merge(merge(l, node), r);
    }

    /// Remove the event at time `tm`, if any.
    pub fn erase(&mut self, tm: Time) {
        let (l, r) = split(self.root.take(), tm);
        // Carve the single node at `tm` off the right edge of `l`. At
        // Time::MIN there is nothing below, so `l` itself is the carving.
        if tm == Time::MIN {
            self.root = r;
            return;
        }
        let (l, _mid) = split(l, tm - 1);
        self.root = merge(l, r);
    }

    /// Split off and return every event with time > `tm`, keeping the rest.
    pub fn split_off(&mut self, tm: Time) -> Treap {
        let (l, r) = split(self.root.take(), tm);
        self.root = l;
        return Treap { root: r };
    }

    /// Re-attach a treap split off earlier. Every time in `self` must be
    /// <= every time in `other`.
    pub fn append(&mut self, other: Treap) {
        self.root = merge(self.root.take(), other.root);
    }

    /// Find the time of the event where the running sum from the right end
    /// reaches exactly `k`, preferring the rightmost match.
    ///
    /// At each node: if the right subtree's suffix-sum range covers `k`,
    /// the match is in there (suffix sums move in unit steps, so the range
    /// has no holes). Otherwise test the node itself, then renormalize `k`
    /// by the right-plus-self contribution and continue left. Returns
    /// `None` when no suffix reaches `k`.
    pub fn kth_time(&self, k: i64) -> Option<Time> {
        let mut cur = self.root.as_deref();
        let mut k = k;
        while let Some(node) = cur {
            if let Some(right) = node.right.as_deref() {
                if k >= right.min_suff && k <= right.max_suff {
                    cur = Some(right);
                    continue;
                }
            }
            let right_balance = balance_of(node.right.as_deref()) + node.sign();
            if right_balance == k {
                return Some(node.tm);
            }
            k -= right_balance;
            cur = node.left.as_deref();
        }
        return None;
    }

    /// Dump the event stream in time order as `(time, ins)` pairs.
    /// Containers compare histories through this, so two treaps with
    /// different shapes but the same events are equal where it matters.
    pub fn events(&self) -> Vec<(Time, bool)> {
        fn walk(link: Option<&Node>, out: &mut Vec<(Time, bool)>) {
            if let Some(node) = link {
                walk(node.left.as_deref(), out);
                out.push((node.tm, node.ins));
                walk(node.right.as_deref(), out);
            }
        }
        let mut out = Vec::new();
        walk(self.root.as_deref(), &mut out);
        return out;
    }

    /// Drop every event.
    pub fn clear(&mut self) {
        self.root = None;
    }
}
