//! # Range Registry
//!
//! Tracks the address intervals currently "of interest". Ranges are stored in
//! a `BTreeSet` keyed by an *equivalence-for-storage* order:
//!
//! ```text
//!   A < B   iff  A.end < B.start
//!   A > B   iff  B.end < A.start
//!   A == B  otherwise (the ranges overlap)
//! ```
//!
//! This is not interval equality. Any two ranges that share an address
//! compare `Equal`, so the set never holds two overlapping ranges, and a
//! point query for `x` is a lookup of `[x, x]`.
//!
//! ## Consequences
//!
//! - `watch` of a range overlapping a stored one is dropped; the stored range
//!   is kept as-is, not widened.
//! - `unwatch` removes whichever stored range overlaps the request, even if
//!   its bounds differ from the caller's. A request overlapping several stored
//!   ranges removes only one of them.
//!
//! Stored keys are pairwise disjoint, so they are totally ordered among
//! themselves, and for any query the stored keys compare as a run of
//! `Greater`, then `Equal`, then `Less`. Binary search over the tree stays
//! valid under that shape.

use crate::domain::{Address, AddressRange};
use log::debug;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Storage key comparing ranges by overlap
#[derive(Debug, Clone, Copy)]
struct RangeKey(AddressRange);

impl Ord for RangeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0.end() < other.0.start() {
            Ordering::Less
        } else if other.0.end() < self.0.start() {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

impl PartialOrd for RangeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RangeKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.overlaps(&other.0)
    }
}

impl Eq for RangeKey {}

/// Outcome of a [`RangeRegistry::watch`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The range was stored
    Inserted,
    /// An overlapping range was already stored and was kept unchanged
    Retained(AddressRange),
}

/// Ordered set of watched, pairwise non-overlapping address ranges
#[derive(Debug, Default, Clone)]
pub struct RangeRegistry {
    ranges: BTreeSet<RangeKey>,
}

impl RangeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching `range` unless an overlapping range is already watched
    pub fn watch(&mut self, range: AddressRange) -> WatchOutcome {
        if let Some(existing) = self.ranges.get(&RangeKey(range)) {
            debug!("watch {range} dropped: overlaps watched range {}", existing.0);
            return WatchOutcome::Retained(existing.0);
        }
        self.ranges.insert(RangeKey(range));
        debug!("watching {range} ({} range(s) total)", self.ranges.len());
        WatchOutcome::Inserted
    }

    /// Stop watching the stored range that overlaps `range`, if any
    ///
    /// Returns the range that was actually removed, which need not equal
    /// `range`.
    pub fn unwatch(&mut self, range: AddressRange) -> Option<AddressRange> {
        let removed = self.ranges.take(&RangeKey(range)).map(|key| key.0);
        match removed {
            Some(stored) if stored != range => {
                debug!("unwatch {range} removed overlapping range {stored}");
            }
            Some(stored) => debug!("unwatched {stored}"),
            None => debug!("unwatch {range}: no overlapping range watched"),
        }
        removed
    }

    /// Whether `addr` lies in some watched range. O(log n).
    #[inline]
    #[must_use]
    pub fn contains(&self, addr: Address) -> bool {
        self.ranges.contains(&RangeKey(AddressRange::point(addr)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Watched ranges in ascending address order
    pub fn iter(&self) -> impl Iterator<Item = AddressRange> + '_ {
        self.ranges.iter().map(|key| key.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u64, end: u64) -> AddressRange {
        AddressRange::new(start, end)
    }

    #[test]
    fn test_watch_then_contains() {
        let mut registry = RangeRegistry::new();
        assert_eq!(registry.watch(range(1000, 1099)), WatchOutcome::Inserted);

        assert!(registry.contains(Address(1000)));
        assert!(registry.contains(Address(1050)));
        assert!(registry.contains(Address(1099)));
        assert!(!registry.contains(Address(999)));
        assert!(!registry.contains(Address(1100)));
        assert!(!registry.contains(Address(2000)));
    }

    #[test]
    fn test_overlapping_watch_keeps_first_range() {
        let mut registry = RangeRegistry::new();
        registry.watch(range(10, 20));
        let outcome = registry.watch(range(15, 25));

        assert_eq!(outcome, WatchOutcome::Retained(range(10, 20)));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(Address(17)));
        // Not widened: 21..=25 stays outside
        assert!(!registry.contains(Address(23)));
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec![range(10, 20)]);
    }

    #[test]
    fn test_touching_endpoint_counts_as_overlap() {
        let mut registry = RangeRegistry::new();
        registry.watch(range(10, 20));
        assert_eq!(registry.watch(range(20, 30)), WatchOutcome::Retained(range(10, 20)));
        assert_eq!(registry.watch(range(21, 30)), WatchOutcome::Inserted);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unwatch_exact_range() {
        let mut registry = RangeRegistry::new();
        registry.watch(range(10, 20));
        registry.watch(range(15, 25));

        assert_eq!(registry.unwatch(range(10, 20)), Some(range(10, 20)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unwatch_overlapping_range_removes_stored_range() {
        let mut registry = RangeRegistry::new();
        registry.watch(range(10, 20));
        registry.watch(range(15, 25));

        assert_eq!(registry.unwatch(range(15, 25)), Some(range(10, 20)));
        assert!(registry.is_empty());
        assert!(!registry.contains(Address(17)));
    }

    #[test]
    fn test_unwatch_subrange_removes_whole_range() {
        let mut registry = RangeRegistry::new();
        registry.watch(range(100, 200));

        assert_eq!(registry.unwatch(range(150, 150)), Some(range(100, 200)));
        assert!(!registry.contains(Address(100)));
    }

    #[test]
    fn test_unwatch_missing_range_is_noop() {
        let mut registry = RangeRegistry::new();
        assert_eq!(registry.unwatch(range(1, 2)), None);
        assert!(registry.is_empty());

        registry.watch(range(10, 20));
        assert_eq!(registry.unwatch(range(30, 40)), None);
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec![range(10, 20)]);
    }

    #[test]
    fn test_unwatch_spanning_two_ranges_removes_one() {
        let mut registry = RangeRegistry::new();
        registry.watch(range(10, 20));
        registry.watch(range(30, 40));

        let removed = registry.unwatch(range(15, 35));
        assert!(removed == Some(range(10, 20)) || removed == Some(range(30, 40)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_many_disjoint_ranges() {
        let mut registry = RangeRegistry::new();
        // Insert out of order
        for i in (0..100u64).rev() {
            registry.watch(range(i * 100, i * 100 + 49));
        }
        assert_eq!(registry.len(), 100);

        for i in 0..100u64 {
            assert!(registry.contains(Address(i * 100)));
            assert!(registry.contains(Address(i * 100 + 49)));
            assert!(!registry.contains(Address(i * 100 + 50)));
            assert!(!registry.contains(Address(i * 100 + 99)));
        }

        let starts: Vec<u64> = registry.iter().map(|r| r.start().get()).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn test_full_address_space_range() {
        let mut registry = RangeRegistry::new();
        registry.watch(range(0, u64::MAX));
        assert!(registry.contains(Address(0)));
        assert!(registry.contains(Address(u64::MAX)));
    }
}
