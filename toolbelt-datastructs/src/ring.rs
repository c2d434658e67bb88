//! Fixed-capacity circular buffers.
//!
//! ```text
//!           cursor
//!             │
//!   ┌───┬───┬─▼─┬───┬───┐
//!   │ 5 │ 6 │ 2 │ 3 │ 4 │   full = true
//!   └───┴───┴───┴───┴───┘
//!   export (oldest → newest): [2, 3, 4, 5, 6]
//! ```
//!
//! * [`RingSlice`] overwrites its oldest slot once every slot has been
//!   written.  Exports are always oldest → newest and never expose slots that
//!   were not written.
//! * [`RingSet`] pairs a ring with a [`Set`] so membership is O(1).  The set
//!   mirrors exactly the values stored in the ring: a value evicted from the
//!   ring leaves the set in the same call, and values already present are
//!   not stored twice.

use std::fmt;
use std::hash::Hash;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::set::Set;
use crate::{DataStructError, Result};

// ───────────────────────────────────────────────────────────────────
// RingSlice
// ───────────────────────────────────────────────────────────────────

/// Circular buffer of `capacity` slots.
///
/// Serialises as an array in oldest → newest order.  Deserialising an
/// array yields a full ring of that length with the cursor at 0, so the
/// array reads back unchanged and the next [`add`](Self::add) evicts its
/// first element.
///
/// JSON does not keep numeric kinds: a ring of integers read back as a ring
/// of `f64` (or `serde_json::Value`) holds floats.  That is a property of the
/// interchange format, not of the ring.
#[derive(Clone, PartialEq, Eq)]
pub struct RingSlice<T> {
    ring: Vec<Option<T>>,
    /// Next slot to write.
    cursor: usize,
    /// Set once the cursor has wrapped back to 0.
    full: bool,
}

impl<T> RingSlice<T> {
    /// Empty ring of `capacity` slots.  A capacity of 0 drops every add.
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: (0..capacity).map(|_| None).collect(),
            cursor: 0,
            full: false,
        }
    }

    /// Full ring holding `items` in oldest → newest order, cursor at 0.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            full: !items.is_empty(),
            ring: items.into_iter().map(Some).collect(),
            cursor: 0,
        }
    }

    /// Write at the cursor and advance it.
    ///
    /// Returns the item that occupied the slot, if the ring was full.  A
    /// zero-capacity ring drops `item`.
    pub fn add(&mut self, item: T) -> Option<T> {
        if self.ring.is_empty() {
            return None;
        }
        let evicted = self.ring[self.cursor].replace(item);
        if evicted.is_some() {
            log::trace!("ring slot {} overwritten", self.cursor);
        }
        self.cursor = if self.cursor + 1 < self.ring.len() {
            self.cursor + 1
        } else {
            0
        };
        if self.cursor == 0 {
            self.full = true;
        }
        evicted
    }

    /// Physical slot access.  `None` for out-of-range or never-written slots.
    pub fn get_item(&self, index: usize) -> Option<&T> {
        self.ring.get(index).and_then(Option::as_ref)
    }

    /// Replace the item in a written physical slot, returning the old one.
    pub fn set_item(&mut self, index: usize, item: T) -> Result<T> {
        let capacity = self.ring.len();
        let slot = self
            .ring
            .get_mut(index)
            .ok_or(DataStructError::IndexOutOfRange { index, len: capacity })?;
        match slot {
            Some(current) => Ok(std::mem::replace(current, item)),
            None => Err(DataStructError::EmptySlot(index)),
        }
    }

    /// Number of written slots (equal to `capacity()` once full).
    pub fn len(&self) -> usize {
        if self.full {
            self.ring.len()
        } else {
            self.cursor
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.ring.len()
    }

    /// Whether every slot has been written at least once.
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Physical index of the next slot to write.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Items oldest → newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let (head, tail) = if self.full {
            (&self.ring[self.cursor..], &self.ring[..self.cursor])
        } else {
            (&self.ring[..self.cursor], &self.ring[..0])
        };
        head.iter().chain(tail.iter()).filter_map(Option::as_ref)
    }

    /// Items oldest → newest.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Physical slots in storage order, `None` where nothing was written.
    pub fn slots(&self) -> impl Iterator<Item = Option<&T>> + '_ {
        self.ring.iter().map(Option::as_ref)
    }
}

impl<T: fmt::Debug> fmt::Debug for RingSlice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Serialize> Serialize for RingSlice<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for RingSlice<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(RingSlice::from_vec)
    }
}

// ───────────────────────────────────────────────────────────────────
// RingSet
// ───────────────────────────────────────────────────────────────────

/// Ring of distinct values with O(1) membership.
#[derive(Clone)]
pub struct RingSet<T> {
    ring: RingSlice<T>,
    set: Set<T>,
}

impl<T: Eq + Hash + Clone> RingSet<T> {
    /// Empty ring of `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: RingSlice::new(capacity),
            set: Set::with_capacity(capacity),
        }
    }

    /// Full ring of the distinct values of `items`, first occurrence kept.
    pub fn from_vec(items: Vec<T>) -> Self {
        let mut set = Set::with_capacity(items.len());
        let items: Vec<T> = items.into_iter().filter(|v| set.add(v.clone())).collect();
        Self {
            ring: RingSlice::from_vec(items),
            set,
        }
    }

    /// Store `item` unless already present, evicting the oldest value when full.
    ///
    /// Returns `true` if `item` was stored.
    pub fn add(&mut self, item: T) -> bool {
        if self.ring.capacity() == 0 || self.set.contains(&item) {
            return false;
        }
        if let Some(evicted) = self.ring.add(item.clone()) {
            self.set.del(&evicted);
        }
        self.set.add(item);
        true
    }

    /// Replace the value in a written slot.
    ///
    /// `Ok(false)` when `item` is already stored (in any slot): the ring is
    /// left untouched so no value is held twice.
    pub fn set_item(&mut self, index: usize, item: T) -> Result<bool> {
        if self.set.contains(&item) {
            if index >= self.ring.capacity() {
                return Err(DataStructError::IndexOutOfRange {
                    index,
                    len: self.ring.capacity(),
                });
            }
            return Ok(false);
        }
        let old = self.ring.set_item(index, item.clone())?;
        self.set.del(&old);
        self.set.add(item);
        Ok(true)
    }

    /// O(1) membership.
    pub fn contains(&self, item: &T) -> bool {
        self.set.contains(item)
    }

    /// Whether every item of `items` is stored.
    pub fn contains_all<'a, I>(&self, items: I) -> bool
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.set.contains_all(items)
    }

    /// Physical slot access, as [`RingSlice::get_item`].
    pub fn get_item(&self, index: usize) -> Option<&T> {
        self.ring.get_item(index)
    }

    /// Number of values stored.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Values oldest → newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.ring.iter()
    }

    /// Values oldest → newest.
    pub fn to_vec(&self) -> Vec<T> {
        self.ring.to_vec()
    }

    /// Independent copy of the underlying ring.
    pub fn ring_slice(&self) -> RingSlice<T> {
        self.ring.clone()
    }

    /// Independent copy of the membership set.
    pub fn set(&self) -> Set<T> {
        self.set.clone()
    }
}

impl<T: fmt::Debug> fmt::Debug for RingSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.ring, f)
    }
}

impl<T: Serialize> Serialize for RingSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.ring.serialize(serializer)
    }
}

impl<'de, T: Eq + Hash + Clone + Deserialize<'de>> Deserialize<'de> for RingSet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(RingSet::from_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_ring_slice_wraps() {
        let mut r = RingSlice::new(10);
        for i in 0..11 {
            r.add(i);
        }
        assert_eq!(r.get_item(0), Some(&10));
        assert_eq!(r.get_item(r.capacity() - 1), Some(&9));
        assert_eq!(r.to_vec(), (1..=10).collect::<Vec<_>>());
        assert!(r.is_full());
        assert_eq!(r.len(), 10);
    }

    #[test]
    fn test_ring_slice_partial_export() {
        let mut r = RingSlice::new(5);
        r.add('a');
        r.add('b');
        assert!(!r.is_full());
        assert_eq!(r.len(), 2);
        assert_eq!(r.to_vec(), vec!['a', 'b']);
        assert_eq!(r.get_item(3), None);
    }

    #[test]
    fn test_ring_slice_last_n_items() {
        for capacity in 1..8 {
            for inserted in capacity..3 * capacity {
                let mut r = RingSlice::new(capacity);
                for i in 0..inserted {
                    r.add(i);
                }
                let expected: Vec<usize> = (inserted - capacity..inserted).collect();
                assert_eq!(r.to_vec(), expected, "capacity {capacity}, inserted {inserted}");
            }
        }
    }

    #[test]
    fn test_ring_slice_eviction_returns_oldest() {
        let mut r = RingSlice::new(2);
        assert_eq!(r.add(1), None);
        assert_eq!(r.add(2), None);
        assert_eq!(r.add(3), Some(1));
        assert_eq!(r.add(4), Some(2));
    }

    #[test]
    fn test_ring_slice_zero_capacity() {
        let mut r = RingSlice::new(0);
        for i in 0..100 {
            assert_eq!(r.add(i), None);
        }
        assert!(r.is_empty());
        assert_eq!(serde_json::to_string(&r).unwrap(), "[]");
    }

    #[test]
    fn test_ring_slice_capacity_one() {
        let mut r = RingSlice::new(1);
        for i in 0..100 {
            r.add(i);
        }
        assert_eq!(r.to_vec(), vec![99]);
        let json = serde_json::to_string(&r).unwrap();
        let back: RingSlice<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_vec(), vec![99]);
    }

    #[test]
    fn test_ring_slice_set_item() {
        let mut r = RingSlice::new(3);
        r.add(1);
        assert_eq!(r.set_item(0, 7), Ok(1));
        assert_eq!(r.set_item(1, 7), Err(DataStructError::EmptySlot(1)));
        assert_eq!(
            r.set_item(3, 7),
            Err(DataStructError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_ring_slice_json_reorders() {
        let mut r = RingSlice::new(10);
        for i in 0..11 {
            r.add(i);
        }
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, "[1,2,3,4,5,6,7,8,9,10]");

        // Integers come back as floats when read as floats.
        let back: RingSlice<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get_item(0), Some(&1.0));
        assert_eq!(back.get_item(back.capacity() - 1), Some(&10.0));
        assert_eq!(back.cursor(), 0);
        assert_eq!(serde_json::to_string(&back).unwrap(), "[1.0,2.0,3.0,4.0,5.0,6.0,7.0,8.0,9.0,10.0]");
    }

    #[test]
    fn test_ring_slice_deserialized_evicts_oldest() {
        let mut r: RingSlice<u8> = serde_json::from_str("[1,2,3]").unwrap();
        assert_eq!(r.add(4), Some(1));
        assert_eq!(r.to_vec(), vec![2, 3, 4]);
    }

    #[test]
    fn test_ring_slice_copy_is_independent() {
        let mut r = RingSlice::new(4);
        r.add(1);
        let mut copy = r.clone();
        copy.add(2);
        copy.set_item(0, 9).unwrap();
        assert_eq!(r.to_vec(), vec![1]);
        assert_eq!(copy.to_vec(), vec![9, 2]);
    }

    #[test]
    fn test_ring_set_keeps_last_distinct() {
        let mut r = RingSet::new(10);
        for i in 0..100 {
            assert!(!r.contains(&i));
            r.add(i);
            assert!(r.contains(&i));
        }

        // Mutating copies must not touch the original.
        let mut rs = r.ring_slice();
        let mut set = r.set();
        for i in 0..10 {
            rs.add(i);
            set.add(i);
        }

        for i in 0..100 {
            assert_eq!(r.contains(&i), i >= 90, "value {i}");
        }
        assert!(!r.contains(&50));
        assert!(r.contains(&95));
        assert_eq!(r.set.len(), r.ring.len());
        assert_eq!(r.len(), 10);
        assert_eq!(r.to_vec(), (90..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_ring_set_skips_duplicates() {
        let mut r = RingSet::new(3);
        assert!(r.add("a"));
        assert!(r.add("b"));
        assert!(!r.add("a"));
        assert!(r.add("c"));
        assert!(r.add("d"));
        assert_eq!(r.to_vec(), vec!["b", "c", "d"]);
        assert!(!r.contains(&"a"));
    }

    #[test]
    fn test_ring_set_json() {
        let mut r = RingSet::new(10);
        for i in 0..100 {
            r.add(i);
        }
        let json = serde_json::to_string(&r).unwrap();
        let back: RingSet<i64> = serde_json::from_str(&json).unwrap();
        for i in 0..100 {
            assert_eq!(back.contains(&i), i >= 90);
        }
        assert_eq!(back.set.len(), back.ring.len());

        let dup: RingSet<i64> = serde_json::from_str("[1,2,2,3]").unwrap();
        assert_eq!(dup.to_vec(), vec![1, 2, 3]);
        assert_eq!(dup.set.len(), dup.ring.len());
    }

    #[test]
    fn test_ring_set_nested_json() {
        #[derive(serde::Serialize)]
        struct Holder {
            r: RingSet<u32>,
        }
        let h = Holder { r: RingSet::new(10) };
        assert_eq!(serde_json::to_string(&h).unwrap(), r#"{"r":[]}"#);
    }

    #[test]
    fn test_ring_set_get_set_item() {
        let mut rng = rand::thread_rng();
        let mut r = RingSet::new(100);
        for i in 0..100u64 {
            r.add(i);
        }
        for i in 0..100 {
            let v: u64 = rng.gen_range(1_000..u64::MAX);
            if r.set_item(i, v).unwrap() {
                assert_eq!(r.get_item(i), Some(&v));
            }
        }
        let slots: Vec<u64> = r.ring.slots().map(|s| *s.unwrap()).collect();
        for (i, v) in slots.iter().enumerate() {
            assert_eq!(r.get_item(i), Some(v));
            assert!(r.contains(v));
        }
        assert_eq!(r.set.len(), 100);
    }

    #[test]
    fn test_ring_set_set_item_refuses_duplicate() {
        let mut r = RingSet::new(3);
        r.add(1);
        r.add(2);
        assert_eq!(r.set_item(0, 2), Ok(false));
        assert_eq!(r.set_item(0, 5), Ok(true));
        assert!(!r.contains(&1));
        assert!(r.contains(&5));
        assert_eq!(r.to_vec(), vec![5, 2]);
    }

    #[test]
    fn test_ring_set_copy() {
        let mut r = RingSet::new(5);
        for i in 0..5 {
            r.add(i);
        }
        let mut copy = r.clone();
        copy.add(42);
        for i in 0..5 {
            assert_eq!(r.get_item(i), Some(&i));
        }
        assert!(!r.contains(&42));
        assert!(copy.contains(&42));
        assert!(!copy.contains(&0));
    }
}
