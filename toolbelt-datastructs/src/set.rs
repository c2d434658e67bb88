//! Insertion-ordered set.
//!
//! Storage is a hash map from value to insertion sequence number, so
//! membership is O(1) while exports ([`Set::to_vec`], serde) are always in
//! ascending insertion order, independent of hash layout.  Two exports with
//! no mutation in between are identical, which keeps persisted snapshots
//! reproducible.
//!
//! [`SyncedSet`] wraps a [`Set`] in a single `RwLock`: reads share the lock,
//! mutations take it exclusively.

use std::borrow::Borrow;
use std::collections::hash_map::Entry;
use std::fmt;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::FxHashMap;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

// ───────────────────────────────────────────────────────────────────
// Set
// ───────────────────────────────────────────────────────────────────

/// Unordered collection of distinct values with a stable export order.
#[derive(Clone)]
pub struct Set<T> {
    /// value → insertion sequence number
    entries: FxHashMap<T, u64>,
    /// Sequence number handed to the next new value.
    next_seq: u64,
}

impl<T> Default for Set<T> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
            next_seq: 0,
        }
    }
}

impl<T: Eq + Hash> Set<T> {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty set with room for `capacity` values before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            next_seq: 0,
        }
    }

    /// Build a set holding the union of `sets`, in the order given.
    pub fn from_sets<'a, I>(sets: I) -> Self
    where
        I: IntoIterator<Item = &'a Set<T>>,
        T: Clone + 'a,
    {
        let mut out = Self::new();
        for set in sets {
            out.add_all(set.ordered().into_iter().cloned());
        }
        out
    }

    /// Insert `value` if absent.  Re-adding keeps the original sequence.
    ///
    /// Returns `true` if the value was inserted.
    pub fn add(&mut self, value: T) -> bool {
        match self.entries.entry(value) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(self.next_seq);
                self.next_seq += 1;
                true
            }
        }
    }

    /// Insert every value; returns how many were new.
    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, values: I) -> usize {
        values.into_iter().map(|v| self.add(v) as usize).sum()
    }

    /// Remove `value` if present.
    pub fn del<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(value).is_some()
    }

    /// Remove every value; returns how many were present.
    pub fn del_all<'a, I>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        values.into_iter().map(|v| self.del(v) as usize).sum()
    }

    /// O(1) membership.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(value)
    }

    /// True only if *all* values are present (vacuously true when empty).
    pub fn contains_all<'a, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        values.into_iter().all(|v| self.entries.contains_key(v))
    }

    /// New set with the values present in both, in `self`'s order.
    pub fn intersect(&self, other: &Set<T>) -> Set<T>
    where
        T: Clone,
    {
        let mut out = Set::new();
        for value in self.ordered() {
            if other.contains(value) {
                out.add(value.clone());
            }
        }
        out
    }

    /// New set with the values of either: `self`'s order, then `other`'s new values.
    pub fn union(&self, other: &Set<T>) -> Set<T>
    where
        T: Clone,
    {
        Set::from_sets([self, other])
    }

    /// Same cardinality and mutual containment.  Insertion order is ignored.
    pub fn equal(&self, other: &Set<T>) -> bool {
        self.len() == other.len() && self.entries.keys().all(|v| other.contains(v))
    }

    /// Number of values stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lazy iteration in storage (unspecified) order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.keys()
    }

    /// References in ascending insertion order.
    pub fn ordered(&self) -> Vec<&T> {
        let mut refs: Vec<(&T, u64)> = self.entries.iter().map(|(v, seq)| (v, *seq)).collect();
        refs.sort_unstable_by_key(|(_, seq)| *seq);
        refs.into_iter().map(|(v, _)| v).collect()
    }

    /// Values in ascending insertion order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.ordered().into_iter().cloned().collect()
    }

    /// Consume the set, yielding values in ascending insertion order.
    pub fn into_vec(self) -> Vec<T> {
        let mut pairs: Vec<(T, u64)> = self.entries.into_iter().collect();
        pairs.sort_unstable_by_key(|(_, seq)| *seq);
        pairs.into_iter().map(|(v, _)| v).collect()
    }
}

impl<T: Eq + Hash> PartialEq for Set<T> {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl<T: Eq + Hash> Eq for Set<T> {}

impl<T: Eq + Hash> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Set::new();
        set.add_all(iter);
        set
    }
}

impl<T: Eq + Hash> Extend<T> for Set<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<T: Eq + Hash + fmt::Debug> fmt::Debug for Set<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ordered()).finish()
    }
}

impl<T: Eq + Hash + Serialize> Serialize for Set<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.ordered())
    }
}

impl<'de, T: Eq + Hash + Deserialize<'de>> Deserialize<'de> for Set<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<T>::deserialize(deserializer)?;
        Ok(values.into_iter().collect())
    }
}

// ───────────────────────────────────────────────────────────────────
// SyncedSet
// ───────────────────────────────────────────────────────────────────

/// [`Set`] guarded by one reader/writer lock.
///
/// Binary operations ([`intersect`](Self::intersect), [`union`](Self::union),
/// [`equal`](Self::equal)) read-lock both operands, always acquiring the lock
/// at the lower address first so two threads crossing the same pair cannot
/// deadlock against queued writers.
pub struct SyncedSet<T> {
    inner: RwLock<Set<T>>,
}

impl<T> Default for SyncedSet<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Set::default()),
        }
    }
}

impl<T> From<Set<T>> for SyncedSet<T> {
    fn from(set: Set<T>) -> Self {
        Self {
            inner: RwLock::new(set),
        }
    }
}

impl<T: Eq + Hash> SyncedSet<T> {
    /// Empty set behind a fresh lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set holding the union of `sets`; each source is read-locked in turn.
    pub fn from_sets<'a, I>(sets: I) -> Self
    where
        I: IntoIterator<Item = &'a SyncedSet<T>>,
        T: Clone + 'a,
    {
        let mut out = Set::new();
        for set in sets {
            out.add_all(set.read().ordered().into_iter().cloned());
        }
        out.into()
    }

    fn read(&self) -> RwLockReadGuard<'_, Set<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Set<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with both operands read-locked.
    fn with_both<R>(&self, other: &Self, f: impl FnOnce(&Set<T>, &Set<T>) -> R) -> R {
        if std::ptr::eq(self, other) {
            let guard = self.read();
            return f(&guard, &guard);
        }
        if (self as *const Self) < (other as *const Self) {
            let mine = self.read();
            let theirs = other.read();
            f(&mine, &theirs)
        } else {
            let theirs = other.read();
            let mine = self.read();
            f(&mine, &theirs)
        }
    }

    /// [`Set::add`] under the write lock.
    pub fn add(&self, value: T) -> bool {
        self.write().add(value)
    }

    /// [`Set::add_all`] under one write lock.
    pub fn add_all<I: IntoIterator<Item = T>>(&self, values: I) -> usize {
        self.write().add_all(values)
    }

    /// [`Set::del`] under the write lock.
    pub fn del<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.write().del(value)
    }

    /// [`Set::del_all`] under one write lock.
    pub fn del_all<'a, I>(&self, values: I) -> usize
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.write().del_all(values)
    }

    /// O(1) membership under the read lock.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().contains(value)
    }

    /// Whether every value of `values` is stored.
    pub fn contains_all<'a, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.read().contains_all(values)
    }

    /// [`Set::intersect`] with both sets read-locked.
    pub fn intersect(&self, other: &SyncedSet<T>) -> SyncedSet<T>
    where
        T: Clone,
    {
        self.with_both(other, |a, b| a.intersect(b)).into()
    }

    /// [`Set::union`] with both sets read-locked.
    pub fn union(&self, other: &SyncedSet<T>) -> SyncedSet<T>
    where
        T: Clone,
    {
        self.with_both(other, |a, b| a.union(b)).into()
    }

    /// [`Set::equal`] with both sets read-locked.
    pub fn equal(&self, other: &SyncedSet<T>) -> bool {
        self.with_both(other, |a, b| a.equal(b))
    }

    /// Number of values stored.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Values in ascending insertion order, taken under one read lock.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.read().to_vec()
    }

    /// Snapshot-consistent owned iteration in insertion order.
    pub fn items(&self) -> std::vec::IntoIter<T>
    where
        T: Clone,
    {
        self.to_vec().into_iter()
    }

    /// Lazy borrowed iteration with the read lock held for the whole call.
    ///
    /// Calling a mutating method of the same set from inside `f` deadlocks.
    pub fn with_items<R>(&self, f: impl FnOnce(&mut dyn Iterator<Item = &T>) -> R) -> R {
        let guard = self.read();
        let mut iter = guard.ordered().into_iter();
        f(&mut iter)
    }

    /// Deep copy of the current contents.
    pub fn snapshot(&self) -> Set<T>
    where
        T: Clone,
    {
        self.read().clone()
    }

    /// Unwrap the set, recovering it from a poisoned lock.
    pub fn into_inner(self) -> Set<T> {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Eq + Hash + Clone> Clone for SyncedSet<T> {
    fn clone(&self) -> Self {
        self.snapshot().into()
    }
}

impl<T: Eq + Hash + fmt::Debug> fmt::Debug for SyncedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.read(), f)
    }
}

impl<T: Eq + Hash + Serialize> Serialize for SyncedSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.read().serialize(serializer)
    }
}

impl<'de, T: Eq + Hash + Deserialize<'de>> Deserialize<'de> for SyncedSet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Set::deserialize(deserializer).map(SyncedSet::from)
    }
}
