//! Map keyed by a stable string digest.
//!
//! Keys only need to produce a digest ([`Hashable`]); two keys with the same
//! digest address the same entry.  The digest must be pure and collision
//! free over the keys a caller actually uses: colliding keys silently merge.

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::FxHashMap;

use crate::{DataStructError, Result};

/// Capability of producing a stable string digest.
pub trait Hashable {
    fn digest(&self) -> String;
}

impl Hashable for String {
    fn digest(&self) -> String {
        self.clone()
    }
}

impl Hashable for &str {
    fn digest(&self) -> String {
        (*self).to_owned()
    }
}

macro_rules! impl_hashable_display {
    ($($t:ty),* $(,)?) => {
        $(
            impl Hashable for $t {
                fn digest(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_hashable_display!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, char, bool);

// ───────────────────────────────────────────────────────────────────
// HashMap
// ───────────────────────────────────────────────────────────────────

/// Unsynchronised digest-keyed map.  Enumeration order is unspecified.
#[derive(Clone)]
pub struct HashMap<K, V> {
    /// digest → (original key, value)
    entries: FxHashMap<String, (K, V)>,
}

impl<K, V> Default for HashMap<K, V> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<K: Hashable, V> HashMap<K, V> {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert by digest.  Returns the previous value, if any.
    ///
    /// The stored key is replaced too, so `keys()` reflects the latest key
    /// object for a digest.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.entries
            .insert(key.digest(), (key, value))
            .map(|(_, old)| old)
    }

    /// Value stored under `key`'s digest.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(&key.digest()).map(|(_, v)| v)
    }

    /// Mutable access to the value under `key`'s digest.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(&key.digest()).map(|(_, v)| v)
    }

    /// Like [`get`](Self::get), but absence is an error carrying the digest.
    pub fn try_get(&self, key: &K) -> Result<&V> {
        let digest = key.digest();
        match self.entries.get(&digest) {
            Some((_, v)) => Ok(v),
            None => Err(DataStructError::KeyNotFound(digest)),
        }
    }

    /// Whether a value is stored under `key`'s digest.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(&key.digest())
    }

    /// Remove by digest, returning the value that was stored.
    pub fn del(&mut self, key: &K) -> Option<V> {
        self.entries.remove(&key.digest()).map(|(_, v)| v)
    }

    /// Number of distinct digests stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Latest key object stored for each digest, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.values().map(|(k, _)| k)
    }

    /// Stored values, in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.values().map(|(_, v)| v)
    }

    /// `(key, value)` pairs, in no particular order.
    pub fn items(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries.values().map(|(k, v)| (k, v))
    }
}

impl<K: Hashable, V> FromIterator<(K, V)> for HashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HashMap::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for HashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.values().map(|(k, v)| (k, v)))
            .finish()
    }
}

// ───────────────────────────────────────────────────────────────────
// SyncedHashMap
// ───────────────────────────────────────────────────────────────────

/// [`HashMap`] behind one reader/writer lock.
///
/// Enumerations hold the read lock until the returned iterator is dropped,
/// so they observe one consistent state and writers wait for them.
pub struct SyncedHashMap<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for SyncedHashMap<K, V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::default()),
        }
    }
}

impl<K, V> From<HashMap<K, V>> for SyncedHashMap<K, V> {
    fn from(map: HashMap<K, V>) -> Self {
        Self {
            inner: RwLock::new(map),
        }
    }
}

impl<K: Hashable, V> SyncedHashMap<K, V> {
    /// Empty map behind a fresh lock.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Upsert under the write lock.  Returns the previous value, if any.
    pub fn set(&self, key: K, value: V) -> Option<V> {
        self.write().set(key, value)
    }

    /// Clone of the value under `key`'s digest.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.read().get(key).cloned()
    }

    /// Like [`get`](Self::get), but absence is [`DataStructError::KeyNotFound`].
    pub fn try_get(&self, key: &K) -> Result<V>
    where
        V: Clone,
    {
        self.read().try_get(key).cloned()
    }

    /// Whether a value is stored under `key`'s digest.
    pub fn contains(&self, key: &K) -> bool {
        self.read().contains(key)
    }

    /// Remove under the write lock, returning the value that was stored.
    pub fn del(&self, key: &K) -> Option<V> {
        self.write().del(key)
    }

    /// Number of distinct digests stored.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Lazy `(key, value)` clones; the read lock is held until the iterator is dropped.
    ///
    /// Mutating the same map from the thread holding the iterator deadlocks.
    pub fn items(&self) -> Items<'_, K, V>
    where
        K: Clone,
        V: Clone,
    {
        let guard = self.read();
        let digests: Vec<String> = guard.entries.keys().cloned().collect();
        Items {
            guard,
            digests: digests.into_iter(),
        }
    }

    /// Key clones; holds the read lock like [`items`](Self::items).
    pub fn keys(&self) -> impl Iterator<Item = K> + '_
    where
        K: Clone,
        V: Clone,
    {
        self.items().map(|(k, _)| k)
    }

    /// Value clones; holds the read lock like [`items`](Self::items).
    pub fn values(&self) -> impl Iterator<Item = V> + '_
    where
        K: Clone,
        V: Clone,
    {
        self.items().map(|(_, v)| v)
    }

    /// Borrowed enumeration under the read lock for the duration of `f`.
    pub fn with_items<R>(&self, f: impl FnOnce(&mut dyn Iterator<Item = (&K, &V)>) -> R) -> R {
        let guard = self.read();
        let mut iter = guard.items();
        f(&mut iter)
    }

    /// Unwrap the map, recovering it from a poisoned lock.
    pub fn into_inner(self) -> HashMap<K, V> {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SyncedHashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        fmt::Debug::fmt(&*guard, f)
    }
}

/// Iterator over a [`SyncedHashMap`] that keeps its read lock alive.
pub struct Items<'a, K, V> {
    guard: RwLockReadGuard<'a, HashMap<K, V>>,
    digests: std::vec::IntoIter<String>,
}

impl<K: Clone, V: Clone> Iterator for Items<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        // The guard pins the map, so every collected digest is still present.
        let digest = self.digests.next()?;
        self.guard
            .entries
            .get(&digest)
            .map(|(k, v)| (k.clone(), v.clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.digests.size_hint()
    }
}
