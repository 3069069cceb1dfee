//! WeakValueHashMap: a map whose values are held through `Weak` references.
//!
//! Values stay owned by their `Rc`s elsewhere; the map never keeps one
//! alive. An entry whose value has been dropped is "expired": lookups treat
//! it as absent, and it is physically removed by `purge_expired`, which
//! `insert` also runs once the map has doubled since the last purge.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;
use hashbrown::HashMap;
use std::rc::{Rc, Weak};

/// Smallest entry count at which `insert` considers purging.
const MIN_PURGE_MARK: usize = 16;

pub struct WeakValueHashMap<K, V, S = DefaultHashBuilder> {
    map: HashMap<K, Weak<V>, S>,
    purge_mark: usize,
}

impl<K, V> WeakValueHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V> Default for WeakValueHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> WeakValueHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            map: HashMap::with_hasher(hasher),
            purge_mark: MIN_PURGE_MARK,
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, hasher),
            purge_mark: MIN_PURGE_MARK.max(capacity),
        }
    }

    /// Stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maps `key` to a weak reference to `value`.
    ///
    /// Returns the previous value for `key` if it was still alive.
    pub fn insert(&mut self, key: K, value: &Rc<V>) -> Option<Rc<V>> {
        if self.map.len() >= self.purge_mark {
            self.purge_expired();
        }
        self.map
            .insert(key, Rc::downgrade(value))
            .and_then(|old| old.upgrade())
    }

    /// Returns a strong reference to the value for `q`, if it is alive.
    pub fn get<Q>(&self, q: &Q) -> Option<Rc<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get(q)?.upgrade()
    }

    /// `true` only if `q` maps to a value that is still alive.
    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get(q).is_some_and(|w| w.strong_count() > 0)
    }

    /// Removes the entry for `q`, returning its value if it was alive.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<Rc<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.remove(q)?.upgrade()
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.purge_mark = MIN_PURGE_MARK;
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let before = self.map.len();
        self.map.retain(|_, w| w.strong_count() > 0);
        let removed = before - self.map.len();
        self.purge_mark = MIN_PURGE_MARK.max(self.map.len().saturating_mul(2));
        if removed > 0 {
            tracing::debug!(
                removed,
                remaining = self.map.len(),
                "purged expired weak values"
            );
        }
        removed
    }

    /// Keys of every stored entry, expired or not.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.map.keys()
    }

    /// Snapshot of the live values.
    pub fn values(&self) -> Vec<Rc<V>> {
        self.map.values().filter_map(Weak::upgrade).collect()
    }

    /// Live entries as `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&K, Rc<V>)> + '_ {
        self.map
            .iter()
            .filter_map(|(k, w)| w.upgrade().map(|v| (k, v)))
    }
}
