//! LongHashSet: a chained hash set keyed by the element's own 64-bit hash.
//!
//! Storage is two pieces:
//! - `slots`: a `SlotMap` arena owning every chain entry. Freed slots are
//!   recycled, so steady-state insert/remove churn does not allocate.
//! - `buckets`: one optional chain head per bucket. Chains are singly
//!   linked through `Entry::next`.
//!
//! Rehash replaces `buckets` wholesale and relinks the existing entries in
//! place; no entry is copied or reallocated.

use crate::error::InvalidConfig;
use crate::long_hash::LongHash;
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use slotmap::{DefaultKey, SlotMap};

/// Bucket count used by `LongHashSet::new`.
pub const DEFAULT_CAPACITY: usize = 20;
/// Load factor used by `LongHashSet::new`.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

const HASH_MASK: u64 = 0x7FFF_FFFF_FFFF_FFFF;

/// Construction parameters for a `LongHashSet`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SetConfig {
    /// Initial bucket count. Zero is coerced to one.
    pub initial_capacity: usize,
    /// Fraction of the bucket count that may be filled before growing.
    pub load_factor: f32,
}

impl SetConfig {
    /// Checks that the load factor is strictly positive.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        // Written so that NaN fails too.
        if !(self.load_factor > 0.0) {
            return Err(InvalidConfig::LoadFactor(self.load_factor));
        }
        Ok(())
    }
}

impl Default for SetConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

#[derive(Clone, Debug)]
struct Entry<T> {
    element: T,
    hash: u64,
    next: Option<DefaultKey>,
}

/// Bucket array plus entry arena. Never calls element code except through
/// the `matches` closure handed to `locate`.
#[derive(Clone)]
struct Chains<T> {
    buckets: Vec<Option<DefaultKey>>,
    slots: SlotMap<DefaultKey, Entry<T>>,
    threshold: usize,
    load_factor: f32,
}

#[inline]
fn bucket_index(hash: u64, capacity: usize) -> usize {
    ((hash & HASH_MASK) % capacity as u64) as usize
}

#[inline]
fn threshold_for(capacity: usize, load_factor: f32) -> usize {
    // Single precision, so 10 * 0.7 floors to 7 rather than 6. `as`
    // saturates for huge load factors.
    (capacity as f32 * load_factor) as usize
}

impl<T> Chains<T> {
    #[inline]
    fn index_of(&self, hash: u64) -> usize {
        bucket_index(hash, self.buckets.len())
    }

    /// Walks the chain for `hash` and returns the key of the entry accepted
    /// by `matches`, along with its predecessor in the chain.
    fn locate<F>(&self, hash: u64, mut matches: F) -> Option<(Option<DefaultKey>, DefaultKey)>
    where
        F: FnMut(&T) -> bool,
    {
        let mut prev = None;
        let mut cursor = self.buckets[self.index_of(hash)];
        while let Some(key) = cursor {
            let entry = &self.slots[key];
            if entry.hash == hash && matches(&entry.element) {
                return Some((prev, key));
            }
            prev = cursor;
            cursor = entry.next;
        }
        None
    }

    /// Grows until `len < threshold`, then prepends a new entry to its chain.
    fn push_front(&mut self, hash: u64, element: T) {
        while self.slots.len() >= self.threshold {
            let before = self.buckets.len();
            self.rehash();
            if self.buckets.len() == before {
                break;
            }
        }

        let index = self.index_of(hash);
        let next = self.buckets[index];
        let key = self.slots.insert(Entry {
            element,
            hash,
            next,
        });
        self.buckets[index] = Some(key);
    }

    /// Detaches `key` from its chain and frees its slot.
    fn unlink(&mut self, prev: Option<DefaultKey>, key: DefaultKey) -> Option<T> {
        let entry = self.slots.remove(key)?;
        match prev {
            Some(p) => self.slots[p].next = entry.next,
            None => {
                let index = self.index_of(entry.hash);
                self.buckets[index] = entry.next;
            }
        }
        Some(entry.element)
    }

    /// Grows to `2 * capacity + 1` buckets and relinks every entry.
    fn rehash(&mut self) {
        let old_capacity = self.buckets.len();
        let new_capacity = old_capacity.saturating_mul(2).saturating_add(1);
        let old_buckets = core::mem::replace(&mut self.buckets, vec![None; new_capacity]);
        self.threshold = threshold_for(new_capacity, self.load_factor);

        for head in old_buckets.into_iter().rev() {
            let mut cursor = head;
            while let Some(key) = cursor {
                let entry = &mut self.slots[key];
                cursor = entry.next;
                let index = bucket_index(entry.hash, new_capacity);
                entry.next = self.buckets[index];
                self.buckets[index] = Some(key);
            }
        }

        // Keep the arena ahead of the table so inserts up to the next
        // threshold do not reallocate it.
        let headroom = self.threshold.saturating_sub(self.slots.len());
        if headroom > 0 {
            self.slots.reserve(headroom);
        }

        tracing::debug!(
            old_capacity,
            new_capacity,
            threshold = self.threshold,
            len = self.slots.len(),
            "rehashed long hash set"
        );
    }

    fn clear(&mut self) {
        self.buckets.fill(None);
        self.slots.clear();
    }
}

/// A set of `T` indexed by `T::long_hash`, resolving collisions by chaining.
///
/// Iteration order is bucket-then-chain and otherwise unspecified; it
/// changes whenever the set grows.
pub struct LongHashSet<T> {
    chains: Chains<T>,
    reentrancy: DebugReentrancy,
}

impl<T> LongHashSet<T> {
    /// Creates an empty set with 20 buckets and a 0.75 load factor.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty set with `initial_capacity` buckets and the default
    /// 0.75 load factor. A capacity of zero is coerced to one.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        let capacity = initial_capacity.max(1);
        let threshold = threshold_for(capacity, DEFAULT_LOAD_FACTOR);
        tracing::trace!(capacity, threshold, "created long hash set");
        Self {
            chains: Chains {
                buckets: vec![None; capacity],
                slots: SlotMap::with_key(),
                threshold,
                load_factor: DEFAULT_LOAD_FACTOR,
            },
            reentrancy: DebugReentrancy::new(),
        }
    }

    /// Creates an empty set with the given bucket count and load factor.
    ///
    /// A capacity of zero is coerced to one. Fails if the load factor is not
    /// strictly positive or the bucket array cannot be allocated.
    pub fn with_capacity_and_load_factor(
        initial_capacity: usize,
        load_factor: f32,
    ) -> Result<Self, InvalidConfig> {
        Self::with_config(SetConfig {
            initial_capacity,
            load_factor,
        })
    }

    /// Creates an empty set from a validated `SetConfig`.
    pub fn with_config(config: SetConfig) -> Result<Self, InvalidConfig> {
        config.validate()?;
        let capacity = config.initial_capacity.max(1);

        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(capacity)
            .map_err(|_| InvalidConfig::Capacity(config.initial_capacity))?;
        buckets.resize(capacity, None);

        let threshold = threshold_for(capacity, config.load_factor);
        tracing::trace!(capacity, threshold, "created long hash set");
        Ok(Self {
            chains: Chains {
                buckets,
                slots: SlotMap::with_key(),
                threshold,
                load_factor: config.load_factor,
            },
            reentrancy: DebugReentrancy::new(),
        })
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.chains.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.slots.is_empty()
    }

    /// Current number of buckets.
    pub fn capacity(&self) -> usize {
        self.chains.buckets.len()
    }

    /// Element count at which the next insert of a new element grows the set.
    pub fn threshold(&self) -> usize {
        self.chains.threshold
    }

    pub fn load_factor(&self) -> f32 {
        self.chains.load_factor
    }

    /// Removes every element. Bucket count and threshold are kept.
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter();
        self.chains.clear();
    }

    /// Iterates elements in bucket-then-chain order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            buckets: self.chains.buckets.iter(),
            slots: &self.chains.slots,
            cursor: None,
            remaining: self.chains.slots.len(),
        }
    }

    /// Returns an independently owned snapshot of every element.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T> LongHashSet<T>
where
    T: LongHash + Eq,
{
    /// Returns `true` if an element equal to `probe` is present.
    pub fn contains<Q>(&self, probe: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + LongHash + Eq,
    {
        self.find(probe).is_some()
    }

    /// Returns the stored element equal to `probe`.
    ///
    /// The stored instance is returned, not the probe, so callers can
    /// canonicalize onto it.
    pub fn find<Q>(&self, probe: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + LongHash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = probe.long_hash();
        let (_, key) = self.chains.locate(hash, |e| e.borrow() == probe)?;
        Some(&self.chains.slots[key].element)
    }

    /// Adds `element` unless an equal element is already present.
    ///
    /// Returns `false` and leaves the set untouched on a duplicate; the
    /// stored element is not replaced. New entries go to the head of their
    /// chain.
    pub fn insert(&mut self, element: T) -> bool {
        let _g = self.reentrancy.enter();
        let hash = element.long_hash();
        if self.chains.locate(hash, |e| *e == element).is_some() {
            return false;
        }
        self.chains.push_front(hash, element);
        true
    }

    /// Removes the element equal to `probe`. Returns whether one was found.
    pub fn remove<Q>(&mut self, probe: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + LongHash + Eq,
    {
        self.take(probe).is_some()
    }

    /// Removes and returns the element equal to `probe`.
    pub fn take<Q>(&mut self, probe: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + LongHash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = probe.long_hash();
        let (prev, key) = self.chains.locate(hash, |e| e.borrow() == probe)?;
        self.chains.unlink(prev, key)
    }

    /// Inserts every element of `elements`. Returns whether the set changed.
    pub fn merge_from<I>(&mut self, elements: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        let mut modified = false;
        for element in elements {
            modified |= self.insert(element);
        }
        modified
    }

    /// Inserts a clone of every element of `other`. Returns whether the set
    /// changed.
    pub fn merge_from_set(&mut self, other: &LongHashSet<T>) -> bool
    where
        T: Clone,
    {
        self.merge_from(other.iter().cloned())
    }

    /// Removes every element matching one of `probes`. Returns whether the
    /// set changed; an empty source never touches the table.
    pub fn remove_all<'a, Q, I>(&mut self, probes: I) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + LongHash + Eq + 'a,
        I: IntoIterator<Item = &'a Q>,
    {
        let mut modified = false;
        for probe in probes {
            modified |= self.remove(probe);
        }
        modified
    }
}

impl<T> Default for LongHashSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for LongHashSet<T> {
    fn clone(&self) -> Self {
        // SlotMap clones preserve keys, so the chain links stay valid.
        Self {
            chains: self.chains.clone(),
            reentrancy: DebugReentrancy::new(),
        }
    }
}

impl<T> PartialEq for LongHashSet<T>
where
    T: LongHash + Eq,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|e| other.contains(e))
    }
}

impl<T> Eq for LongHashSet<T> where T: LongHash + Eq {}

/// The set hashes to the wrapping sum of its element hashes, so equal sets
/// hash equally regardless of bucket layout.
impl<T: LongHash> LongHash for LongHashSet<T> {
    fn long_hash(&self) -> u64 {
        self.iter()
            .fold(0u64, |sum, e| sum.wrapping_add(e.long_hash()))
    }
}

impl<T: LongHash> Hash for LongHashSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.long_hash());
    }
}

impl<T: fmt::Debug> fmt::Debug for LongHashSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for LongHashSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, e) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(e, f)?;
        }
        f.write_str("]")
    }
}

impl<T> Extend<T> for LongHashSet<T>
where
    T: LongHash + Eq,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.merge_from(iter);
    }
}

impl<T> FromIterator<T> for LongHashSet<T>
where
    T: LongHash + Eq,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.merge_from(iter);
        set
    }
}

impl<'a, T> IntoIterator for &'a LongHashSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the elements of a `LongHashSet`, bucket by bucket.
pub struct Iter<'a, T> {
    buckets: core::slice::Iter<'a, Option<DefaultKey>>,
    slots: &'a SlotMap<DefaultKey, Entry<T>>,
    cursor: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(key) = self.cursor {
                let entry = &self.slots[key];
                self.cursor = entry.next;
                self.remaining -= 1;
                return Some(&entry.element);
            }
            self.cursor = *self.buckets.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
impl<T: LongHash> LongHashSet<T> {
    /// Number of entries chained off bucket `index`.
    pub(crate) fn chain_len(&self, index: usize) -> usize {
        let mut n = 0;
        let mut cursor = self.chains.buckets[index];
        while let Some(key) = cursor {
            n += 1;
            cursor = self.chains.slots[key].next;
        }
        n
    }

    /// Asserts the structural invariants: every entry sits in the chain its
    /// stored hash maps to under the current capacity, its stored hash
    /// matches the element, chains are acyclic and cover the arena, and the
    /// element count is within the threshold.
    pub(crate) fn assert_consistent(&self) {
        let chains = &self.chains;
        let capacity = chains.buckets.len();
        let mut seen = 0usize;
        for (index, head) in chains.buckets.iter().enumerate() {
            let mut cursor = *head;
            while let Some(key) = cursor {
                let entry = &chains.slots[key];
                assert_eq!(entry.hash, entry.element.long_hash(), "stale stored hash");
                assert_eq!(bucket_index(entry.hash, capacity), index, "entry in wrong bucket");
                seen += 1;
                assert!(seen <= chains.slots.len(), "chain cycle or dangling link");
                cursor = entry.next;
            }
        }
        assert_eq!(seen, chains.slots.len(), "chains do not cover every entry");
        assert!(chains.slots.len() <= chains.threshold, "count above threshold");
    }
}
