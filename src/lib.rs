//! long-hash-set: a hash set keyed by a 64-bit hash the element computes
//! itself, for realtime code that cannot afford per-operation allocation.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a set with explicit control over hashing, chaining and growth,
//!   whose steady-state operations do not allocate.
//! - Layers:
//!   - `LongHash`: the element contract. Elements hand the set a finished
//!     `u64`; the set does no mixing of its own.
//!   - `LongHashSet<T>`: separate chaining over a bucket array of chain
//!     heads. Chain entries live in a `SlotMap` arena and are linked by
//!     key, so there is one allocation for all entries rather than one per
//!     entry, and freed slots are reused.
//!   - `WeakValueHashMap<K, V, S>`: companion map holding values through
//!     `rc::Weak`, with explicit expiry scanning.
//!
//! Constraints
//! - Single owner: no locking and no atomics. The set is `Send` but not
//!   `Sync`; share it behind an external lock if needed.
//! - Set semantics: duplicate inserts are rejected with `false`, the stored
//!   element is never replaced.
//! - Growth happens before an insert would push the count past the
//!   threshold, never after.
//! - Only construction can fail (`InvalidConfig`). Misses, duplicates and
//!   empty inputs are boolean/optional outcomes.
//!
//! Hashing and indexing
//! - Each entry stores its `u64` hash. Lookups compare the stored hash
//!   first and only call `Eq` on a hash match; rehash uses the stored hash
//!   and never calls back into `LongHash`.
//! - Bucket index is `(hash & 0x7FFF_FFFF_FFFF_FFFF) % capacity`.
//! - Capacity grows `n -> 2n + 1`; threshold is `floor(capacity * load_factor)`.
//!
//! Reentrancy policy
//! - `LongHashSet` calls element code (`LongHash`, `Eq`) while walking a
//!   chain. A debug-only guard at each such entry point panics if element
//!   code re-enters the same set. Release builds compile it away.
//!
//! Notes and non-goals
//! - Iteration order is unspecified and changes on growth.
//! - No shrink: `clear` and `remove` keep the bucket array.
//! - `WeakValueHashMap` never relies on finalization; expired entries are
//!   found by scanning.

mod error;
mod long_hash;
pub mod long_hash_set;
mod long_hash_set_proptest;
mod reentrancy;
pub mod weak_value_map;

// Public surface
pub use error::InvalidConfig;
pub use long_hash::LongHash;
pub use long_hash_set::{LongHashSet, SetConfig};
pub use weak_value_map::WeakValueHashMap;
