#![cfg(test)]

// Property tests for LongHashSet kept inside the crate so they can check
// chain structure through the test-only accessors.

use crate::long_hash::LongHash;
use crate::long_hash_set::LongHashSet;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

// Key whose hash is the FNV hash of its name reduced modulo `spread`.
// Small spreads force long collision chains; equality still looks at the
// whole name, so colliding keys stay distinct.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key {
    name: String,
    spread: u64,
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

impl LongHash for Key {
    fn long_hash(&self) -> u64 {
        self.name.long_hash() % self.spread
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize),
    Remove(usize),
    Take(usize),
    Contains(usize),
    Find(usize),
    MergeFrom(Vec<usize>),
    RemoveAll(Vec<usize>),
    Clear,
    Snapshot,
}

fn key_from(pool: &[String], i: usize, spread: u64) -> Key {
    Key {
        name: pool[i].clone(),
        spread,
    }
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => idx.clone().prop_map(Op::Insert),
            2 => idx.clone().prop_map(Op::Remove),
            1 => idx.clone().prop_map(Op::Take),
            2 => idx.clone().prop_map(Op::Contains),
            1 => idx.clone().prop_map(Op::Find),
            1 => proptest::collection::vec(idx.clone(), 0..6).prop_map(Op::MergeFrom),
            1 => proptest::collection::vec(idx.clone(), 0..6).prop_map(Op::RemoveAll),
            1 => Just(Op::Clear),
            1 => Just(Op::Snapshot),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn arb_config() -> impl Strategy<Value = (usize, f32, u64)> {
    (
        0usize..8,
        proptest::sample::select(vec![0.1f32, 0.5, 0.75, 1.0, 3.0]),
        proptest::sample::select(vec![1u64, 3, 64, u64::MAX]),
    )
}

// Property: state-machine equivalence against std::collections::HashSet.
// Invariants exercised across random operation sequences and configs:
// - `insert` returns true iff the key was absent; duplicates leave len alone.
// - `remove`/`take` succeed iff present and detach exactly one entry.
// - `contains`/`find` parity with the model; `find` returns the stored key.
// - `merge_from`/`remove_all` report change iff the model changed.
// - `to_vec` is exactly the model's contents, one copy each.
// - Growth never skips: capacity only increases, and after every op each
//   entry sits in the bucket its hash maps to under the current capacity,
//   with len <= threshold.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(
        (pool, ops) in arb_scenario(),
        (capacity, load_factor, spread) in arb_config(),
    ) {
        let mut sut: LongHashSet<Key> =
            LongHashSet::with_capacity_and_load_factor(capacity, load_factor).unwrap();
        let mut model: HashSet<Key> = HashSet::new();
        let mut last_capacity = sut.capacity();

        for op in ops {
            match op {
                Op::Insert(i) => {
                    let k = key_from(&pool, i, spread);
                    let fresh = !model.contains(&k);
                    prop_assert_eq!(sut.insert(k.clone()), fresh, "insert result");
                    model.insert(k);
                }
                Op::Remove(i) => {
                    let k = key_from(&pool, i, spread);
                    prop_assert_eq!(sut.remove(&k), model.remove(&k));
                    prop_assert!(!sut.contains(&k));
                }
                Op::Take(i) => {
                    let k = key_from(&pool, i, spread);
                    prop_assert_eq!(sut.take(&k), model.take(&k));
                }
                Op::Contains(i) => {
                    let k = key_from(&pool, i, spread);
                    prop_assert_eq!(sut.contains(&k), model.contains(&k));
                }
                Op::Find(i) => {
                    let k = key_from(&pool, i, spread);
                    prop_assert_eq!(sut.find(&k), model.get(&k));
                }
                Op::MergeFrom(is) => {
                    let keys: Vec<Key> = is.iter().map(|&i| key_from(&pool, i, spread)).collect();
                    let before = model.len();
                    model.extend(keys.iter().cloned());
                    prop_assert_eq!(sut.merge_from(keys), model.len() != before);
                }
                Op::RemoveAll(is) => {
                    let keys: Vec<Key> = is.iter().map(|&i| key_from(&pool, i, spread)).collect();
                    let before = model.len();
                    for k in &keys {
                        model.remove(k);
                    }
                    prop_assert_eq!(sut.remove_all(&keys), model.len() != before);
                }
                Op::Clear => {
                    let capacity = sut.capacity();
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), capacity);
                }
                Op::Snapshot => {
                    let snapshot = sut.to_vec();
                    prop_assert_eq!(snapshot.len(), sut.len());
                    let s_keys: BTreeSet<_> = snapshot.into_iter().collect();
                    let m_keys: BTreeSet<_> = model.iter().cloned().collect();
                    prop_assert_eq!(s_keys, m_keys);
                }
            }

            // Post-conditions after each op
            sut.assert_consistent();
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert!(sut.capacity() >= last_capacity);
            last_capacity = sut.capacity();
        }

        for k in &model {
            prop_assert!(sut.contains(k));
        }
    }
}

// Property: set equality and hashing are independent of insertion order
// and of bucket layout.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_equality_ignores_layout(
        values in proptest::collection::vec(any::<u64>(), 0..64),
        capacity in 0usize..16,
    ) {
        let forward: LongHashSet<u64> = values.iter().copied().collect();
        let mut backward: LongHashSet<u64> =
            LongHashSet::with_capacity_and_load_factor(capacity, 2.0).unwrap();
        backward.merge_from(values.iter().rev().copied());

        prop_assert!(forward == backward);
        prop_assert_eq!(forward.long_hash(), backward.long_hash());

        if let Some(first) = values.first() {
            backward.remove(first);
            prop_assert!(forward != backward);
        }
    }
}
