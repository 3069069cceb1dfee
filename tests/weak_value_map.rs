// WeakValueHashMap integration tests.
//
// Invariants exercised:
// - Liveness: a key resolves iff its value still has a strong owner.
// - Non-ownership: the map never raises a value's strong count.
// - Expiry: expired entries disappear from lookups immediately and from
//   storage on purge.
use long_hash_set::{LongHashSet, WeakValueHashMap};
use std::rc::Rc;

// Test: values stay alive only through outside owners.
// Verifies: contains/get follow the outside Rc; len drops only on purge.
#[test]
fn liveness_follows_outside_owner() {
    let mut m: WeakValueHashMap<String, Vec<u8>> = WeakValueHashMap::new();
    let owner = Rc::new(vec![1, 2, 3]);
    m.insert("buf".to_string(), &owner);
    assert_eq!(Rc::strong_count(&owner), 1);

    let seen = m.get("buf").expect("alive");
    assert_eq!(*seen, vec![1, 2, 3]);
    drop(seen);

    drop(owner);
    assert!(!m.contains_key("buf"));
    assert!(m.get("buf").is_none());
    assert_eq!(m.len(), 1);
    assert_eq!(m.purge_expired(), 1);
    assert_eq!(m.len(), 0);
}

// Test: iteration only reports live entries.
#[test]
fn iter_and_values_skip_expired() {
    let mut m: WeakValueHashMap<u32, u32> = WeakValueHashMap::new();
    let keep: Vec<Rc<u32>> = (0..5).map(Rc::new).collect();
    for v in &keep {
        m.insert(**v, v);
    }
    {
        let gone = Rc::new(99);
        m.insert(99, &gone);
    }
    assert_eq!(m.len(), 6);
    assert_eq!(m.keys().count(), 6);
    assert_eq!(m.iter().count(), 5);
    let mut values: Vec<u32> = m.values().iter().map(|v| **v).collect();
    values.sort_unstable();
    assert_eq!(values, vec![0, 1, 2, 3, 4]);
}

// Test: canonical-instance cache.
// Assumes: callers canonicalize through a LongHashSet of owners and look
// up by id through the weak map.
// Verifies: removing the owner from the set releases the cached value.
#[test]
fn cache_backed_by_long_hash_set() {
    let mut owners: LongHashSet<Rc<u64>> = LongHashSet::new();
    let mut by_id: WeakValueHashMap<u64, u64> = WeakValueHashMap::new();

    for id in 0..10u64 {
        let v = Rc::new(id);
        by_id.insert(id, &v);
        owners.insert(v);
    }
    assert!((0..10).all(|id| by_id.contains_key(&id)));

    assert!(owners.remove(&Rc::new(3)));
    assert!(!by_id.contains_key(&3));
    assert!(by_id.contains_key(&4));
}
