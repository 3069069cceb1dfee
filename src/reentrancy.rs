//! Debug check against element code reaching back into its own set.
//!
//! `LongHashSet` hands control to element `LongHash` and `Eq` impls while a
//! chain walk is in progress. If one of those calls re-enters the same set,
//! the walk may observe (or cause) a half-relinked chain. Debug builds flag
//! every second concurrent walk with a panic; release builds carry nothing.

use core::cell::Cell;

/// Walk marker embedded in each set. Entry points that call element code
/// open a walk with `let _g = self.reentrancy.enter();`.
///
/// Holding a `Cell` keeps the set `!Sync` while leaving it `Send`.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    walking: Cell<bool>,
    #[cfg(not(debug_assertions))]
    _nosync: core::marker::PhantomData<Cell<()>>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            walking: Cell::new(false),
            #[cfg(not(debug_assertions))]
            _nosync: core::marker::PhantomData,
        }
    }

    /// Marks a chain walk as open until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if self.walking.replace(true) {
                panic!("reentrancy detected: element code re-entered the set");
            }
            return ReentrancyGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return ReentrancyGuard {
                _z: core::marker::PhantomData,
            };
        }
    }
}

/// Closes the walk on drop, including during unwinding.
pub(crate) struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: core::marker::PhantomData<&'a ()>,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.walking.set(false);
    }
}

#[cfg(test)]
mod tests {
    use crate::{LongHash, LongHashSet};
    use std::borrow::Borrow;
    use std::cell::Cell;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    /// Element whose hash peeks at the set it is being looked up in.
    struct Peeker<'a> {
        id: u64,
        set: &'a Cell<*const LongHashSet<Peeker<'a>>>,
    }

    impl PartialEq for Peeker<'_> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }
    impl Eq for Peeker<'_> {}

    impl Borrow<u64> for Peeker<'_> {
        fn borrow(&self) -> &u64 {
            &self.id
        }
    }

    impl LongHash for Peeker<'_> {
        fn long_hash(&self) -> u64 {
            let ptr = self.set.get();
            if !ptr.is_null() {
                unsafe {
                    let _ = (*ptr).contains(&self.id);
                }
            }
            self.id
        }
    }

    #[test]
    fn back_to_back_walks_are_ok() {
        let mut set: LongHashSet<u64> = LongHashSet::new();
        for i in 0..50 {
            set.insert(i);
            assert!(set.find(&i).is_some());
            assert!(set.remove(&i));
        }
        assert!(set.is_empty());
    }

    #[test]
    fn walk_closes_after_element_panic() {
        struct Bomb(u64);
        impl PartialEq for Bomb {
            fn eq(&self, _: &Self) -> bool {
                panic!("boom");
            }
        }
        impl Eq for Bomb {}
        impl LongHash for Bomb {
            fn long_hash(&self) -> u64 {
                self.0
            }
        }

        let mut set = LongHashSet::new();
        set.insert(Bomb(1));
        let res = catch_unwind(AssertUnwindSafe(|| set.contains(&Bomb(1))));
        assert!(res.is_err());
        // A stale open walk would make this panic too.
        assert!(!set.contains(&Bomb(2)));
    }

    #[cfg(debug_assertions)]
    #[test]
    fn hash_reentering_find_panics_in_debug() {
        let slot = Cell::new(core::ptr::null());
        let mut set = LongHashSet::new();
        set.insert(Peeker { id: 1, set: &slot });
        slot.set(&set as *const _);

        let res = catch_unwind(AssertUnwindSafe(|| {
            let _ = set.find(&Peeker { id: 1, set: &slot });
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn hash_reentering_find_is_allowed_in_release() {
        let slot = Cell::new(core::ptr::null());
        let mut set = LongHashSet::new();
        set.insert(Peeker { id: 1, set: &slot });
        slot.set(&set as *const _);
        assert!(set.find(&Peeker { id: 1, set: &slot }).is_some());
    }
}
