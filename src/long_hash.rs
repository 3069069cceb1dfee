//! The element contract: a caller-supplied 64-bit hash.
//!
//! `LongHash` plays the role `Hash` plays for std collections, except the
//! element computes its final `u64` itself and the set never mixes it.
//! Uniform distribution is the element's responsibility.
//!
//! Contract: `a == b` implies `a.long_hash() == b.long_hash()`. When `T:
//! Borrow<Q>`, `Q::long_hash` must agree with `T::long_hash` for equal
//! values, exactly as `Borrow` requires for `Hash`.

use std::rc::Rc;
use std::sync::Arc;

/// A value that produces its own 64-bit hash code.
pub trait LongHash {
    /// Returns the 64-bit hash of `self`.
    fn long_hash(&self) -> u64;
}

macro_rules! widen_long_hash {
    ($($t:ty),* $(,)?) => {
        $(
            impl LongHash for $t {
                #[inline]
                fn long_hash(&self) -> u64 {
                    *self as u64
                }
            }
        )*
    };
}

widen_long_hash!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl LongHash for u128 {
    #[inline]
    fn long_hash(&self) -> u64 {
        (*self as u64) ^ ((*self >> 64) as u64)
    }
}

impl LongHash for i128 {
    #[inline]
    fn long_hash(&self) -> u64 {
        (*self as u128).long_hash()
    }
}

impl LongHash for bool {
    #[inline]
    fn long_hash(&self) -> u64 {
        u64::from(*self)
    }
}

impl LongHash for char {
    #[inline]
    fn long_hash(&self) -> u64 {
        u64::from(u32::from(*self))
    }
}

const FNV_OFFSET_BASIS: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// FNV-1a over the UTF-8 bytes. `String` forwards here so that
/// `LongHashSet<String>` can be probed with `&str`.
impl LongHash for str {
    fn long_hash(&self) -> u64 {
        self.as_bytes().iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
        })
    }
}

impl LongHash for String {
    #[inline]
    fn long_hash(&self) -> u64 {
        self.as_str().long_hash()
    }
}

impl<T: LongHash + ?Sized> LongHash for &T {
    #[inline]
    fn long_hash(&self) -> u64 {
        (**self).long_hash()
    }
}

impl<T: LongHash + ?Sized> LongHash for &mut T {
    #[inline]
    fn long_hash(&self) -> u64 {
        (**self).long_hash()
    }
}

impl<T: LongHash + ?Sized> LongHash for Box<T> {
    #[inline]
    fn long_hash(&self) -> u64 {
        (**self).long_hash()
    }
}

impl<T: LongHash + ?Sized> LongHash for Rc<T> {
    #[inline]
    fn long_hash(&self) -> u64 {
        (**self).long_hash()
    }
}

impl<T: LongHash + ?Sized> LongHash for Arc<T> {
    #[inline]
    fn long_hash(&self) -> u64 {
        (**self).long_hash()
    }
}
