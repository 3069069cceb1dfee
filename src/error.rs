//! Construction-time validation errors.

use thiserror::Error;

/// Rejected construction parameters for a `LongHashSet`.
///
/// This is the only error the set reports. Absent probes, duplicate
/// inserts and misses are ordinary boolean/optional outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum InvalidConfig {
    /// The load factor was zero, negative or NaN.
    #[error("illegal load factor: {0}")]
    LoadFactor(f32),
    /// A bucket array of this many slots cannot be allocated.
    #[error("illegal capacity: {0}")]
    Capacity(usize),
}
