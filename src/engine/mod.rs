//! Memoized Collatz sequence-length engine
//!
//! The engine never recurses. To compute the length of `n` it walks forward
//! along the trajectory, pushing every value it has not seen before onto a
//! work list, until it reaches a value that is already cached (at worst the
//! base entry `1`). The work list is then unwound from the most recently
//! visited value back to `n`, each value receiving its successor's length
//! plus one. Auxiliary memory is bounded by the uncached suffix of the
//! trajectory, not by its full depth.

pub mod cache;

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use tracing::trace;

use crate::errors::{AppResult, CollatzError};

pub use cache::{BaseConvention, MemoCache};

/// One application of the Collatz map: `v / 2` if even, `3v + 1` if odd.
pub fn collatz_step(value: &BigUint) -> BigUint {
    if value.bit(0) {
        value * 3u32 + 1u32
    } else {
        value >> 1u32
    }
}

/// Unmemoized length by forward simulation. Expects `start >= 1`.
pub fn naive_length(start: &BigUint, convention: BaseConvention) -> u64 {
    debug_assert!(!start.is_zero());
    let mut current = start.clone();
    let mut length = convention.base_length();
    while !current.is_one() {
        current = collatz_step(&current);
        length += 1;
    }
    length
}

/// Convert a signed integer into a positive unsigned one, rejecting `n <= 0`.
pub fn to_positive(n: &BigInt) -> AppResult<BigUint> {
    n.to_biguint()
        .filter(|value| !value.is_zero())
        .ok_or_else(|| {
            CollatzError::invalid_argument(format!("expected a positive integer, got {n}"))
        })
}

/// Sequence-length engine over a borrowed memo cache.
///
/// The engine holds no state of its own, so it is cheap to construct per
/// query; everything it learns goes into the cache.
pub struct SequenceLengthEngine<'a> {
    cache: &'a mut MemoCache,
}

impl<'a> SequenceLengthEngine<'a> {
    pub fn new(cache: &'a mut MemoCache) -> Self {
        Self { cache }
    }

    /// Length of the trajectory starting at `n`.
    ///
    /// Fails with [`CollatzError::InvalidArgument`] when `n <= 0`.
    pub fn length_of(&mut self, n: &BigInt) -> AppResult<u64> {
        let n = to_positive(n)?;
        self.length_of_positive(&n)
    }

    /// Same as [`length_of`](Self::length_of) for unsigned input; zero is rejected.
    pub fn length_of_positive(&mut self, n: &BigUint) -> AppResult<u64> {
        if n.is_zero() {
            return Err(CollatzError::invalid_argument(
                "expected a positive integer, got 0",
            ));
        }
        if let Some(length) = self.cache.get(n) {
            return Ok(length);
        }

        let mut pending: Vec<BigUint> = Vec::new();
        let mut current = n.clone();
        let mut length = loop {
            if let Some(known) = self.cache.get(&current) {
                break known;
            }
            let next = collatz_step(&current);
            pending.push(current);
            current = next;
        };

        trace!(start = %n, uncached = pending.len(), "resolving trajectory suffix");

        while let Some(value) = pending.pop() {
            length += 1;
            self.cache.insert_if_absent(value, length);
        }

        Ok(length)
    }
}
