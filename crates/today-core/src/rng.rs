#![forbid(unsafe_code)]

//! Small self-contained PRNG and shuffle primitives.
//!
//! The choreography needs a lot of cheap randomness (orderings, delays,
//! polar coordinates) and none of it has to be cryptographic or
//! reproducible across runs. An xorshift64 generator covers that with two
//! words of state.
//!
//! # Invariants
//!
//! 1. The internal state is never zero (xorshift fixed point).
//! 2. [`Rng::below`] is uniform over `[0, n)`: rejection sampling, not a
//!    bare modulo, so shuffles are unbiased.
//! 3. [`Rng::shuffle`] permutes order only; element values are untouched.
//!    Slices of length 0 or 1 are returned unchanged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Distinguishes entropy draws that land in the same clock tick.
static ENTROPY_SALT: AtomicU64 = AtomicU64::new(0);

/// splitmix64 finalizer; spreads a weak seed across all 64 bits.
#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// xorshift64 pseudo-random generator.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a generator from an explicit seed.
    ///
    /// A zero seed is remapped; every seed yields a usable stream.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        let mixed = splitmix64(seed);
        Self {
            state: if mixed == 0 { 0x4D59_5DF4_D0F3_3173 } else { mixed },
        }
    }

    /// Create a generator seeded from the system clock.
    ///
    /// Two draws in the same nanosecond still diverge thanks to a process-wide
    /// salt counter. Runs are intentionally not reproducible.
    #[must_use]
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0xDEAD_BEEF_CAFE_F00D);
        let salt = ENTROPY_SALT.fetch_add(1, Ordering::Relaxed);
        Self::from_seed(nanos ^ salt.rotate_left(32))
    }

    /// Next raw 64-bit value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform value in `[0, n)`.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "below(0) has no valid result");
        // Reject draws past the largest multiple of n to keep the modulo fair.
        let zone = u64::MAX - u64::MAX % n;
        loop {
            let v = self.next_u64();
            if v < zone {
                return v % n;
            }
        }
    }

    /// Uniform integer in `[lo, hi]` inclusive.
    pub fn range_u64(&mut self, lo: u64, hi: u64) -> u64 {
        debug_assert!(lo <= hi, "empty range {lo}..={hi}");
        lo + self.below(hi - lo + 1)
    }

    /// Uniform float in `[0, 1)` with 24 bits of precision.
    #[inline]
    pub fn unit_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform float in `[lo, hi)`.
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.unit_f32() * (hi - lo)
    }

    /// In-place Fisher–Yates shuffle; every permutation equally likely.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.below(i as u64 + 1) as usize;
            slice.swap(i, j);
        }
    }
}
