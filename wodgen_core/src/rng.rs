//! Seeded random source for reproducible plans.
//!
//! Backed by `ChaCha8Rng`, whose output for a given seed is fixed across
//! platforms and crate releases. Every choice and shuffle is driven through
//! `next_f64` so one seed maps to exactly one plan.

use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};

const TWO_POW_32: f64 = 4_294_967_296.0;

/// Deterministic pseudo-random source
#[derive(Clone, Debug)]
pub struct SeededRng {
    rng: ChaCha8Rng,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(u64::from(seed)),
        }
    }

    /// Next value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.rng.next_u32()) / TWO_POW_32
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        let idx = (self.next_f64() * len as f64) as usize;
        idx.min(len - 1)
    }

    /// Pick one element uniformly, `None` for an empty slice
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.index(items.len());
        items.get(idx)
    }

    /// In-place Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}
