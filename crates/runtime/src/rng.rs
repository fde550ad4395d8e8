//! Seeded randomness backed by `rand`.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use turn_core::RngOracle;

/// Deterministic [`RngOracle`] over [`StdRng`].
///
/// Each consumer in a simulation gets its own stream via [`SeededRng::fork`],
/// so adding draws in one place does not shift the sequence seen elsewhere.
#[derive(Clone, Debug)]
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Derives an independent generator from the next value of this one.
    pub fn fork(&mut self) -> Self {
        Self::new(self.inner.next_u64())
    }
}

impl RngOracle for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }
}
