//! RNG oracle for deterministic random number generation.
//!
//! Natural spawning is the only randomized part of the scheduler. All
//! randomness flows through [`RngOracle`], so a fixed seed replays the same
//! spawn sequence.

/// Source of randomness consumed by the population controller.
///
/// Implementations must be deterministic for a given seed.
pub trait RngOracle {
    fn next_u32(&mut self) -> u32;

    /// Uniform value in `0..bound`. Returns 0 when `bound` is 0.
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        // Lemire's multiply-shift reduction.
        ((u64::from(self.next_u32()) * u64::from(bound)) >> 32) as u32
    }

    /// Roll a per-mille value (0-999 inclusive).
    fn roll_permille(&mut self) -> u32 {
        self.below(1000)
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.step();
        rng.state = rng.state.wrapping_add(seed);
        rng.step();
        rng
    }

    #[inline]
    fn step(&mut self) {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.step();
        Self::output(old)
    }
}
