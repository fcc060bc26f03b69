//! Seeded random source.
//!
//! Backs [`EntropyPort`] with a `StdRng` so that a simulator run can be
//! replayed from its seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::EntropyPort;

pub struct SeededEntropy {
    rng: StdRng,
}

impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl EntropyPort for SeededEntropy {
    fn below(&mut self, bound: u16) -> u16 {
        if bound == 0 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }
}
