use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Deterministic byte source: equal seeds yield equal sequences.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn get_random_bytes(&mut self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0; len];
        self.rng.fill_bytes(&mut bytes);
        bytes
    }

    pub fn get_random_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }
}
