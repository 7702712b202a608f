//! Identity & tiebreak: a per-DAG source of uniform 32-bit integers.
//!
//! These hashes carry no cryptographic weight — §1 Non-goals rule that out
//! explicitly — they exist solely to give GHOSTDAG's selected-parent and
//! mergeset orderings a deterministic tiebreak when blue scores collide.

use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Generates uniform `u32` tiebreak hashes.
///
/// One generator lives per [`crate::Dag`] instance (§6 "Process-wide state:
/// None"); the inner `SmallRng` is behind a [`Mutex`] purely so the generator
/// itself stays `Sync`, matching the contract that `new_hash` "must be fast
/// and thread-safe if multiple DAGs are built concurrently" — not because the
/// core performs any mutation concurrently within one DAG.
pub struct HashGenerator {
    rng: Mutex<SmallRng>,
}

impl HashGenerator {
    /// Seeds from OS entropy.
    pub fn new() -> Self {
        Self { rng: Mutex::new(SmallRng::from_entropy()) }
    }

    /// Seeds deterministically, for reproducible tests and simulator runs.
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: Mutex::new(SmallRng::seed_from_u64(seed)) }
    }

    /// Draws the next independent sample, uniform on `[0, 2^32)`.
    pub fn new_hash(&self) -> u32 {
        self.rng.lock().gen()
    }
}

impl Default for HashGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_calls_usually_differ() {
        let gen = HashGenerator::from_seed(42);
        let samples: Vec<u32> = (0..32).map(|_| gen.new_hash()).collect();
        assert!(samples.iter().collect::<std::collections::HashSet<_>>().len() > 1);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = HashGenerator::from_seed(7);
        let b = HashGenerator::from_seed(7);
        let sa: Vec<u32> = (0..8).map(|_| a.new_hash()).collect();
        let sb: Vec<u32> = (0..8).map(|_| b.new_hash()).collect();
        assert_eq!(sa, sb);
    }
}
