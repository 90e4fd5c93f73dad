//! Seed management and shuffling for allocation
//!
//! Each randomized stage draws from its own stream, derived from a master
//! seed by default, so a stage can be varied while the others stay fixed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeds for every randomized allocation stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocationSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Tie-break permutation of quota cells
    pub ties: u64,
    /// Per-role pool shuffles and leftover placement
    pub pools: u64,
}

impl AllocationSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            ties: derive_seed(master, "ties"),
            pools: derive_seed(master, "pools"),
        }
    }

    /// Create a builder for customizing individual seeds
    pub fn builder(master: u64) -> AllocationSeedsBuilder {
        AllocationSeedsBuilder::new(master)
    }

    pub fn ties_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.ties)
    }

    pub fn pools_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.pools)
    }
}

impl Default for AllocationSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Builder for overriding individual seeds while deriving others from master
pub struct AllocationSeedsBuilder {
    seeds: AllocationSeeds,
}

impl AllocationSeedsBuilder {
    pub fn new(master: u64) -> Self {
        Self {
            seeds: AllocationSeeds::from_master(master),
        }
    }

    /// Override the tie-break seed
    pub fn ties(mut self, seed: u64) -> Self {
        self.seeds.ties = seed;
        self
    }

    /// Override the pool shuffle seed
    pub fn pools(mut self, seed: u64) -> Self {
        self.seeds.pools = seed;
        self
    }

    pub fn build(self) -> AllocationSeeds {
        self.seeds
    }
}

/// Derive a sub-seed from a master seed and a stage name.
fn derive_seed(master: u64, stage: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    stage.hash(&mut hasher);
    hasher.finish()
}

/// Uniform in-place permutation (Fisher-Yates).
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

impl std::fmt::Display for AllocationSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AllocationSeeds {{ master: {}, ties: {}, pools: {} }}",
            self.master, self.ties, self.pools,
        )
    }
}
