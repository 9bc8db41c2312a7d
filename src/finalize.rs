//! Gallery ordering.
//!
//! The collector's arrival order depends on which worker finished first, so
//! it carries no meaning. Before rendering, the manifest is shuffled once to
//! give each build a fresh arrangement, or a reproducible one when a seed is
//! configured.

use crate::types::Manifest;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// How to permute the photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuffleOrder {
    /// Fresh order from the thread-local RNG.
    Random,
    /// Same seed, same photos, same order, whatever order the workers
    /// finished in.
    Seeded(u64),
}

impl ShuffleOrder {
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or(ShuffleOrder::Random, ShuffleOrder::Seeded)
    }
}

/// Shuffle the manifest's photos in place and hand it back.
pub fn finalize(mut manifest: Manifest, order: ShuffleOrder) -> Manifest {
    match order {
        ShuffleOrder::Random => manifest.photos.shuffle(&mut rand::thread_rng()),
        ShuffleOrder::Seeded(seed) => {
            // Arrival order is nondeterministic; start from a canonical one.
            manifest
                .photos
                .sort_by(|a, b| a.filename().cmp(b.filename()));
            manifest.photos.shuffle(&mut StdRng::seed_from_u64(seed));
        }
    }
    manifest
}
