//! Deterministic seed derivation.
//!
//! Every chunk gets its own seed from the world seed and its grid coordinate,
//! and every vegetation category gets its own RNG stream from the chunk seed.
//! Generating a chunk therefore never depends on which chunks were generated
//! before it.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use verdant_config::VegetationCategory;

/// Stream tag for the ground-cover RNG, outside the category index range.
const GROUND_COVER_STREAM: u64 = 0x6C0_FE12;

/// SplitMix64 increment.
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 output finalizer. A bijection on u64.
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// One SplitMix64 step from `state`, keyed by `value`.
fn absorb(state: u64, value: u64) -> u64 {
    mix64(state.wrapping_add(GOLDEN_GAMMA) ^ value)
}

/// Derive a u64 seed for a chunk from the world seed and chunk coordinate.
///
/// Fixed arithmetic only, so saved worlds regenerate identically on any
/// toolchain or platform. Both axes are packed into one word before mixing,
/// which makes the map injective per world seed: two chunks never share a
/// seed.
pub fn derive_chunk_seed(world_seed: u64, chunk: (i32, i32)) -> u64 {
    let packed = (u64::from(chunk.0 as u32) << 32) | u64::from(chunk.1 as u32);
    absorb(world_seed, packed)
}

fn stream_seed(chunk_seed: u64, stream: u64) -> u64 {
    absorb(chunk_seed, stream)
}

/// RNG for one vegetation category within a chunk.
pub fn category_rng(chunk_seed: u64, category: VegetationCategory) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(stream_seed(chunk_seed, category.index()))
}

/// RNG for the ground-cover pass of a chunk.
pub fn ground_cover_rng(chunk_seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(stream_seed(chunk_seed, GROUND_COVER_STREAM))
}
