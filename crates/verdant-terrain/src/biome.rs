//! Biome system: registry of biome records and noise-driven classification.
//!
//! Assigns biomes to world XZ points from independent temperature and moisture
//! noise channels plus a coarse elevation estimate, using a fixed-precedence
//! decision table.

mod classifier;
mod record;
mod registry;

pub use classifier::{BiomeClassifier, BiomeKind, ClimateSample};
pub use record::BiomeRecord;
pub use registry::{BiomeId, BiomeRegistry, BiomeRegistryError};
