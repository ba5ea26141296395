//! Procedural terrain: noise, biome classification, height field, blue-noise
//! vegetation placement and ground tile layout.

mod generator;
mod height_field;
mod noise_field;
mod placement;
mod seed;
mod tiles;

pub mod biome;

pub use biome::{
    BiomeClassifier, BiomeId, BiomeKind, BiomeRecord, BiomeRegistry, BiomeRegistryError,
    ClimateSample,
};
pub use generator::{ChunkContent, TerrainGenerator};
pub use height_field::{HeightField, SLOPE_STEP};
pub use noise_field::{NoiseField, NoiseParams};
pub use placement::{PlacementPoint, PlacementStats, Rect, VegetationPlanner, poisson_disc};
pub use seed::{category_rng, derive_chunk_seed, ground_cover_rng};
pub use tiles::{GroundTile, TileCatalog, TileLayout};
