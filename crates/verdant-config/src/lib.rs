//! Configuration system for the Verdant streaming engine.
//!
//! Provides the tunable world, terrain, streaming and instancing parameters,
//! the biome registry records, tile catalog and vegetation rules. Settings
//! persist to disk as RON files, accept CLI overrides via clap, and are
//! validated once at startup.

mod catalog;
mod cli;
mod config;
mod error;
mod validate;

pub use catalog::{
    BiomeEntry, TileCatalogConfig, TileSetEntry, VegetationCategory, VegetationDensity,
    VegetationRule, biome_names,
};
pub use cli::CliArgs;
pub use config::{
    ClassifierThresholds, Config, DebugConfig, InstancingConfig, LodStep, StreamingConfig,
    TerrainConfig, WorldConfig,
};
pub use error::ConfigError;
