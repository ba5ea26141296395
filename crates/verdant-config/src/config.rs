//! Configuration structs with sensible defaults and RON persistence.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{BiomeEntry, TileCatalogConfig, VegetationRule};
use crate::error::ConfigError;

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World seed and grid dimensions.
    pub world: WorldConfig,
    /// Noise and biome classification parameters.
    pub terrain: TerrainConfig,
    /// Chunk streaming parameters.
    pub streaming: StreamingConfig,
    /// Instance pool parameters.
    pub instancing: InstancingConfig,
    /// Biome registry records.
    pub biomes: Vec<BiomeEntry>,
    /// Biome to ground tile mapping.
    pub tiles: TileCatalogConfig,
    /// Vegetation placement rules.
    pub vegetation: Vec<VegetationRule>,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// World seed and grid dimensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for every noise channel and placement RNG.
    pub seed: u64,
    /// Chunk edge length in world units.
    pub chunk_size: f64,
    /// Ground tile edge length in world units.
    pub tile_size: f64,
}

/// Thresholds for the biome decision table. All values are in `[0.0, 1.0]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Coarse elevation above which terrain is mountain.
    pub high_altitude: f64,
    /// Temperature above which (with high moisture) the special biome appears.
    pub special_temperature: f64,
    /// Moisture above which (with high temperature) the special biome appears.
    pub special_moisture: f64,
    /// Temperature separating forest/desert from swamp/plains.
    pub temperature_mid: f64,
    /// Moisture separating forest from desert.
    pub moisture_low: f64,
    /// Temperature separating swamp/plains from tundra.
    pub temperature_low: f64,
    /// Moisture separating swamp from plains.
    pub moisture_mid: f64,
}

/// Noise and biome classification parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Number of fBm octaves.
    pub octaves: u32,
    /// Frequency of the first octave.
    pub base_frequency: f64,
    /// Amplitude of the first octave, in world units.
    pub amplitude: f64,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Frequency of the temperature and moisture channels.
    pub climate_frequency: f64,
    /// Frequency of the coarse elevation estimate used for classification.
    pub elevation_frequency: f64,
    /// Biome decision table thresholds.
    pub thresholds: ClassifierThresholds,
}

/// One row of the LOD table: chunks at ring distance `<= max_distance` get `level`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LodStep {
    /// Inclusive ring distance, in chunks.
    pub max_distance: u32,
    /// LOD level (0 = full detail).
    pub level: u8,
}

/// Chunk streaming parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chunks within this ring distance of the viewpoint are wanted.
    pub view_radius: u32,
    /// Chunks beyond this ring distance are evicted.
    pub unload_radius: u32,
    /// Cap on `Ready` chunks; least recently accessed are evicted first.
    pub max_resident_chunks: usize,
    /// Maximum simultaneous in-flight generations.
    pub max_concurrent: usize,
    /// Chunks finalised per scheduler tick before yielding to the frame loop.
    pub yield_every: usize,
    /// Generation worker threads. 0 runs generation inline on the caller.
    pub worker_threads: usize,
    /// Distance-to-LOD table, ordered by distance.
    pub lod_table: Vec<LodStep>,
}

/// Instance pool parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InstancingConfig {
    /// Capacity for asset types without an explicit entry.
    pub default_capacity: u32,
    /// Per-asset capacity overrides.
    pub capacities: HashMap<String, u32>,
    /// Always use discrete per-object placement, even if instancing is available.
    pub force_cpu_fallback: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Log a summary line every this many frames in the demo (0 disables).
    pub stats_interval: u32,
}

// --- Default implementations ---

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            terrain: TerrainConfig::default(),
            streaming: StreamingConfig::default(),
            instancing: InstancingConfig::default(),
            biomes: BiomeEntry::standard_set(),
            tiles: TileCatalogConfig::default(),
            vegetation: VegetationRule::standard_set(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            chunk_size: 64.0,
            tile_size: 2.0,
        }
    }
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            high_altitude: 0.72,
            special_temperature: 0.68,
            special_moisture: 0.68,
            temperature_mid: 0.55,
            moisture_low: 0.35,
            temperature_low: 0.3,
            moisture_mid: 0.5,
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            octaves: 4,
            base_frequency: 0.01,
            amplitude: 24.0,
            persistence: 0.5,
            lacunarity: 2.0,
            climate_frequency: 0.002,
            elevation_frequency: 0.003,
            thresholds: ClassifierThresholds::default(),
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            view_radius: 2,
            unload_radius: 3,
            max_resident_chunks: 64,
            max_concurrent: 4,
            yield_every: 3,
            worker_threads: 0,
            lod_table: vec![
                LodStep {
                    max_distance: 1,
                    level: 0,
                },
                LodStep {
                    max_distance: 2,
                    level: 1,
                },
                LodStep {
                    max_distance: 4,
                    level: 2,
                },
                LodStep {
                    max_distance: 6,
                    level: 3,
                },
            ],
        }
    }
}

impl Default for InstancingConfig {
    fn default() -> Self {
        let capacities = [
            "tile_stone",
            "tile_moss",
            "tile_grass",
            "tile_sand",
            "tile_mud",
            "tile_snow",
            "tile_dirt",
        ]
        .into_iter()
        .map(|name| (name.to_string(), 32_768))
        .collect();
        Self {
            default_capacity: 8_192,
            capacities,
            force_cpu_fallback: false,
        }
    }
}

impl InstancingConfig {
    /// Capacity for the given asset type.
    pub fn capacity_for(&self, asset: &str) -> u32 {
        self.capacities
            .get(asset)
            .copied()
            .unwrap_or(self.default_capacity)
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval: 60,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
