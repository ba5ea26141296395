//! Biome classifier: temperature, moisture and coarse elevation noise
//! channels fed through a first-match decision table.

use verdant_config::{ClassifierThresholds, TerrainConfig, biome_names};

use super::{BiomeId, BiomeRegistry, BiomeRegistryError};
use crate::noise_field::{NoiseField, NoiseParams};

/// Seed salts keep the three channels decorrelated from each other and from
/// the terrain height channel.
const TEMPERATURE_SALT: u64 = 0xDEAD_BEEF;
const MOISTURE_SALT: u64 = 0x5EED_CAFE;
const ELEVATION_SALT: u64 = 0x0E1E_7A7E;

/// The biomes the decision table can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BiomeKind {
    /// Above the high-altitude threshold.
    Mountain,
    /// Hot and wet.
    Mystical,
    /// Warm and moist.
    Forest,
    /// Warm and dry.
    Desert,
    /// Temperate and wet.
    Swamp,
    /// Temperate and dry.
    Plains,
    /// Everything colder.
    Tundra,
}

impl BiomeKind {
    /// All kinds, in decision-table order.
    pub const ALL: [BiomeKind; 7] = [
        Self::Mountain,
        Self::Mystical,
        Self::Forest,
        Self::Desert,
        Self::Swamp,
        Self::Plains,
        Self::Tundra,
    ];

    /// Registry name of the biome.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mountain => biome_names::MOUNTAIN,
            Self::Mystical => biome_names::MYSTICAL,
            Self::Forest => biome_names::FOREST,
            Self::Desert => biome_names::DESERT,
            Self::Swamp => biome_names::SWAMP,
            Self::Plains => biome_names::PLAINS,
            Self::Tundra => biome_names::TUNDRA,
        }
    }

    /// Apply the decision table. Inputs are normalized to `[0.0, 1.0]`;
    /// the first matching row wins.
    pub fn decide(
        temperature: f64,
        moisture: f64,
        elevation: f64,
        t: &ClassifierThresholds,
    ) -> Self {
        if elevation > t.high_altitude {
            Self::Mountain
        } else if temperature > t.special_temperature && moisture > t.special_moisture {
            Self::Mystical
        } else if temperature > t.temperature_mid {
            if moisture > t.moisture_low {
                Self::Forest
            } else {
                Self::Desert
            }
        } else if temperature > t.temperature_low {
            if moisture > t.moisture_mid {
                Self::Swamp
            } else {
                Self::Plains
            }
        } else {
            Self::Tundra
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Everything the classifier computed for one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimateSample {
    /// The resolved registry ID.
    pub biome: BiomeId,
    /// The decision-table row that matched.
    pub kind: BiomeKind,
    /// Normalized temperature.
    pub temperature: f64,
    /// Normalized moisture.
    pub moisture: f64,
    /// Normalized coarse elevation.
    pub elevation: f64,
}

/// Maps world XZ coordinates to biome IDs.
#[derive(Clone, Debug)]
pub struct BiomeClassifier {
    temperature: NoiseField,
    moisture: NoiseField,
    elevation: NoiseField,
    thresholds: ClassifierThresholds,
    ids: [BiomeId; 7],
}

impl BiomeClassifier {
    /// Create a classifier whose channels derive from `seed`.
    ///
    /// # Errors
    ///
    /// [`BiomeRegistryError::Missing`] if the registry lacks any biome the
    /// decision table can produce.
    pub fn new(
        seed: u64,
        terrain: &TerrainConfig,
        registry: &BiomeRegistry,
    ) -> Result<Self, BiomeRegistryError> {
        let mut ids = [BiomeId(0); 7];
        for kind in BiomeKind::ALL {
            ids[kind.index()] = registry
                .lookup_by_name(kind.name())
                .ok_or_else(|| BiomeRegistryError::Missing(kind.name().to_string()))?;
        }

        let climate = |salt: u64, offset: (f64, f64)| {
            NoiseField::new(NoiseParams {
                seed: seed.wrapping_add(salt),
                octaves: 2,
                base_frequency: terrain.climate_frequency,
                amplitude: 1.0,
                offset,
                ..Default::default()
            })
        };
        let temperature = climate(TEMPERATURE_SALT, (10_000.0, -7_300.0));
        let moisture = climate(MOISTURE_SALT, (-4_100.0, 12_700.0));
        let elevation = NoiseField::new(NoiseParams {
            seed: seed.wrapping_add(ELEVATION_SALT),
            octaves: 3,
            base_frequency: terrain.elevation_frequency,
            amplitude: 1.0,
            ..Default::default()
        });

        Ok(Self {
            temperature,
            moisture,
            elevation,
            thresholds: terrain.thresholds.clone(),
            ids,
        })
    }

    /// Biome at a world coordinate.
    pub fn classify(&self, x: f64, z: f64) -> BiomeId {
        self.sample(x, z).biome
    }

    /// Biome plus the channel values that produced it.
    pub fn sample(&self, x: f64, z: f64) -> ClimateSample {
        let temperature = self.temperature.sample_normalized(x, z);
        let moisture = self.moisture.sample_normalized(x, z);
        let elevation = self.elevation.sample_normalized(x, z);
        let kind = BiomeKind::decide(temperature, moisture, elevation, &self.thresholds);
        ClimateSample {
            biome: self.ids[kind.index()],
            kind,
            temperature,
            moisture,
            elevation,
        }
    }

    /// Registry ID for a decision-table row.
    pub fn id_of(&self, kind: BiomeKind) -> BiomeId {
        self.ids[kind.index()]
    }
}
