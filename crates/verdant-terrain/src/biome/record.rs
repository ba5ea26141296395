//! Biome record: the immutable parameters of a single biome.

use verdant_config::{BiomeEntry, VegetationCategory, VegetationDensity};

/// Full descriptor for a biome.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeRecord {
    /// Biome name (e.g., "forest").
    pub name: String,
    /// Multiplier applied to the fractal terrain height.
    pub height_modifier: f64,
    /// Vegetation acceptance probability per category.
    pub vegetation_density: VegetationDensity,
    /// Probability of a ground-cover decoration per tile.
    pub ground_cover_density: f64,
    /// Display color (RGB).
    pub color: [u8; 3],
}

impl BiomeRecord {
    /// Vegetation density for one category.
    pub fn density(&self, category: VegetationCategory) -> f64 {
        self.vegetation_density.get(category)
    }
}

impl From<&BiomeEntry> for BiomeRecord {
    fn from(entry: &BiomeEntry) -> Self {
        Self {
            name: entry.id.clone(),
            height_modifier: entry.height_modifier,
            vegetation_density: entry.vegetation_density,
            ground_cover_density: entry.ground_cover_density,
            color: entry.color,
        }
    }
}
