//! Biome records, tile catalog, and vegetation rule records.
//!
//! These are plain data loaded once at startup. The terrain crate turns them
//! into its registry and placement tables.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Names of the biomes the classifier can produce.
pub mod biome_names {
    /// High-altitude terrain.
    pub const MOUNTAIN: &str = "mountain";
    /// Hot and wet special biome.
    pub const MYSTICAL: &str = "mystical";
    /// Warm, moist woodland.
    pub const FOREST: &str = "forest";
    /// Warm, dry sand.
    pub const DESERT: &str = "desert";
    /// Temperate wetland.
    pub const SWAMP: &str = "swamp";
    /// Temperate grassland.
    pub const PLAINS: &str = "plains";
    /// Cold fallback biome.
    pub const TUNDRA: &str = "tundra";

    /// Every biome name the classifier may return, in decision-table order.
    pub const ALL: [&str; 7] = [MOUNTAIN, MYSTICAL, FOREST, DESERT, SWAMP, PLAINS, TUNDRA];
}

/// Decorative object category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VegetationCategory {
    /// Trees.
    Tree,
    /// Bushes and shrubs.
    Bush,
    /// Rocks and boulders.
    Rock,
    /// Small plants, ferns, grass tufts.
    Plant,
}

impl VegetationCategory {
    /// All categories in generation order.
    pub const ALL: [VegetationCategory; 4] = [Self::Tree, Self::Bush, Self::Rock, Self::Plant];

    /// Stable small integer used for seed derivation.
    pub fn index(self) -> u64 {
        match self {
            Self::Tree => 0,
            Self::Bush => 1,
            Self::Rock => 2,
            Self::Plant => 3,
        }
    }
}

/// Per-category vegetation density, each a probability in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VegetationDensity {
    /// Tree acceptance probability.
    pub tree: f64,
    /// Bush acceptance probability.
    pub bush: f64,
    /// Rock acceptance probability.
    pub rock: f64,
    /// Plant acceptance probability.
    pub plant: f64,
}

impl VegetationDensity {
    /// Density for a single category.
    pub fn get(&self, category: VegetationCategory) -> f64 {
        match category {
            VegetationCategory::Tree => self.tree,
            VegetationCategory::Bush => self.bush,
            VegetationCategory::Rock => self.rock,
            VegetationCategory::Plant => self.plant,
        }
    }
}

impl Default for VegetationDensity {
    fn default() -> Self {
        Self {
            tree: 0.1,
            bush: 0.1,
            rock: 0.1,
            plant: 0.1,
        }
    }
}

/// One biome registry record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BiomeEntry {
    /// Biome name, unique within the registry.
    pub id: String,
    /// Multiplier applied to the fractal height.
    pub height_modifier: f64,
    /// Vegetation density per category.
    pub vegetation_density: VegetationDensity,
    /// Probability of a ground-cover decoration per tile.
    pub ground_cover_density: f64,
    /// Display color (RGB).
    pub color: [u8; 3],
}

impl BiomeEntry {
    /// The default record used for any biome the configuration leaves out:
    /// unit height modifier, 0.1 density everywhere, 0.2 ground cover, grey.
    pub fn fallback(id: &str) -> Self {
        Self {
            id: id.to_string(),
            height_modifier: 1.0,
            vegetation_density: VegetationDensity::default(),
            ground_cover_density: 0.2,
            color: [128, 128, 128],
        }
    }

    fn standard(
        id: &str,
        height_modifier: f64,
        [tree, bush, rock, plant]: [f64; 4],
        ground_cover_density: f64,
        color: [u8; 3],
    ) -> Self {
        Self {
            id: id.to_string(),
            height_modifier,
            vegetation_density: VegetationDensity {
                tree,
                bush,
                rock,
                plant,
            },
            ground_cover_density,
            color,
        }
    }

    /// The built-in biome table.
    pub fn standard_set() -> Vec<Self> {
        use biome_names::*;
        vec![
            Self::standard(MOUNTAIN, 2.5, [0.05, 0.1, 0.6, 0.05], 0.05, [130, 126, 120]),
            Self::standard(MYSTICAL, 1.2, [0.5, 0.4, 0.2, 0.8], 0.6, [150, 90, 200]),
            Self::standard(FOREST, 1.0, [0.8, 0.5, 0.2, 0.6], 0.5, [40, 120, 50]),
            Self::standard(DESERT, 0.6, [0.02, 0.1, 0.3, 0.05], 0.02, [220, 200, 140]),
            Self::standard(SWAMP, 0.4, [0.4, 0.6, 0.1, 0.7], 0.7, [70, 90, 60]),
            Self::standard(PLAINS, 0.8, [0.1, 0.3, 0.1, 0.8], 0.6, [120, 180, 80]),
            Self::standard(TUNDRA, 0.9, [0.05, 0.1, 0.3, 0.1], 0.1, [220, 230, 235]),
        ]
    }
}

impl Default for BiomeEntry {
    fn default() -> Self {
        Self::fallback("unnamed")
    }
}

/// Ground tile assets for one biome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct TileSetEntry {
    /// Asset id of the ground tile mesh.
    pub ground: String,
    /// Optional ground-cover decoration placed on top of tiles.
    pub cover: Option<String>,
}

impl TileSetEntry {
    fn new(ground: &str, cover: Option<&str>) -> Self {
        Self {
            ground: ground.to_string(),
            cover: cover.map(str::to_string),
        }
    }
}

/// Mapping from biome name to ground tile set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TileCatalogConfig {
    /// Tile set for biomes without an explicit entry.
    pub default: TileSetEntry,
    /// Per-biome tile sets.
    pub biomes: HashMap<String, TileSetEntry>,
}

impl Default for TileCatalogConfig {
    fn default() -> Self {
        use biome_names::*;
        let biomes = [
            (MOUNTAIN, TileSetEntry::new("tile_stone", None)),
            (MYSTICAL, TileSetEntry::new("tile_moss", Some("cover_glowcap"))),
            (FOREST, TileSetEntry::new("tile_grass", Some("cover_leaves"))),
            (DESERT, TileSetEntry::new("tile_sand", None)),
            (SWAMP, TileSetEntry::new("tile_mud", Some("cover_reeds"))),
            (PLAINS, TileSetEntry::new("tile_grass", Some("cover_grass"))),
            (TUNDRA, TileSetEntry::new("tile_snow", None)),
        ]
        .into_iter()
        .map(|(name, set)| (name.to_string(), set))
        .collect();
        Self {
            default: TileSetEntry::new("tile_dirt", None),
            biomes,
        }
    }
}

/// Placement rule for one vegetation category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VegetationRule {
    /// Category the rule applies to.
    pub category: VegetationCategory,
    /// Candidate asset ids; one is picked per accepted point.
    pub assets: Vec<String>,
    /// Minimum spacing between points of this category.
    pub min_distance: f64,
    /// Poisson-disc attempts per active point.
    pub max_attempts: u32,
    /// Allowed terrain height range `[min, max]`.
    pub height_range: (f64, f64),
    /// Allowed slope range (rise over run) `[min, max]`.
    pub slope_range: (f64, f64),
    /// Biome names the category may grow in. Empty means every biome.
    pub biomes: Vec<String>,
    /// Uniform scale range `[min, max]`.
    pub scale_range: (f64, f64),
    /// Coarsest chunk LOD at which this category is still generated.
    pub max_lod: u8,
}

impl Default for VegetationRule {
    fn default() -> Self {
        Self {
            category: VegetationCategory::Plant,
            assets: Vec::new(),
            min_distance: 4.0,
            max_attempts: 30,
            height_range: (f64::MIN, f64::MAX),
            slope_range: (0.0, f64::MAX),
            biomes: Vec::new(),
            scale_range: (1.0, 1.0),
            max_lod: u8::MAX,
        }
    }
}

impl VegetationRule {
    /// The built-in rule set: trees, bushes, rocks and plants.
    pub fn standard_set() -> Vec<Self> {
        use biome_names::*;
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        vec![
            Self {
                category: VegetationCategory::Tree,
                assets: names(&["tree_oak", "tree_pine"]),
                min_distance: 10.0,
                height_range: (-6.0, 48.0),
                slope_range: (0.0, 0.8),
                biomes: names(&[FOREST, PLAINS, SWAMP, MYSTICAL, TUNDRA]),
                scale_range: (0.8, 1.3),
                max_lod: 3,
                ..Default::default()
            },
            Self {
                category: VegetationCategory::Bush,
                assets: names(&["bush_round"]),
                min_distance: 5.0,
                height_range: (-6.0, 48.0),
                slope_range: (0.0, 1.0),
                scale_range: (0.7, 1.2),
                max_lod: 2,
                ..Default::default()
            },
            Self {
                category: VegetationCategory::Rock,
                assets: names(&["rock_small", "rock_large"]),
                min_distance: 6.0,
                height_range: (-200.0, 200.0),
                slope_range: (0.0, 3.0),
                scale_range: (0.5, 1.5),
                max_lod: 2,
                ..Default::default()
            },
            Self {
                category: VegetationCategory::Plant,
                assets: names(&["plant_fern", "grass_tuft"]),
                min_distance: 2.0,
                height_range: (-6.0, 36.0),
                slope_range: (0.0, 0.6),
                biomes: names(&[FOREST, PLAINS, SWAMP, MYSTICAL]),
                scale_range: (0.6, 1.1),
                max_lod: 1,
                ..Default::default()
            },
        ]
    }
}
