//! Per-chunk content generation: the pure half of the chunk pipeline.
//!
//! Given a chunk coordinate and LOD, determines the center biome, lays out
//! ground tiles and plans vegetation. Touches no shared state, so it is safe
//! to call from worker threads.

use glam::DVec2;
use verdant_config::Config;

use crate::biome::{BiomeClassifier, BiomeId, BiomeRecord, BiomeRegistry, BiomeRegistryError};
use crate::height_field::HeightField;
use crate::noise_field::{NoiseField, NoiseParams};
use crate::placement::{PlacementPoint, PlacementStats, Rect, VegetationPlanner};
use crate::seed::derive_chunk_seed;
use crate::tiles::{TileCatalog, TileLayout};

/// Everything generated for one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkContent {
    /// Chunk grid coordinate.
    pub chunk: (i32, i32),
    /// LOD the content was generated at.
    pub lod: u8,
    /// Biome at the chunk center.
    pub center_biome: BiomeId,
    /// Ground tiles.
    pub tiles: TileLayout,
    /// Accepted vegetation placements.
    pub placements: Vec<PlacementPoint>,
    /// Filter counters.
    pub stats: PlacementStats,
}

/// Owns the whole procedural chain for one world seed.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    seed: u64,
    chunk_size: f64,
    tile_size: f64,
    registry: BiomeRegistry,
    field: HeightField,
    planner: VegetationPlanner,
    tiles: TileCatalog,
}

impl TerrainGenerator {
    /// Build the generator from configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`BiomeRegistryError`] if the biome list is empty or has
    /// duplicate ids.
    pub fn from_config(config: &Config) -> Result<Self, BiomeRegistryError> {
        let seed = config.world.seed;
        let registry = BiomeRegistry::from_entries(&config.biomes)?;
        let classifier = BiomeClassifier::new(seed, &config.terrain, &registry)?;
        let noise = NoiseField::new(NoiseParams::from_config(seed, &config.terrain));
        let field = HeightField::new(noise, classifier, &registry);
        let planner = VegetationPlanner::new(&config.vegetation, &registry);
        let tiles = TileCatalog::from_config(&config.tiles);

        tracing::debug!(
            seed,
            biomes = registry.len(),
            rules = planner.len(),
            "terrain generator ready"
        );

        Ok(Self {
            seed,
            chunk_size: config.world.chunk_size,
            tile_size: config.world.tile_size,
            registry,
            field,
            planner,
            tiles,
        })
    }

    /// World seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Chunk edge length in world units.
    pub fn chunk_size(&self) -> f64 {
        self.chunk_size
    }

    /// Ground tile edge length at LOD 0.
    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// World-space rectangle covered by a chunk.
    pub fn chunk_bounds(&self, chunk: (i32, i32)) -> Rect {
        let min = DVec2::new(chunk.0 as f64, chunk.1 as f64) * self.chunk_size;
        Rect::new(min, min + DVec2::splat(self.chunk_size))
    }

    /// Terrain height at a world coordinate.
    pub fn height(&self, x: f64, z: f64) -> f64 {
        self.field.height(x, z)
    }

    /// Biome at a world coordinate.
    pub fn biome(&self, x: f64, z: f64) -> BiomeId {
        self.field.biome(x, z)
    }

    /// The biome registry.
    pub fn registry(&self) -> &BiomeRegistry {
        &self.registry
    }

    /// The height field.
    pub fn height_field(&self) -> &HeightField {
        &self.field
    }

    /// Every asset id that generated content can reference.
    pub fn asset_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .tiles
            .asset_ids()
            .chain(self.planner.asset_ids())
            .map(str::to_string)
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Generate a chunk's content.
    pub fn generate_chunk(&self, chunk: (i32, i32), lod: u8) -> ChunkContent {
        let bounds = self.chunk_bounds(chunk);
        let center = bounds.center();
        let center_biome = self.field.biome(center.x, center.y);
        let chunk_seed = derive_chunk_seed(self.seed, chunk);

        let fallback;
        let record = match self.registry.try_get(center_biome) {
            Some(record) => record,
            None => {
                fallback = BiomeRecord::from(&verdant_config::BiomeEntry::default());
                &fallback
            }
        };

        let tiles = self
            .tiles
            .layout(&self.field, bounds, self.tile_size, lod, record, chunk_seed);
        let (placements, stats) =
            self.planner
                .plan(&self.field, &self.registry, bounds, chunk_seed, lod);

        tracing::trace!(
            x = chunk.0,
            z = chunk.1,
            lod,
            biome = %record.name,
            tiles = tiles.tiles.len(),
            placements = placements.len(),
            "chunk content generated"
        );

        ChunkContent {
            chunk,
            lod,
            center_biome,
            tiles,
            placements,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(seed: u64) -> TerrainGenerator {
        let mut config = Config::default();
        config.world.seed = seed;
        TerrainGenerator::from_config(&config).unwrap()
    }

    #[test]
    fn test_chunk_bounds() {
        let g = generator(1);
        let b = g.chunk_bounds((-1, 2));
        assert_eq!(b.min, DVec2::new(-64.0, 128.0));
        assert_eq!(b.max, DVec2::new(0.0, 192.0));
    }

    #[test]
    fn test_generate_chunk_deterministic() {
        let a = generator(1337).generate_chunk((3, -2), 0);
        let b = generator(1337).generate_chunk((3, -2), 0);
        assert_eq!(a, b, "same seed and chunk must produce identical content");
    }

    #[test]
    fn test_generation_independent_of_order() {
        let g = generator(5);
        let first = g.generate_chunk((0, 0), 0);
        let _ = g.generate_chunk((1, 0), 0);
        let _ = g.generate_chunk((-4, 9), 2);
        assert_eq!(first, g.generate_chunk((0, 0), 0));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generator(1).generate_chunk((0, 0), 0);
        let b = generator(2).generate_chunk((0, 0), 0);
        assert_ne!(a.placements, b.placements);
    }

    #[test]
    fn test_center_biome_matches_query() {
        let g = generator(9);
        let content = g.generate_chunk((2, 2), 1);
        let c = g.chunk_bounds((2, 2)).center();
        assert_eq!(content.center_biome, g.biome(c.x, c.y));
        assert!(g.registry().contains(content.center_biome));
    }

    #[test]
    fn test_placements_inside_chunk() {
        let g = generator(12);
        let content = g.generate_chunk((-3, 1), 0);
        let bounds = g.chunk_bounds((-3, 1));
        for p in &content.placements {
            assert!(bounds.contains(p.position), "{:?} outside chunk", p.position);
        }
    }

    #[test]
    fn test_coarse_lod_generates_less() {
        let g = generator(4);
        let fine = g.generate_chunk((0, 0), 0);
        let coarse = g.generate_chunk((0, 0), 3);
        assert!(coarse.tiles.tiles.len() < fine.tiles.tiles.len());
        assert!(coarse.stats.candidates <= fine.stats.candidates);
    }

    #[test]
    fn test_asset_ids_sorted_and_unique() {
        let ids = generator(1).asset_ids();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(ids, sorted);
        assert!(ids.iter().any(|id| id == "tree_oak"));
        assert!(ids.iter().any(|id| id == "tile_grass"));
    }
}
