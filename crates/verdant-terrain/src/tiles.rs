//! Ground tile layout: a regular grid of tiles per chunk, textured by the
//! chunk's center biome, with optional ground-cover decorations.

use glam::DVec2;
use hashbrown::HashMap;
use rand::Rng;
use verdant_config::{TileCatalogConfig, TileSetEntry};

use crate::biome::BiomeRecord;
use crate::height_field::HeightField;
use crate::placement::Rect;
use crate::seed::ground_cover_rng;

/// One ground tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundTile {
    /// Tile center on the XZ plane.
    pub center: DVec2,
    /// Terrain height at the center.
    pub height: f64,
    /// Edge length in world units.
    pub size: f64,
    /// Whether a ground-cover decoration sits on this tile.
    pub covered: bool,
}

/// All tiles of one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct TileLayout {
    /// Ground tile asset id.
    pub ground: String,
    /// Ground-cover asset id, if the biome has one.
    pub cover: Option<String>,
    /// Tiles in row-major order.
    pub tiles: Vec<GroundTile>,
}

impl TileLayout {
    /// Number of tiles carrying ground cover.
    pub fn covered_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.covered).count()
    }
}

/// Biome name to tile set mapping.
#[derive(Clone, Debug)]
pub struct TileCatalog {
    default: TileSetEntry,
    biomes: HashMap<String, TileSetEntry>,
}

impl TileCatalog {
    /// Build from configuration.
    pub fn from_config(config: &TileCatalogConfig) -> Self {
        Self {
            default: config.default.clone(),
            biomes: config
                .biomes
                .iter()
                .map(|(name, set)| (name.clone(), set.clone()))
                .collect(),
        }
    }

    /// Tile set for a biome, or the default set.
    pub fn tile_set(&self, biome: &str) -> &TileSetEntry {
        self.biomes.get(biome).unwrap_or(&self.default)
    }

    /// Every asset id the catalog references.
    pub fn asset_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(&self.default)
            .chain(self.biomes.values())
            .flat_map(|set| std::iter::once(set.ground.as_str()).chain(set.cover.as_deref()))
    }

    /// Lay out tiles over `bounds` at `tile_size · 2^lod` spacing.
    ///
    /// Ground cover is only decorated at LOD 0.
    pub fn layout(
        &self,
        field: &HeightField,
        bounds: Rect,
        tile_size: f64,
        lod: u8,
        biome: &BiomeRecord,
        chunk_seed: u64,
    ) -> TileLayout {
        let set = self.tile_set(&biome.name);
        let spacing = tile_size * f64::from(1u32 << lod.min(16));
        let cols = (bounds.width() / spacing).ceil().max(1.0) as usize;
        let rows = (bounds.height() / spacing).ceil().max(1.0) as usize;
        let decorate = lod == 0 && set.cover.is_some() && biome.ground_cover_density > 0.0;
        let mut rng = ground_cover_rng(chunk_seed);

        let mut tiles = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let center = bounds.min
                    + DVec2::new((col as f64 + 0.5) * spacing, (row as f64 + 0.5) * spacing);
                let covered = decorate && rng.random::<f64>() < biome.ground_cover_density;
                tiles.push(GroundTile {
                    center,
                    height: field.height(center.x, center.y),
                    size: spacing,
                    covered,
                });
            }
        }

        TileLayout {
            ground: set.ground.clone(),
            cover: set.cover.clone(),
            tiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BiomeClassifier, BiomeRegistry};
    use crate::noise_field::{NoiseField, NoiseParams};
    use verdant_config::{BiomeEntry, TerrainConfig, biome_names};

    fn field() -> HeightField {
        let terrain = TerrainConfig::default();
        let registry = BiomeRegistry::from_entries(&BiomeEntry::standard_set()).unwrap();
        let classifier = BiomeClassifier::new(2, &terrain, &registry).unwrap();
        HeightField::new(
            NoiseField::new(NoiseParams::from_config(2, &terrain)),
            classifier,
            &registry,
        )
    }

    fn chunk() -> Rect {
        Rect::new(DVec2::new(64.0, -64.0), DVec2::new(128.0, 0.0))
    }

    fn record(name: &str, cover: f64) -> BiomeRecord {
        let mut entry = BiomeEntry::fallback(name);
        entry.ground_cover_density = cover;
        BiomeRecord::from(&entry)
    }

    #[test]
    fn test_unknown_biome_uses_default_set() {
        let catalog = TileCatalog::from_config(&TileCatalogConfig::default());
        assert_eq!(catalog.tile_set("volcanic").ground, "tile_dirt");
        assert_eq!(catalog.tile_set(biome_names::FOREST).ground, "tile_grass");
    }

    #[test]
    fn test_tile_count_halves_per_lod() {
        let catalog = TileCatalog::from_config(&TileCatalogConfig::default());
        let field = field();
        let biome = record(biome_names::PLAINS, 0.5);
        let lod0 = catalog.layout(&field, chunk(), 2.0, 0, &biome, 1);
        let lod1 = catalog.layout(&field, chunk(), 2.0, 1, &biome, 1);
        let lod3 = catalog.layout(&field, chunk(), 2.0, 3, &biome, 1);
        assert_eq!(lod0.tiles.len(), 32 * 32);
        assert_eq!(lod1.tiles.len(), 16 * 16);
        assert_eq!(lod3.tiles.len(), 4 * 4);
        assert_eq!(lod3.tiles[0].size, 16.0);
    }

    #[test]
    fn test_tiles_cover_chunk_and_sit_on_terrain() {
        let catalog = TileCatalog::from_config(&TileCatalogConfig::default());
        let field = field();
        let layout = catalog.layout(&field, chunk(), 2.0, 0, &record("desert", 0.0), 3);
        assert_eq!(layout.tiles[0].center, DVec2::new(65.0, -63.0));
        for tile in &layout.tiles {
            assert!(chunk().contains(tile.center));
            assert_eq!(tile.height, field.height(tile.center.x, tile.center.y));
        }
    }

    #[test]
    fn test_ground_cover_only_at_lod_zero() {
        let catalog = TileCatalog::from_config(&TileCatalogConfig::default());
        let field = field();
        let biome = record(biome_names::FOREST, 1.0);
        let lod0 = catalog.layout(&field, chunk(), 2.0, 0, &biome, 5);
        assert_eq!(lod0.covered_count(), lod0.tiles.len());
        assert_eq!(lod0.cover.as_deref(), Some("cover_leaves"));

        let lod1 = catalog.layout(&field, chunk(), 2.0, 1, &biome, 5);
        assert_eq!(lod1.covered_count(), 0);
    }

    #[test]
    fn test_no_cover_asset_means_no_cover() {
        let catalog = TileCatalog::from_config(&TileCatalogConfig::default());
        let layout = catalog.layout(&field(), chunk(), 2.0, 0, &record(biome_names::DESERT, 1.0), 5);
        assert!(layout.cover.is_none());
        assert_eq!(layout.covered_count(), 0);
    }

    #[test]
    fn test_cover_density_is_deterministic() {
        let catalog = TileCatalog::from_config(&TileCatalogConfig::default());
        let field = field();
        let biome = record(biome_names::PLAINS, 0.5);
        let a = catalog.layout(&field, chunk(), 2.0, 0, &biome, 42);
        let b = catalog.layout(&field, chunk(), 2.0, 0, &biome, 42);
        assert_eq!(a, b);
        let covered = a.covered_count();
        assert!(covered > 0 && covered < a.tiles.len());
    }

    #[test]
    fn test_asset_ids_include_cover() {
        let catalog = TileCatalog::from_config(&TileCatalogConfig::default());
        let ids: Vec<_> = catalog.asset_ids().collect();
        assert!(ids.contains(&"tile_dirt"));
        assert!(ids.contains(&"cover_reeds"));
    }
}
