//! Generation jobs and the pure plans they produce.

use std::time::Instant;

use verdant_lod::ChunkCoord;
use verdant_terrain::{ChunkContent, TerrainGenerator};

/// A request to generate one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationJob {
    /// Chunk to generate.
    pub coord: ChunkCoord,
    /// LOD to generate at.
    pub lod: u8,
    /// World epoch the job was dispatched in.
    pub epoch: u64,
}

/// Generated content waiting to be turned into instances.
#[derive(Clone, Debug)]
pub struct ChunkPlan {
    /// Chunk the plan belongs to.
    pub coord: ChunkCoord,
    /// World epoch of the originating job.
    pub epoch: u64,
    /// Tiles and placements.
    pub content: ChunkContent,
    /// Time spent generating, in microseconds.
    pub elapsed_us: u64,
}

impl ChunkPlan {
    /// Every distinct asset id the plan references, sorted.
    ///
    /// The cover asset only appears when at least one tile is covered.
    pub fn asset_ids(&self) -> Vec<&str> {
        let tiles = &self.content.tiles;
        let mut ids: Vec<&str> = Vec::new();
        if !tiles.tiles.is_empty() {
            ids.push(tiles.ground.as_str());
        }
        if let Some(cover) = tiles.cover.as_deref()
            && tiles.covered_count() > 0
        {
            ids.push(cover);
        }
        ids.extend(self.content.placements.iter().map(|p| p.asset.as_str()));
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Run a job. Pure: reads only the terrain generator.
pub fn generate_plan(terrain: &TerrainGenerator, job: GenerationJob) -> ChunkPlan {
    let start = Instant::now();
    let content = terrain.generate_chunk(job.coord.as_tuple(), job.lod);
    ChunkPlan {
        coord: job.coord,
        epoch: job.epoch,
        content,
        elapsed_us: start.elapsed().as_micros() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_config::Config;

    fn terrain() -> TerrainGenerator {
        TerrainGenerator::from_config(&Config::default()).unwrap()
    }

    #[test]
    fn test_plan_matches_direct_generation() {
        let terrain = terrain();
        let job = GenerationJob {
            coord: ChunkCoord::new(3, -2),
            lod: 0,
            epoch: 7,
        };
        let plan = generate_plan(&terrain, job);
        assert_eq!(plan.coord, job.coord);
        assert_eq!(plan.epoch, 7);
        assert_eq!(plan.content, terrain.generate_chunk((3, -2), 0));
    }

    #[test]
    fn test_asset_ids_are_distinct_and_known() {
        let terrain = terrain();
        let known = terrain.asset_ids();
        let plan = generate_plan(
            &terrain,
            GenerationJob {
                coord: ChunkCoord::ORIGIN,
                lod: 0,
                epoch: 0,
            },
        );
        let ids = plan.asset_ids();
        assert!(!ids.is_empty(), "a chunk always has ground tiles");
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids must be sorted and unique");
        for id in ids {
            assert!(known.iter().any(|k| k == id), "{id} not in generator asset list");
        }
    }
}
