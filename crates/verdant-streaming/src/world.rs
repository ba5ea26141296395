//! The world context: sole owner of the mutable streaming state.
//!
//! Terrain, chunk registry, instance sink and asset provider live here and are
//! passed by reference to the lifecycle manager and the scheduler. Nothing is
//! global, and nothing here is shared with worker threads except the
//! read-only terrain generator.

use std::sync::Arc;

use verdant_assets::AssetProvider;
use verdant_instancing::{InstanceHandle, InstanceSink};
use verdant_lod::ChunkCoord;
use verdant_terrain::TerrainGenerator;

use crate::chunk::{ChunkRecord, ChunkRegistry};

/// Cumulative event counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamingCounters {
    /// Chunks that reached `Ready`.
    pub finalized: u64,
    /// Queued chunks dropped before generation started.
    pub cancelled: u64,
    /// Ready chunks unloaded (distance or residency cap).
    pub evicted: u64,
    /// Failed mesh lookups.
    pub asset_failures: u64,
    /// (chunk, asset type) pairs that hit a full pool.
    pub pool_overflows: u64,
    /// Finalizations postponed because an asset was still loading.
    pub deferred: u64,
}

/// Owns everything the streaming pipeline mutates.
pub struct WorldContext {
    pub(crate) terrain: Arc<TerrainGenerator>,
    pub(crate) chunks: ChunkRegistry,
    pub(crate) sink: Box<dyn InstanceSink + Send>,
    pub(crate) assets: Box<dyn AssetProvider + Send>,
    pub(crate) tick: u64,
    pub(crate) counters: StreamingCounters,
}

impl WorldContext {
    /// Assemble a world context.
    pub fn new(
        terrain: Arc<TerrainGenerator>,
        sink: Box<dyn InstanceSink + Send>,
        assets: Box<dyn AssetProvider + Send>,
    ) -> Self {
        Self {
            terrain,
            chunks: ChunkRegistry::new(),
            sink,
            assets,
            tick: 0,
            counters: StreamingCounters::default(),
        }
    }

    /// The terrain generator.
    pub fn terrain(&self) -> &Arc<TerrainGenerator> {
        &self.terrain
    }

    /// The chunk registry.
    pub fn chunks(&self) -> &ChunkRegistry {
        &self.chunks
    }

    /// The instance sink.
    pub fn sink(&self) -> &dyn InstanceSink {
        self.sink.as_ref()
    }

    /// Current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Cumulative counters.
    pub fn counters(&self) -> StreamingCounters {
        self.counters
    }

    /// Unload a chunk, releasing every instance it owns.
    ///
    /// Returns the removed record, `None` if the chunk had none.
    pub(crate) fn unload(&mut self, coord: ChunkCoord) -> Option<ChunkRecord> {
        let record = self.chunks.remove(coord)?;
        self.release_handles(coord, &record.handles);
        Some(record)
    }

    pub(crate) fn release_handles(&mut self, coord: ChunkCoord, handles: &[InstanceHandle]) {
        let mut stale = 0_usize;
        for &handle in handles {
            if self.sink.release(handle).is_err() {
                stale += 1;
            }
        }
        if stale > 0 {
            tracing::debug!(%coord, stale, "chunk held stale instance handles");
        }
    }

    /// Drop every chunk and instance.
    pub(crate) fn clear(&mut self) {
        self.chunks.clear();
        self.sink.clear_all();
    }
}

impl std::fmt::Debug for WorldContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldContext")
            .field("seed", &self.terrain.seed())
            .field("chunks", &self.chunks.len())
            .field("mode", &self.sink.mode())
            .field("tick", &self.tick)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}
