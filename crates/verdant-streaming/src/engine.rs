//! The streaming engine: one object the host frame loop talks to.

use std::sync::Arc;
use std::time::Duration;

use glam::DVec3;
use verdant_assets::AssetProvider;
use verdant_config::Config;
use verdant_instancing::{InstanceSink, PoolLayout, RendererCapabilities, SinkMode, create_sink};
use verdant_lod::ChunkCoord;
use verdant_terrain::{BiomeId, TerrainGenerator};

use crate::backend::{BackendKind, create_backend};
use crate::chunk::{ChunkRecord, ChunkState};
use crate::error::StreamingError;
use crate::lifecycle::{LifecycleManager, LifecycleReport};
use crate::scheduler::{LoadScheduler, SchedulerReport};
use crate::world::WorldContext;

/// Longest a quiescence loop blocks waiting on a worker.
const WORKER_WAIT: Duration = Duration::from_millis(50);

/// What one [`StreamingEngine::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Tick number.
    pub tick: u64,
    /// Lifecycle half.
    pub lifecycle: LifecycleReport,
    /// Scheduler half.
    pub scheduler: SchedulerReport,
}

/// Snapshot of the engine's state and cumulative counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamingStats {
    /// Ticks run.
    pub ticks: u64,
    /// Chunks waiting in the queue.
    pub queued: usize,
    /// Chunks being generated or finalized.
    pub loading: usize,
    /// Resident chunks.
    pub ready: usize,
    /// Chunks finalized since start.
    pub finalized_total: u64,
    /// Queued chunks cancelled since start.
    pub cancelled_total: u64,
    /// Ready chunks evicted since start.
    pub evicted_total: u64,
    /// Failed asset lookups since start.
    pub asset_failures: u64,
    /// Pool overflow occurrences since start.
    pub pool_overflows: u64,
    /// Finalizations deferred on pending assets since start.
    pub deferred_total: u64,
    /// Live instances across all asset types.
    pub live_instances: usize,
}

/// Streams terrain and vegetation around a moving viewpoint.
///
/// Single-owner: every mutation happens inside [`StreamingEngine::tick`] on
/// the calling thread.
#[derive(Debug)]
pub struct StreamingEngine {
    world: WorldContext,
    lifecycle: LifecycleManager,
    scheduler: LoadScheduler,
}

impl StreamingEngine {
    /// Validate the config and build every component.
    ///
    /// # Errors
    ///
    /// [`StreamingError::InvalidConfig`] if the config is unusable, or
    /// [`StreamingError::WorkerSpawn`] if worker threads cannot start.
    pub fn new<A>(
        config: &Config,
        capabilities: RendererCapabilities,
        assets: A,
    ) -> Result<Self, StreamingError>
    where
        A: AssetProvider + Send + 'static,
    {
        config.validate()?;

        let terrain = Arc::new(TerrainGenerator::from_config(config)?);
        let asset_ids = terrain.asset_ids();
        let layout = PoolLayout::from_config(
            &config.instancing,
            asset_ids.iter().map(String::as_str),
        );
        let sink = create_sink(&capabilities, &config.instancing, layout);
        let lifecycle = LifecycleManager::new(&config.streaming, config.world.chunk_size)?;
        let backend = create_backend(
            Arc::clone(&terrain),
            config.streaming.worker_threads,
            config.streaming.max_concurrent,
        )?;
        let scheduler = LoadScheduler::new(&config.streaming, backend);

        tracing::info!(
            seed = config.world.seed,
            chunk_size = config.world.chunk_size,
            view_radius = config.streaming.view_radius,
            unload_radius = config.streaming.unload_radius,
            asset_types = asset_ids.len(),
            mode = ?sink.mode(),
            backend = ?scheduler.backend_kind(),
            "streaming engine started"
        );

        Ok(Self {
            world: WorldContext::new(terrain, sink, Box::new(assets)),
            lifecycle,
            scheduler,
        })
    }

    /// Advance one frame: lifecycle update, then scheduler work.
    pub fn tick(&mut self, viewpoint: DVec3) -> FrameReport {
        self.world.tick += 1;
        self.world.assets.begin_frame();
        let lifecycle =
            self.lifecycle
                .update(&mut self.world, self.scheduler.queue_mut(), viewpoint);
        let scheduler = self.scheduler.tick(&mut self.world);
        FrameReport {
            tick: self.world.tick,
            lifecycle,
            scheduler,
        }
    }

    /// Tick until nothing is queued, loading or awaiting eviction.
    ///
    /// Returns the number of ticks run, or `None` if `max_ticks` ran out
    /// first. With worker threads, idle ticks block briefly on the next
    /// result instead of spinning.
    pub fn run_until_quiescent(&mut self, viewpoint: DVec3, max_ticks: usize) -> Option<usize> {
        for ticks in 1..=max_ticks {
            let report = self.tick(viewpoint);
            if self.is_quiescent() {
                return Some(ticks);
            }
            if report.scheduler.finalized == 0
                && matches!(self.scheduler.backend_kind(), BackendKind::Workers(_))
            {
                self.scheduler.wait_for_plan(WORKER_WAIT);
            }
        }
        tracing::debug!(max_ticks, "streaming did not settle");
        None
    }

    /// Nothing queued, nothing loading, nothing left to evict.
    pub fn is_quiescent(&self) -> bool {
        self.scheduler.is_idle() && !self.lifecycle.has_pending_evictions(&self.world)
    }

    /// Lifecycle state of a chunk.
    pub fn chunk_state(&self, coord: ChunkCoord) -> ChunkState {
        self.world.chunks.state(coord)
    }

    /// Every `Ready` chunk, sorted.
    pub fn ready_chunks(&self) -> Vec<ChunkCoord> {
        self.world.chunks.coords_in_state(ChunkState::Ready)
    }

    /// A chunk's record.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkRecord> {
        self.world.chunks.get(coord)
    }

    /// Current state and cumulative counters.
    pub fn stats(&self) -> StreamingStats {
        let counts = self.world.chunks.counts();
        let counters = self.world.counters;
        StreamingStats {
            ticks: self.world.tick,
            queued: counts.queued,
            loading: counts.loading,
            ready: counts.ready,
            finalized_total: counters.finalized,
            cancelled_total: counters.cancelled,
            evicted_total: counters.evicted,
            asset_failures: counters.asset_failures,
            pool_overflows: counters.pool_overflows,
            deferred_total: counters.deferred,
            live_instances: self.world.sink.total_live(),
        }
    }

    /// Terrain height at a world coordinate.
    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        self.world.terrain.height(x, z)
    }

    /// Biome at a world coordinate.
    pub fn biome_at(&self, x: f64, z: f64) -> BiomeId {
        self.world.terrain.biome(x, z)
    }

    /// Name of the biome at a world coordinate.
    pub fn biome_name_at(&self, x: f64, z: f64) -> &str {
        let id = self.biome_at(x, z);
        self.world
            .terrain
            .registry()
            .try_get(id)
            .map_or("unknown", |record| record.name.as_str())
    }

    /// Drop every chunk and instance. Work already on worker threads is
    /// discarded when it comes back.
    pub fn reset(&mut self) {
        self.scheduler.reset();
        self.world.clear();
        self.lifecycle.reset();
        tracing::info!(epoch = self.scheduler.epoch(), "world reset");
    }

    /// The instance sink, for the renderer.
    pub fn sink(&self) -> &dyn InstanceSink {
        self.world.sink()
    }

    /// Which sink implementation was selected.
    pub fn sink_mode(&self) -> SinkMode {
        self.world.sink.mode()
    }

    /// Which backend generates chunks.
    pub fn backend_kind(&self) -> BackendKind {
        self.scheduler.backend_kind()
    }

    /// The terrain generator.
    pub fn terrain(&self) -> &TerrainGenerator {
        &self.world.terrain
    }

    /// The world context.
    pub fn world(&self) -> &WorldContext {
        &self.world
    }

    /// The viewpoint chunk of the last tick.
    pub fn center(&self) -> Option<ChunkCoord> {
        self.lifecycle.last_center()
    }
}
