//! Chunk lifecycle: which chunks should exist, at what LOD, and which must go.
//!
//! Runs once per tick before the scheduler. Requeues only when the viewpoint
//! crosses into a new chunk; LOD targets, access times and eviction are
//! refreshed every tick.

use glam::DVec3;
use verdant_config::StreamingConfig;
use verdant_lod::{ChunkCoord, LoadQueue, LodTable, chunks_in_radius, select_lru_evictions};

use crate::chunk::ChunkState;
use crate::error::StreamingError;
use crate::world::WorldContext;

/// What one lifecycle update did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LifecycleReport {
    /// The viewpoint's chunk.
    pub center: ChunkCoord,
    /// Whether the viewpoint entered a different chunk this tick.
    pub moved: bool,
    /// Chunks newly queued.
    pub queued: usize,
    /// Queued chunks dropped for leaving the unload radius.
    pub cancelled: usize,
    /// Ready chunks evicted for distance.
    pub evicted_distance: usize,
    /// Ready chunks evicted by the residency cap.
    pub evicted_lru: usize,
    /// Records whose target LOD changed.
    pub lod_changes: usize,
}

impl LifecycleReport {
    /// Total evictions.
    pub fn evicted(&self) -> usize {
        self.evicted_distance + self.evicted_lru
    }
}

/// Decides chunk membership around the viewpoint.
#[derive(Debug)]
pub struct LifecycleManager {
    view_radius: u32,
    unload_radius: u32,
    max_resident: usize,
    chunk_size: f64,
    lod_table: LodTable,
    last_center: Option<ChunkCoord>,
}

impl LifecycleManager {
    /// Build from streaming config.
    ///
    /// # Errors
    ///
    /// [`StreamingError::InvalidConfig`] for a bad LOD table or radii.
    pub fn new(config: &StreamingConfig, chunk_size: f64) -> Result<Self, StreamingError> {
        if config.unload_radius < config.view_radius {
            return Err(StreamingError::InvalidConfig(format!(
                "unload radius {} is smaller than view radius {}",
                config.unload_radius, config.view_radius
            )));
        }
        if chunk_size.is_nan() || chunk_size <= 0.0 {
            return Err(StreamingError::InvalidConfig(format!(
                "chunk size must be positive, got {chunk_size}"
            )));
        }
        Ok(Self {
            view_radius: config.view_radius,
            unload_radius: config.unload_radius,
            max_resident: config.max_resident_chunks.max(1),
            chunk_size,
            lod_table: LodTable::new(&config.lod_table)?,
            last_center: None,
        })
    }

    /// The viewpoint chunk seen by the last update.
    pub fn last_center(&self) -> Option<ChunkCoord> {
        self.last_center
    }

    /// The LOD table.
    pub fn lod_table(&self) -> &LodTable {
        &self.lod_table
    }

    /// Forget the last viewpoint so the next update requeues everything.
    pub fn reset(&mut self) {
        self.last_center = None;
    }

    /// Run one lifecycle pass.
    pub fn update(
        &mut self,
        world: &mut WorldContext,
        queue: &mut LoadQueue,
        viewpoint: DVec3,
    ) -> LifecycleReport {
        let center = ChunkCoord::from_world(viewpoint, self.chunk_size);
        let moved = self.last_center != Some(center);
        let mut report = LifecycleReport {
            center,
            moved,
            ..Default::default()
        };

        self.refresh_bookkeeping(world, center, &mut report);
        self.evict_out_of_range(world, queue, center, &mut report);

        if moved {
            self.enqueue_neighbourhood(world, queue, center, &mut report);
            self.last_center = Some(center);
        }

        self.enforce_residency_cap(world, &mut report);

        if report.queued + report.cancelled + report.evicted() > 0 {
            tracing::debug!(
                %center,
                queued = report.queued,
                cancelled = report.cancelled,
                evicted = report.evicted(),
                "lifecycle update"
            );
        }
        report
    }

    /// Whether any resident chunk should be evicted on the next update.
    pub fn has_pending_evictions(&self, world: &WorldContext) -> bool {
        let Some(center) = self.last_center else {
            return false;
        };
        let counts = world.chunks.counts();
        counts.ready > self.max_resident
            || world
                .chunks
                .iter()
                .any(|r| r.coord.chebyshev(center) > self.unload_radius)
    }

    fn refresh_bookkeeping(
        &self,
        world: &mut WorldContext,
        center: ChunkCoord,
        report: &mut LifecycleReport,
    ) {
        let tick = world.tick;
        for record in world.chunks.iter_mut() {
            let distance = record.coord.chebyshev(center);
            let target = self.lod_table.select(distance);
            if target != record.target_lod {
                record.target_lod = target;
                report.lod_changes += 1;
            }
            if distance <= self.view_radius {
                record.last_access = tick;
            }
        }
    }

    fn evict_out_of_range(
        &self,
        world: &mut WorldContext,
        queue: &mut LoadQueue,
        center: ChunkCoord,
        report: &mut LifecycleReport,
    ) {
        let out_of_range: Vec<(ChunkCoord, ChunkState)> = world
            .chunks
            .iter()
            .filter(|r| r.coord.chebyshev(center) > self.unload_radius)
            .map(|r| (r.coord, r.state))
            .collect();

        for (coord, state) in out_of_range {
            match state {
                ChunkState::Queued => {
                    queue.remove(coord);
                    world.chunks.remove(coord);
                    world.counters.cancelled += 1;
                    report.cancelled += 1;
                    tracing::debug!(
                        error = %StreamingError::GenerationCancelled(coord),
                        "dropped queued chunk"
                    );
                }
                ChunkState::Ready => {
                    world.unload(coord);
                    world.counters.evicted += 1;
                    report.evicted_distance += 1;
                }
                // Finishes first, evicted on a later tick.
                ChunkState::Loading | ChunkState::Unloaded => {}
            }
        }
    }

    fn enqueue_neighbourhood(
        &self,
        world: &mut WorldContext,
        queue: &mut LoadQueue,
        center: ChunkCoord,
        report: &mut LifecycleReport,
    ) {
        let tick = world.tick;
        for coord in chunks_in_radius(center, self.view_radius) {
            let distance = coord.chebyshev(center);
            match world.chunks.state(coord) {
                ChunkState::Unloaded => {
                    world
                        .chunks
                        .insert_queued(coord, self.lod_table.select(distance), tick);
                    queue.push(coord, distance);
                    report.queued += 1;
                }
                // Re-prioritize against the new center.
                ChunkState::Queued => queue.push(coord, distance),
                ChunkState::Loading | ChunkState::Ready => {}
            }
        }
    }

    fn enforce_residency_cap(&self, world: &mut WorldContext, report: &mut LifecycleReport) {
        let victims = select_lru_evictions(world.chunks.resident(), self.max_resident);
        for coord in victims {
            world.unload(coord);
            world.counters.evicted += 1;
            report.evicted_lru += 1;
        }
        if report.evicted_lru > 0 {
            tracing::debug!(
                evicted = report.evicted_lru,
                cap = self.max_resident,
                "residency cap enforced"
            );
        }
    }
}
