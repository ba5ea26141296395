//! Load scheduler: drains the nearest-first queue into a bounded number of
//! in-flight generations and finalizes finished plans a few at a time.
//!
//! A tick collects finished plans, finalizes at most `yield_every` of them,
//! then tops up in-flight generations to `max_concurrent`. Whatever is left
//! over waits for the next tick, which bounds the work done per frame.

use std::collections::VecDeque;
use std::time::Duration;

use verdant_config::StreamingConfig;
use verdant_lod::LoadQueue;

use crate::backend::{BackendKind, GenerationBackend};
use crate::chunk::ChunkState;
use crate::finalize::{FinalizeOutcome, finalize_plan};
use crate::generation::{ChunkPlan, GenerationJob};
use crate::world::WorldContext;

/// What one scheduler tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    /// Jobs handed to the backend.
    pub dispatched: usize,
    /// Chunks that reached `Ready`.
    pub finalized: usize,
    /// Plans put back because an asset was pending.
    pub deferred: usize,
    /// Plans dropped because their chunk was no longer loading.
    pub discarded: usize,
    /// Plans from before the last reset.
    pub stale: usize,
    /// Instances placed.
    pub instances: usize,
    /// Placements skipped.
    pub skipped: usize,
    /// Whether finished plans were left for the next tick.
    pub yielded: bool,
}

/// Owns the load queue and the generation backend.
pub struct LoadScheduler {
    queue: LoadQueue,
    backend: Box<dyn GenerationBackend>,
    max_concurrent: usize,
    yield_every: usize,
    /// Chunks in `Loading`: dispatched, or generated and awaiting finalization.
    in_flight: usize,
    awaiting: VecDeque<ChunkPlan>,
    epoch: u64,
}

impl LoadScheduler {
    /// Create a scheduler around a backend.
    pub fn new(config: &StreamingConfig, backend: Box<dyn GenerationBackend>) -> Self {
        Self {
            queue: LoadQueue::new(),
            backend,
            max_concurrent: config.max_concurrent.max(1),
            yield_every: config.yield_every.max(1),
            in_flight: 0,
            awaiting: VecDeque::new(),
            epoch: 0,
        }
    }

    /// The load queue.
    pub fn queue(&self) -> &LoadQueue {
        &self.queue
    }

    /// The load queue, for the lifecycle manager.
    pub fn queue_mut(&mut self) -> &mut LoadQueue {
        &mut self.queue
    }

    /// Which backend generates chunks.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Chunks currently loading.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Generated plans waiting for finalization.
    pub fn awaiting(&self) -> usize {
        self.awaiting.len()
    }

    /// Current world epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Nothing queued and nothing loading.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.in_flight == 0
    }

    /// Drop all pending work. Plans already being generated come back
    /// tagged with the old epoch and are ignored.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.awaiting.clear();
        self.in_flight = 0;
        self.epoch += 1;
    }

    /// Run one tick.
    pub fn tick(&mut self, world: &mut WorldContext) -> SchedulerReport {
        let mut report = SchedulerReport::default();
        let finished = self.backend.drain();
        self.accept(finished, &mut report);
        self.finalize_some(world, &mut report);
        self.dispatch(world, &mut report);

        if report.dispatched + report.finalized > 0 {
            tracing::debug!(
                dispatched = report.dispatched,
                finalized = report.finalized,
                deferred = report.deferred,
                in_flight = self.in_flight,
                queued = self.queue.len(),
                yielded = report.yielded,
                "scheduler tick"
            );
        }
        report
    }

    /// Block up to `timeout` for a worker result when nothing is ready to
    /// finalize. Returns `true` if a plan arrived.
    pub fn wait_for_plan(&mut self, timeout: Duration) -> bool {
        if !self.awaiting.is_empty() || self.in_flight == 0 {
            return false;
        }
        match self.backend.wait(timeout) {
            Some(plan) => {
                let mut report = SchedulerReport::default();
                self.accept(vec![plan], &mut report);
                report.stale == 0
            }
            None => false,
        }
    }

    fn accept(&mut self, plans: Vec<ChunkPlan>, report: &mut SchedulerReport) {
        for plan in plans {
            if plan.epoch == self.epoch {
                self.awaiting.push_back(plan);
            } else {
                report.stale += 1;
                tracing::trace!(
                    coord = %plan.coord,
                    epoch = plan.epoch,
                    "discarding plan from before reset"
                );
            }
        }
    }

    fn finalize_some(&mut self, world: &mut WorldContext, report: &mut SchedulerReport) {
        let mut retry = VecDeque::new();
        while report.finalized < self.yield_every {
            let Some(plan) = self.awaiting.pop_front() else {
                break;
            };
            match finalize_plan(world, &plan) {
                FinalizeOutcome::Ready(summary) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    report.finalized += 1;
                    report.instances += summary.instances;
                    report.skipped += summary.skipped;
                }
                FinalizeOutcome::Deferred => {
                    report.deferred += 1;
                    retry.push_back(plan);
                }
                FinalizeOutcome::Discarded => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    report.discarded += 1;
                }
            }
        }
        report.yielded = !self.awaiting.is_empty();
        self.awaiting.extend(retry);
    }

    fn dispatch(&mut self, world: &mut WorldContext, report: &mut SchedulerReport) {
        while self.in_flight < self.max_concurrent {
            let Some(request) = self.queue.pop() else {
                break;
            };
            let Some(record) = world.chunks.get_mut(request.coord) else {
                continue;
            };
            if record.state != ChunkState::Queued {
                continue;
            }
            let job = GenerationJob {
                coord: request.coord,
                lod: record.target_lod,
                epoch: self.epoch,
            };
            record.state = ChunkState::Loading;

            match self.backend.dispatch(job) {
                Ok(()) => {
                    self.in_flight += 1;
                    report.dispatched += 1;
                    tracing::trace!(
                        coord = %job.coord,
                        lod = job.lod,
                        "chunk Queued -> Loading"
                    );
                }
                Err(job) => {
                    // Backend saturated; retry next tick.
                    if let Some(record) = world.chunks.get_mut(job.coord) {
                        record.state = ChunkState::Queued;
                    }
                    self.queue.push(job.coord, request.distance);
                    break;
                }
            }
        }
    }
}

impl std::fmt::Debug for LoadScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadScheduler")
            .field("backend", &self.backend.kind())
            .field("queued", &self.queue.len())
            .field("in_flight", &self.in_flight)
            .field("awaiting", &self.awaiting.len())
            .field("epoch", &self.epoch)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use verdant_assets::CatalogAssetProvider;
    use verdant_config::Config;
    use verdant_instancing::{PoolLayout, PooledSink};
    use verdant_lod::ChunkCoord;
    use verdant_terrain::TerrainGenerator;

    use crate::backend::InlineBackend;

    fn setup(max_concurrent: usize, yield_every: usize) -> (WorldContext, LoadScheduler) {
        let config = Config::default();
        let terrain = Arc::new(TerrainGenerator::from_config(&config).unwrap());
        let ids = terrain.asset_ids();
        let layout =
            PoolLayout::from_config(&config.instancing, ids.iter().map(String::as_str));
        let world = WorldContext::new(
            Arc::clone(&terrain),
            Box::new(PooledSink::new(layout)),
            Box::new(CatalogAssetProvider::with_placeholders(
                ids.iter().map(String::as_str),
            )),
        );
        let streaming = StreamingConfig {
            max_concurrent,
            yield_every,
            ..Default::default()
        };
        let scheduler = LoadScheduler::new(&streaming, Box::new(InlineBackend::new(terrain)));
        (world, scheduler)
    }

    fn enqueue(world: &mut WorldContext, scheduler: &mut LoadScheduler, coords: &[(i32, i32)]) {
        for &(x, z) in coords {
            let coord = ChunkCoord::new(x, z);
            let distance = coord.chebyshev(ChunkCoord::ORIGIN);
            world.chunks.insert_queued(coord, 2, 0);
            scheduler.queue_mut().push(coord, distance);
        }
    }

    #[test]
    fn test_dispatch_respects_concurrency_cap() {
        let (mut world, mut scheduler) = setup(2, 3);
        enqueue(&mut world, &mut scheduler, &[(0, 0), (1, 0), (2, 0), (3, 0)]);

        let report = scheduler.tick(&mut world);
        assert_eq!(report.dispatched, 2);
        assert_eq!(scheduler.in_flight(), 2);
        assert_eq!(world.chunks.counts().loading, 2);
        assert_eq!(world.chunks.counts().queued, 2);
        // Nearest first.
        assert_eq!(world.chunks.state(ChunkCoord::ORIGIN), ChunkState::Loading);
        assert_eq!(world.chunks.state(ChunkCoord::new(3, 0)), ChunkState::Queued);
    }

    #[test]
    fn test_finalization_yields_after_budget() {
        let (mut world, mut scheduler) = setup(8, 3);
        let coords: Vec<(i32, i32)> = (0..5).map(|x| (x, 0)).collect();
        enqueue(&mut world, &mut scheduler, &coords);

        let first = scheduler.tick(&mut world);
        assert_eq!(first.dispatched, 5);
        assert_eq!(first.finalized, 0);

        let second = scheduler.tick(&mut world);
        assert_eq!(second.finalized, 3, "at most yield_every chunks per tick");
        assert!(second.yielded);

        let third = scheduler.tick(&mut world);
        assert_eq!(third.finalized, 2);
        assert!(!third.yielded);
        assert!(scheduler.is_idle());
        assert_eq!(world.chunks.counts().ready, 5);
    }

    #[test]
    fn test_generates_at_target_lod() {
        let (mut world, mut scheduler) = setup(4, 4);
        enqueue(&mut world, &mut scheduler, &[(0, 0)]);
        world.chunks.get_mut(ChunkCoord::ORIGIN).unwrap().target_lod = 3;
        scheduler.tick(&mut world);
        scheduler.tick(&mut world);
        assert_eq!(world.chunks.get(ChunkCoord::ORIGIN).unwrap().lod, Some(3));
    }

    #[test]
    fn test_reset_discards_stale_plans() {
        let (mut world, mut scheduler) = setup(4, 4);
        enqueue(&mut world, &mut scheduler, &[(0, 0), (1, 1)]);
        scheduler.tick(&mut world);
        assert_eq!(scheduler.in_flight(), 2);

        scheduler.reset();
        world.clear();
        let report = scheduler.tick(&mut world);
        assert_eq!(report.stale, 2);
        assert_eq!(report.finalized, 0);
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.epoch(), 1);
    }

    #[test]
    fn test_skips_requests_without_queued_record() {
        let (mut world, mut scheduler) = setup(4, 4);
        enqueue(&mut world, &mut scheduler, &[(0, 0)]);
        world.chunks.remove(ChunkCoord::ORIGIN);
        let report = scheduler.tick(&mut world);
        assert_eq!(report.dispatched, 0);
        assert!(scheduler.is_idle());
    }
}
