//! Turning a generated plan into placed instances.
//!
//! Runs on the owning thread only. Asset lookups are polled first; if any is
//! still pending the whole chunk waits for the next tick, so a chunk never
//! ends up half placed. Lookup failures and full pools drop placements, never
//! the chunk.

use std::task::Poll;

use glam::Vec3;
use hashbrown::{HashMap, HashSet};
use verdant_assets::MeshHandle;
use verdant_instancing::{AssetTypeId, InstanceHandle, InstanceTransform};
use verdant_lod::ChunkCoord;

use crate::chunk::ChunkState;
use crate::error::StreamingError;
use crate::generation::ChunkPlan;
use crate::world::WorldContext;

/// Result of one finalization attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// The chunk is `Ready`.
    Ready(FinalizeSummary),
    /// An asset is still loading; try again next tick.
    Deferred,
    /// The chunk is no longer `Loading`; the plan was dropped.
    Discarded,
}

/// What finalizing one chunk placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FinalizeSummary {
    /// Instances placed.
    pub instances: usize,
    /// Placements skipped for missing assets or full pools.
    pub skipped: usize,
    /// Triangles across every placed instance.
    pub triangles: u64,
}

#[derive(Clone, Copy)]
struct Resolved {
    asset: AssetTypeId,
    triangles: u32,
}

/// Finalize a plan against the world.
pub(crate) fn finalize_plan(world: &mut WorldContext, plan: &ChunkPlan) -> FinalizeOutcome {
    let coord = plan.coord;
    if world.chunks.state(coord) != ChunkState::Loading {
        tracing::debug!(%coord, "dropping plan for chunk that is no longer loading");
        return FinalizeOutcome::Discarded;
    }

    let Poll::Ready(meshes) = poll_assets(world, plan) else {
        world.counters.deferred += 1;
        tracing::trace!(%coord, "assets pending, finalization deferred");
        return FinalizeOutcome::Deferred;
    };

    let resolved = resolve_asset_types(world, coord, meshes);
    let mut placer = Placer {
        coord,
        resolved,
        overflowed: HashSet::new(),
        handles: Vec::new(),
        summary: FinalizeSummary::default(),
    };

    let content = &plan.content;
    let base_tile = world.terrain.tile_size();
    for tile in &content.tiles.tiles {
        let position = Vec3::new(tile.center.x as f32, tile.height as f32, tile.center.y as f32);
        let scale = (tile.size / base_tile) as f32;
        placer.place(
            world,
            &content.tiles.ground,
            InstanceTransform::from_placement(position, 0.0, scale),
        );
        if tile.covered
            && let Some(cover) = &content.tiles.cover
        {
            placer.place(
                world,
                cover,
                InstanceTransform::from_placement(position, 0.0, 1.0),
            );
        }
    }
    for point in &content.placements {
        let position = Vec3::new(
            point.position.x as f32,
            point.height as f32,
            point.position.y as f32,
        );
        placer.place(
            world,
            &point.asset,
            InstanceTransform::from_placement(position, point.rotation as f32, point.scale as f32),
        );
    }

    let Placer {
        handles, summary, ..
    } = placer;
    let tick = world.tick;
    if let Some(record) = world.chunks.get_mut(coord) {
        record.state = ChunkState::Ready;
        record.lod = Some(content.lod);
        record.handles = handles;
        record.center_biome = Some(content.center_biome);
        record.placements = content.placements.clone();
        record.tile_count = content.tiles.tiles.len();
        record.last_access = tick;
    }
    world.counters.finalized += 1;

    tracing::trace!(
        %coord,
        lod = content.lod,
        instances = summary.instances,
        skipped = summary.skipped,
        "chunk Loading -> Ready"
    );
    FinalizeOutcome::Ready(summary)
}

/// Poll every asset the plan needs. Pending if any lookup is.
///
/// Every id is polled even after one reports pending so all requests start
/// in the same frame.
fn poll_assets(
    world: &mut WorldContext,
    plan: &ChunkPlan,
) -> Poll<HashMap<String, Result<MeshHandle, StreamingError>>> {
    let mut meshes = HashMap::new();
    let mut pending = false;
    for id in plan.asset_ids() {
        match world.assets.poll_mesh(id) {
            Poll::Pending => pending = true,
            Poll::Ready(result) => {
                meshes.insert(id.to_string(), result.map_err(StreamingError::from));
            }
        }
    }
    if pending {
        Poll::Pending
    } else {
        Poll::Ready(meshes)
    }
}

fn resolve_asset_types(
    world: &mut WorldContext,
    coord: ChunkCoord,
    meshes: HashMap<String, Result<MeshHandle, StreamingError>>,
) -> HashMap<String, Option<Resolved>> {
    let mut resolved = HashMap::with_capacity(meshes.len());
    for (id, mesh) in meshes {
        let entry = match mesh {
            Ok(mesh) => match world.sink.asset_type(&id) {
                Some(asset) => Some(Resolved {
                    asset,
                    triangles: mesh.triangle_count(),
                }),
                None => {
                    world.counters.asset_failures += 1;
                    tracing::warn!(
                        %coord,
                        asset = %id,
                        "asset has no instance pool, skipping its placements"
                    );
                    None
                }
            },
            Err(error) => {
                world.counters.asset_failures += 1;
                tracing::warn!(
                    %coord,
                    %error,
                    "asset lookup failed, skipping its placements"
                );
                None
            }
        };
        resolved.insert(id, entry);
    }
    resolved
}

struct Placer {
    coord: ChunkCoord,
    resolved: HashMap<String, Option<Resolved>>,
    overflowed: HashSet<AssetTypeId>,
    handles: Vec<InstanceHandle>,
    summary: FinalizeSummary,
}

impl Placer {
    fn place(&mut self, world: &mut WorldContext, id: &str, transform: InstanceTransform) {
        let Some(Some(Resolved { asset, triangles })) = self.resolved.get(id).copied() else {
            self.summary.skipped += 1;
            return;
        };
        if self.overflowed.contains(&asset) {
            self.summary.skipped += 1;
            return;
        }
        match world.sink.acquire(asset, transform) {
            Ok(handle) => {
                self.handles.push(handle);
                self.summary.instances += 1;
                self.summary.triangles += u64::from(triangles);
            }
            Err(err) => {
                self.summary.skipped += 1;
                let error = StreamingError::from(err);
                if matches!(error, StreamingError::PoolOverflow { .. }) {
                    world.counters.pool_overflows += 1;
                }
                tracing::warn!(
                    coord = %self.coord,
                    %error,
                    "instance placement failed, skipping further placements of this asset"
                );
                self.overflowed.insert(asset);
            }
        }
    }
}
