//! Per-chunk bookkeeping: lifecycle state, LOD, owned instance handles.

use hashbrown::HashMap;
use verdant_instancing::InstanceHandle;
use verdant_lod::{ChunkCoord, ResidentChunk};
use verdant_terrain::{BiomeId, PlacementPoint};

/// Where a chunk is in its lifecycle.
///
/// `Unloaded` is never stored: a chunk without a record is unloaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// No record exists.
    Unloaded,
    /// Waiting in the load queue.
    Queued,
    /// Dispatched for generation or waiting to be finalized.
    Loading,
    /// Instances placed.
    Ready,
}

/// Everything the engine tracks about one chunk.
#[derive(Clone, Debug)]
pub struct ChunkRecord {
    /// Grid coordinate.
    pub coord: ChunkCoord,
    /// Current state. Never [`ChunkState::Unloaded`].
    pub state: ChunkState,
    /// LOD the resident content was generated at. `None` until ready.
    pub lod: Option<u8>,
    /// LOD the chunk should have at its current distance.
    pub target_lod: u8,
    /// Tick the chunk was last within the view radius.
    pub last_access: u64,
    /// Instances this chunk owns.
    pub handles: Vec<InstanceHandle>,
    /// Biome at the chunk center, once generated.
    pub center_biome: Option<BiomeId>,
    /// Vegetation placements of the resident content.
    pub placements: Vec<PlacementPoint>,
    /// Ground tiles of the resident content.
    pub tile_count: usize,
}

impl ChunkRecord {
    fn queued(coord: ChunkCoord, target_lod: u8, tick: u64) -> Self {
        Self {
            coord,
            state: ChunkState::Queued,
            lod: None,
            target_lod,
            last_access: tick,
            handles: Vec::new(),
            center_biome: None,
            placements: Vec::new(),
            tile_count: 0,
        }
    }

    /// Whether the resident content is at a different LOD than wanted.
    pub fn needs_regeneration(&self) -> bool {
        self.state == ChunkState::Ready && self.lod != Some(self.target_lod)
    }
}

/// Counts of records per state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StateCounts {
    /// Queued chunks.
    pub queued: usize,
    /// Loading chunks.
    pub loading: usize,
    /// Ready chunks.
    pub ready: usize,
}

/// All chunk records, keyed by coordinate.
#[derive(Debug, Default)]
pub struct ChunkRegistry {
    records: HashMap<ChunkCoord, ChunkRecord>,
}

impl ChunkRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `Queued` record. Returns `false` if the chunk already has one.
    pub fn insert_queued(&mut self, coord: ChunkCoord, target_lod: u8, tick: u64) -> bool {
        if self.records.contains_key(&coord) {
            return false;
        }
        self.records
            .insert(coord, ChunkRecord::queued(coord, target_lod, tick));
        tracing::trace!(%coord, "chunk Unloaded -> Queued");
        true
    }

    /// Look up a record.
    pub fn get(&self, coord: ChunkCoord) -> Option<&ChunkRecord> {
        self.records.get(&coord)
    }

    /// Look up a record mutably.
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut ChunkRecord> {
        self.records.get_mut(&coord)
    }

    /// Drop a record, returning it.
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<ChunkRecord> {
        let record = self.records.remove(&coord)?;
        tracing::trace!(%coord, from = ?record.state, "chunk -> Unloaded");
        Some(record)
    }

    /// State of a chunk, `Unloaded` if there is no record.
    pub fn state(&self, coord: ChunkCoord) -> ChunkState {
        self.records
            .get(&coord)
            .map_or(ChunkState::Unloaded, |r| r.state)
    }

    /// Iterate over every record.
    pub fn iter(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.records.values()
    }

    /// Iterate mutably over every record.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ChunkRecord> {
        self.records.values_mut()
    }

    /// Coordinates of every record in a given state, sorted.
    pub fn coords_in_state(&self, state: ChunkState) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self
            .records
            .values()
            .filter(|r| r.state == state)
            .map(|r| r.coord)
            .collect();
        coords.sort();
        coords
    }

    /// Ready chunks with their last access tick, for LRU selection.
    pub fn resident(&self) -> impl Iterator<Item = ResidentChunk> + '_ {
        self.records
            .values()
            .filter(|r| r.state == ChunkState::Ready)
            .map(|r| ResidentChunk {
                coord: r.coord,
                last_access: r.last_access,
            })
    }

    /// Records per state.
    pub fn counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for record in self.records.values() {
            match record.state {
                ChunkState::Queued => counts.queued += 1,
                ChunkState::Loading => counts.loading += 1,
                ChunkState::Ready => counts.ready += 1,
                ChunkState::Unloaded => {}
            }
        }
        counts
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_record_is_unloaded() {
        let registry = ChunkRegistry::new();
        assert_eq!(registry.state(ChunkCoord::new(3, 3)), ChunkState::Unloaded);
    }

    #[test]
    fn test_insert_queued_once() {
        let mut registry = ChunkRegistry::new();
        let c = ChunkCoord::new(1, -1);
        assert!(registry.insert_queued(c, 0, 5));
        assert!(!registry.insert_queued(c, 2, 6), "second insert must not replace");
        let record = registry.get(c).unwrap();
        assert_eq!(record.state, ChunkState::Queued);
        assert_eq!(record.target_lod, 0);
        assert_eq!(record.last_access, 5);
        assert_eq!(record.lod, None);
    }

    #[test]
    fn test_counts_and_sorted_coords() {
        let mut registry = ChunkRegistry::new();
        for x in [2, 0, 1] {
            registry.insert_queued(ChunkCoord::new(x, 0), 0, 0);
        }
        registry.get_mut(ChunkCoord::new(1, 0)).unwrap().state = ChunkState::Ready;
        registry.get_mut(ChunkCoord::new(2, 0)).unwrap().state = ChunkState::Loading;

        assert_eq!(
            registry.counts(),
            StateCounts {
                queued: 1,
                loading: 1,
                ready: 1
            }
        );
        assert_eq!(
            registry.coords_in_state(ChunkState::Ready),
            vec![ChunkCoord::new(1, 0)]
        );
        assert_eq!(registry.resident().count(), 1);
    }

    #[test]
    fn test_remove_unloads() {
        let mut registry = ChunkRegistry::new();
        let c = ChunkCoord::ORIGIN;
        registry.insert_queued(c, 0, 0);
        assert!(registry.remove(c).is_some());
        assert!(registry.remove(c).is_none());
        assert_eq!(registry.state(c), ChunkState::Unloaded);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_needs_regeneration_only_when_ready() {
        let mut registry = ChunkRegistry::new();
        let c = ChunkCoord::ORIGIN;
        registry.insert_queued(c, 1, 0);
        let record = registry.get_mut(c).unwrap();
        assert!(!record.needs_regeneration());
        record.state = ChunkState::Ready;
        record.lod = Some(0);
        assert!(record.needs_regeneration());
        record.lod = Some(1);
        assert!(!record.needs_regeneration());
    }
}
