//! Chunk grid and level-of-detail bookkeeping: coordinates, ring
//! enumeration, distance-based LOD selection, nearest-first load ordering
//! and LRU residency.

mod chunk_coord;
mod priority_queue;
mod residency;
mod selector;

pub use chunk_coord::{ChunkCoord, chunks_in_radius};
pub use priority_queue::{LoadQueue, LoadRequest};
pub use residency::{ResidentChunk, select_lru_evictions};
pub use selector::{LodTable, LodTableError};
