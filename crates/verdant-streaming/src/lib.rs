//! Chunk streaming: keeps the terrain and vegetation around a moving
//! viewpoint generated, instanced and bounded in memory.
//!
//! [`StreamingEngine`] is the entry point. Each tick the
//! [`LifecycleManager`] decides which chunks should exist and evicts the rest,
//! then the [`LoadScheduler`] generates queued chunks nearest-first on a
//! [`GenerationBackend`] and finalizes finished ones into the instance sink.

mod backend;
mod chunk;
mod engine;
mod error;
mod finalize;
mod generation;
mod lifecycle;
mod scheduler;
mod world;

pub use backend::{BackendKind, GenerationBackend, InlineBackend, WorkerBackend, create_backend};
pub use chunk::{ChunkRecord, ChunkRegistry, ChunkState, StateCounts};
pub use engine::{FrameReport, StreamingEngine, StreamingStats};
pub use error::StreamingError;
pub use finalize::{FinalizeOutcome, FinalizeSummary};
pub use generation::{ChunkPlan, GenerationJob, generate_plan};
pub use lifecycle::{LifecycleManager, LifecycleReport};
pub use scheduler::{LoadScheduler, SchedulerReport};
pub use world::{StreamingCounters, WorldContext};
