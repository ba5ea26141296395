//! Instance placement: fixed-capacity transform pools for batched drawing,
//! a discrete per-object fallback, and the [`InstanceSink`] contract that
//! makes the two interchangeable.

mod arena;
mod batch;
mod capabilities;
mod discrete;
mod error;
mod handle;
mod layout;
mod pool;
mod pooled;
mod sink;
mod transform;

pub use arena::{NodeArena, NodeId, SceneNode};
pub use batch::InstanceBatch;
pub use capabilities::{RendererCapabilities, SinkMode, choose_mode, create_sink};
pub use discrete::DiscreteSink;
pub use error::InstanceError;
pub use handle::{AssetTypeId, InstanceHandle};
pub use layout::PoolLayout;
pub use pool::InstancePool;
pub use pooled::PooledSink;
pub use sink::{InstanceSink, PoolUsage};
pub use transform::InstanceTransform;
