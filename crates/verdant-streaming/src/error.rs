//! Streaming error taxonomy.

use verdant_assets::AssetError;
use verdant_config::ConfigError;
use verdant_instancing::InstanceError;
use verdant_lod::{ChunkCoord, LodTableError};
use verdant_terrain::BiomeRegistryError;

/// Everything that can go wrong while streaming.
///
/// Only [`StreamingError::InvalidConfig`] is fatal, and only at engine
/// construction. The rest are raised while finalizing a chunk, logged, and
/// absorbed: the chunk still reaches `Ready`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamingError {
    /// The asset provider does not know this mesh id.
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// An asset type's instance pool is full.
    #[error("instance pool for {asset} is full ({capacity} instances)")]
    PoolOverflow { asset: String, capacity: u32 },

    /// A queued chunk left the unload radius before generation started.
    #[error("generation of chunk {0} cancelled")]
    GenerationCancelled(ChunkCoord),

    /// Rejected at startup.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A handle no longer refers to a live instance.
    #[error("stale instance handle")]
    StaleHandle,

    /// A generation worker thread could not be started.
    #[error("failed to start generation worker: {0}")]
    WorkerSpawn(String),
}

impl StreamingError {
    /// Whether the error aborts startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::WorkerSpawn(_))
    }
}

impl From<ConfigError> for StreamingError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid(msg) => Self::InvalidConfig(msg),
            other => Self::InvalidConfig(other.to_string()),
        }
    }
}

impl From<BiomeRegistryError> for StreamingError {
    fn from(err: BiomeRegistryError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

impl From<LodTableError> for StreamingError {
    fn from(err: LodTableError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

impl From<AssetError> for StreamingError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::NotFound(id) => Self::AssetNotFound(id),
        }
    }
}

impl From<InstanceError> for StreamingError {
    fn from(err: InstanceError) -> Self {
        match err {
            InstanceError::PoolOverflow { asset, capacity } => {
                Self::PoolOverflow { asset, capacity }
            }
            InstanceError::UnknownAssetType(id) => Self::AssetNotFound(id),
            InstanceError::StaleHandle => Self::StaleHandle,
        }
    }
}
