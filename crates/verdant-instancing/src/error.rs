use thiserror::Error;

/// Errors from instance sinks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    /// The pool for this asset type is full. Recoverable: skip the placement.
    #[error("instance pool for {asset} is full ({capacity} slots)")]
    PoolOverflow {
        /// Asset type name.
        asset: String,
        /// Pool capacity.
        capacity: u32,
    },
    /// No pool was registered for the asset type.
    #[error("unknown asset type: {0}")]
    UnknownAssetType(String),
    /// The handle's slot was already released or reused.
    #[error("stale instance handle")]
    StaleHandle,
}
