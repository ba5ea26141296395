use thiserror::Error;

/// Errors returned by asset lookups. Always recoverable for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// No asset with this id exists.
    #[error("asset not found: {0}")]
    NotFound(String),
}

/// Errors loading an asset manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// I/O error reading the manifest file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// RON deserialization error.
    #[error("ron parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// Two meshes share an id.
    #[error("duplicate mesh id: {0}")]
    DuplicateId(String),
}
