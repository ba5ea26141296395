//! Asset provider contract and in-memory providers.
//!
//! The streaming engine asks for meshes by id and gets back a typed
//! [`MeshHandle`]. Lookups may take several frames; a provider signals that
//! with [`std::task::Poll::Pending`] and the caller retries next frame.

mod caching;
mod catalog;
mod error;
mod mesh;
mod provider;

pub use caching::CachingAssetProvider;
pub use catalog::{AssetManifest, CatalogAssetProvider};
pub use error::{AssetError, ManifestError};
pub use mesh::{MaterialDesc, MeshHandle};
pub use provider::AssetProvider;
