//! In-memory mesh catalog with optional simulated latency.
//!
//! Meshes come from a RON manifest or are registered directly. With a
//! non-zero latency, a requested id stays `Pending` for that many frames
//! after its first request, which exercises the engine's deferral path the
//! same way a slow disk or network would.

use std::path::Path;
use std::task::Poll;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{AssetError, AssetProvider, ManifestError, MeshHandle};

/// Top-level RON manifest for a mesh catalog.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetManifest {
    /// Frames a request stays pending before it resolves.
    pub latency_frames: u32,
    /// Mesh entries.
    pub meshes: Vec<MeshHandle>,
}

/// Mesh provider backed by an in-memory table.
#[derive(Debug, Default)]
pub struct CatalogAssetProvider {
    meshes: HashMap<String, MeshHandle>,
    latency_frames: u32,
    frame: u64,
    /// Frame at which each outstanding id was first requested.
    requested: HashMap<String, u64>,
}

impl CatalogAssetProvider {
    /// Empty catalog that resolves immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with a [`MeshHandle::placeholder`] for every id.
    pub fn with_placeholders<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut catalog = Self::new();
        for id in ids {
            catalog.insert(MeshHandle::placeholder(id));
        }
        catalog
    }

    /// Set the simulated latency.
    pub fn with_latency(mut self, frames: u32) -> Self {
        self.latency_frames = frames;
        self
    }

    /// Build from a parsed manifest.
    ///
    /// # Errors
    ///
    /// [`ManifestError::DuplicateId`] if two meshes share an id.
    pub fn from_manifest(manifest: AssetManifest) -> Result<Self, ManifestError> {
        let mut catalog = Self::new().with_latency(manifest.latency_frames);
        for mesh in manifest.meshes {
            let id = mesh.id.clone();
            if catalog.insert(mesh).is_some() {
                return Err(ManifestError::DuplicateId(id));
            }
        }
        Ok(catalog)
    }

    /// Parse a RON manifest string.
    ///
    /// # Errors
    ///
    /// Returns a [`ManifestError`] on malformed RON or duplicate ids.
    pub fn from_ron_str(source: &str) -> Result<Self, ManifestError> {
        let manifest: AssetManifest = ron::from_str(source)?;
        Self::from_manifest(manifest)
    }

    /// Load a RON manifest from disk.
    ///
    /// # Errors
    ///
    /// Returns a [`ManifestError`] on I/O failure, malformed RON or
    /// duplicate ids.
    pub fn load_manifest(path: &Path) -> Result<Self, ManifestError> {
        let source = std::fs::read_to_string(path)?;
        let catalog = Self::from_ron_str(&source)?;
        tracing::info!(path = %path.display(), meshes = catalog.len(), "asset manifest loaded");
        Ok(catalog)
    }

    /// Register a mesh, returning any mesh previously registered under its id.
    pub fn insert(&mut self, mesh: MeshHandle) -> Option<MeshHandle> {
        self.meshes.insert(mesh.id.clone(), mesh)
    }

    /// Whether an id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.meshes.contains_key(id)
    }

    /// Number of registered meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Current frame counter.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn resolve(&self, id: &str) -> Result<MeshHandle, AssetError> {
        self.meshes
            .get(id)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(id.to_string()))
    }
}

impl AssetProvider for CatalogAssetProvider {
    fn poll_mesh(&mut self, id: &str) -> Poll<Result<MeshHandle, AssetError>> {
        if self.latency_frames == 0 {
            return Poll::Ready(self.resolve(id));
        }
        let frame = self.frame;
        let first = *self.requested.entry(id.to_string()).or_insert(frame);
        if frame - first < u64::from(self.latency_frames) {
            return Poll::Pending;
        }
        self.requested.remove(id);
        Poll::Ready(self.resolve(id))
    }

    fn begin_frame(&mut self) {
        self.frame += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_lookup() {
        let mut catalog = CatalogAssetProvider::with_placeholders(["tree_oak"]);
        assert!(matches!(
            catalog.poll_mesh("tree_oak"),
            Poll::Ready(Ok(mesh)) if mesh.id == "tree_oak"
        ));
    }

    #[test]
    fn test_missing_asset_is_not_found() {
        let mut catalog = CatalogAssetProvider::new();
        assert_eq!(
            catalog.poll_mesh("ghost"),
            Poll::Ready(Err(AssetError::NotFound("ghost".to_string())))
        );
    }

    #[test]
    fn test_latency_defers_for_frames() {
        let mut catalog = CatalogAssetProvider::with_placeholders(["rock"]).with_latency(2);
        assert!(catalog.poll_mesh("rock").is_pending());
        assert!(catalog.poll_mesh("rock").is_pending(), "same frame stays pending");
        catalog.begin_frame();
        assert!(catalog.poll_mesh("rock").is_pending());
        catalog.begin_frame();
        assert!(catalog.poll_mesh("rock").is_ready());
        assert!(
            catalog.poll_mesh("rock").is_pending(),
            "a fresh request waits again"
        );
    }

    #[test]
    fn test_manifest_parsing() {
        let source = r#"(
            latency_frames: 1,
            meshes: [
                (id: "tree_oak", vertex_count: 120, index_count: 300, bounding_radius: 4.0,
                 material: (name: "bark", base_color: (0.4, 0.3, 0.2, 1.0))),
                (id: "rock_small", vertex_count: 8, index_count: 36, bounding_radius: 0.5),
            ],
        )"#;
        let catalog = CatalogAssetProvider::from_ron_str(source).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("rock_small"));
        assert_eq!(catalog.latency_frames, 1);
    }

    #[test]
    fn test_manifest_duplicate_rejected() {
        let source = r#"(meshes: [
            (id: "a", vertex_count: 1, index_count: 3, bounding_radius: 1.0),
            (id: "a", vertex_count: 1, index_count: 3, bounding_radius: 1.0),
        ])"#;
        assert!(matches!(
            CatalogAssetProvider::from_ron_str(source),
            Err(ManifestError::DuplicateId(id)) if id == "a"
        ));
    }

    #[test]
    fn test_load_manifest_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.ron");
        let manifest = AssetManifest {
            latency_frames: 0,
            meshes: vec![MeshHandle::placeholder("bush_round")],
        };
        std::fs::write(&path, ron::to_string(&manifest).unwrap()).unwrap();
        let catalog = CatalogAssetProvider::load_manifest(&path).unwrap();
        assert!(catalog.contains("bush_round"));
    }

    #[test]
    fn test_load_manifest_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CatalogAssetProvider::load_manifest(&dir.path().join("nope.ron")),
            Err(ManifestError::Io(_))
        ));
    }
}
