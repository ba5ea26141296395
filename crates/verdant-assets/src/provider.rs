use std::task::Poll;

use crate::{AssetError, MeshHandle};

/// Source of meshes for the streaming engine.
///
/// `poll_mesh` is a suspension point: `Pending` means "not yet, ask again
/// next frame". Errors are recoverable; the engine skips the placement that
/// needed the asset.
pub trait AssetProvider {
    /// Request a mesh by id.
    fn poll_mesh(&mut self, id: &str) -> Poll<Result<MeshHandle, AssetError>>;

    /// Called once at the start of every engine tick.
    fn begin_frame(&mut self) {}
}

impl<P: AssetProvider + ?Sized> AssetProvider for Box<P> {
    fn poll_mesh(&mut self, id: &str) -> Poll<Result<MeshHandle, AssetError>> {
        (**self).poll_mesh(id)
    }

    fn begin_frame(&mut self) {
        (**self).begin_frame();
    }
}
