//! The contract between the streaming engine and whatever draws instances.

use crate::{AssetTypeId, InstanceError, InstanceHandle, InstanceTransform, SinkMode};

/// Live and capacity counts for one asset type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolUsage {
    /// Asset name.
    pub name: String,
    /// Live instances.
    pub live: u32,
    /// Capacity.
    pub capacity: u32,
}

/// Receives finalized placements.
///
/// Implementations enforce the same capacity per asset type, so callers
/// behave identically whichever one was selected at startup.
pub trait InstanceSink {
    /// Which implementation this is.
    fn mode(&self) -> SinkMode;

    /// Resolve an asset name.
    fn asset_type(&self, name: &str) -> Option<AssetTypeId>;

    /// Place an instance.
    ///
    /// # Errors
    ///
    /// [`InstanceError::PoolOverflow`] when the asset type is at capacity,
    /// [`InstanceError::UnknownAssetType`] for an unregistered id.
    fn acquire(
        &mut self,
        asset: AssetTypeId,
        transform: InstanceTransform,
    ) -> Result<InstanceHandle, InstanceError>;

    /// Remove an instance.
    ///
    /// # Errors
    ///
    /// [`InstanceError::StaleHandle`] if it was already released.
    fn release(&mut self, handle: InstanceHandle) -> Result<(), InstanceError>;

    /// Transform of a live instance.
    fn transform(&self, handle: InstanceHandle) -> Option<InstanceTransform>;

    /// Remove every instance of one asset type.
    ///
    /// # Errors
    ///
    /// [`InstanceError::UnknownAssetType`] for an unregistered id.
    fn clear(&mut self, asset: AssetTypeId) -> Result<(), InstanceError>;

    /// Remove every instance of every asset type.
    fn clear_all(&mut self);

    /// Live instances of one asset type.
    fn live_count(&self, asset: AssetTypeId) -> Option<u32>;

    /// Capacity of one asset type.
    fn capacity(&self, asset: AssetTypeId) -> Option<u32>;

    /// Live and capacity counts for every asset type, in id order.
    fn usage(&self) -> Vec<PoolUsage>;

    /// Live instances across all asset types.
    fn total_live(&self) -> usize {
        self.usage().iter().map(|u| u.live as usize).sum()
    }

    /// Place an instance by asset name.
    ///
    /// # Errors
    ///
    /// As [`InstanceSink::acquire`].
    fn acquire_named(
        &mut self,
        name: &str,
        transform: InstanceTransform,
    ) -> Result<InstanceHandle, InstanceError> {
        let asset = self
            .asset_type(name)
            .ok_or_else(|| InstanceError::UnknownAssetType(name.to_string()))?;
        self.acquire(asset, transform)
    }
}
