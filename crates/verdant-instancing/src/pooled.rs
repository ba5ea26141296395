//! Batched sink: one [`InstancePool`] per asset type.

use crate::{
    AssetTypeId, InstanceBatch, InstanceError, InstanceHandle, InstancePool, InstanceSink,
    InstanceTransform, PoolLayout, PoolUsage, SinkMode,
};

/// Sink backed by contiguous per-asset transform buffers.
#[derive(Clone, Debug)]
pub struct PooledSink {
    layout: PoolLayout,
    pools: Vec<InstancePool>,
}

impl PooledSink {
    /// Create one empty pool per layout entry.
    pub fn new(layout: PoolLayout) -> Self {
        let pools = layout
            .iter()
            .map(|(id, name, capacity)| InstancePool::new(id, name, capacity))
            .collect();
        Self { layout, pools }
    }

    /// The pool for an asset type.
    pub fn pool(&self, asset: AssetTypeId) -> Option<&InstancePool> {
        self.pools.get(asset.0 as usize)
    }

    /// Non-empty pools as draw batches.
    pub fn batches(&self) -> impl Iterator<Item = InstanceBatch<'_>> {
        self.pools
            .iter()
            .filter(|p| p.live_count() > 0)
            .map(|p| InstanceBatch {
                asset: p.asset(),
                name: p.name(),
                transforms: p.transforms(),
                live: p.live_count(),
            })
    }

    fn pool_mut(&mut self, asset: AssetTypeId) -> Result<&mut InstancePool, InstanceError> {
        self.pools
            .get_mut(asset.0 as usize)
            .ok_or_else(|| InstanceError::UnknownAssetType(format!("#{}", asset.0)))
    }
}

impl InstanceSink for PooledSink {
    fn mode(&self) -> SinkMode {
        SinkMode::Pooled
    }

    fn asset_type(&self, name: &str) -> Option<AssetTypeId> {
        self.layout.id(name)
    }

    fn acquire(
        &mut self,
        asset: AssetTypeId,
        transform: InstanceTransform,
    ) -> Result<InstanceHandle, InstanceError> {
        self.pool_mut(asset)?.acquire(transform)
    }

    fn release(&mut self, handle: InstanceHandle) -> Result<(), InstanceError> {
        self.pools
            .get_mut(handle.asset.0 as usize)
            .ok_or(InstanceError::StaleHandle)?
            .release(handle)
    }

    fn transform(&self, handle: InstanceHandle) -> Option<InstanceTransform> {
        self.pool(handle.asset)?.get(handle).copied()
    }

    fn clear(&mut self, asset: AssetTypeId) -> Result<(), InstanceError> {
        self.pool_mut(asset)?.clear();
        Ok(())
    }

    fn clear_all(&mut self) {
        for pool in &mut self.pools {
            pool.clear();
        }
    }

    fn live_count(&self, asset: AssetTypeId) -> Option<u32> {
        self.pool(asset).map(InstancePool::live_count)
    }

    fn capacity(&self, asset: AssetTypeId) -> Option<u32> {
        self.pool(asset).map(InstancePool::capacity)
    }

    fn usage(&self) -> Vec<PoolUsage> {
        self.pools
            .iter()
            .map(|p| PoolUsage {
                name: p.name().to_string(),
                live: p.live_count(),
                capacity: p.capacity(),
            })
            .collect()
    }

    fn total_live(&self) -> usize {
        self.pools.iter().map(|p| p.live_count() as usize).sum()
    }
}
