/// Index of an asset type within a sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetTypeId(pub u16);

/// A placed instance. Valid until released or until its pool is cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstanceHandle {
    /// Asset type the instance belongs to.
    pub asset: AssetTypeId,
    /// Slot (pooled) or node (discrete) index.
    pub index: u32,
    /// Generation of the slot at acquisition; stale handles do not match.
    pub generation: u32,
}
