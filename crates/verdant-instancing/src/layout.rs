//! The set of asset types a sink is built for, with their capacities.

use hashbrown::HashMap;
use verdant_config::InstancingConfig;

use crate::{AssetTypeId, InstanceTransform};

/// Asset type names and pool capacities, fixed at startup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoolLayout {
    entries: Vec<(String, u32)>,
    by_name: HashMap<String, AssetTypeId>,
}

impl PoolLayout {
    /// Empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per distinct asset name, capacities from the config.
    pub fn from_config<'a>(
        config: &InstancingConfig,
        assets: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut layout = Self::new();
        for name in assets {
            layout.add(name, config.capacity_for(name));
        }
        layout
    }

    /// Add an asset type. Adding an existing name returns its id unchanged.
    pub fn add(&mut self, name: &str, capacity: u32) -> AssetTypeId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = AssetTypeId(self.entries.len() as u16);
        self.entries.push((name.to_string(), capacity));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Id for an asset name.
    pub fn id(&self, name: &str) -> Option<AssetTypeId> {
        self.by_name.get(name).copied()
    }

    /// Name of an asset type.
    pub fn name(&self, id: AssetTypeId) -> Option<&str> {
        self.entries.get(id.0 as usize).map(|(name, _)| name.as_str())
    }

    /// Capacity of an asset type.
    pub fn capacity(&self, id: AssetTypeId) -> Option<u32> {
        self.entries.get(id.0 as usize).map(|(_, capacity)| *capacity)
    }

    /// `(id, name, capacity)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (AssetTypeId, &str, u32)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, (name, capacity))| (AssetTypeId(i as u16), name.as_str(), *capacity))
    }

    /// Number of asset types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Byte size of the largest pool's transform buffer.
    pub fn max_buffer_bytes(&self) -> u64 {
        let largest = self.entries.iter().map(|(_, c)| *c).max().unwrap_or(0);
        u64::from(largest) * std::mem::size_of::<InstanceTransform>() as u64
    }
}
