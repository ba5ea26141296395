//! CPU fallback sink: every placement is its own scene node.

use crate::{
    AssetTypeId, InstanceError, InstanceHandle, InstanceSink, InstanceTransform, NodeArena, NodeId,
    PoolLayout, PoolUsage, SceneNode, SinkMode,
};

#[derive(Clone, Debug)]
struct Group {
    node: NodeId,
    capacity: u32,
    live: u32,
}

/// Sink that spawns one arena node per placement under a group node per
/// asset type. Capacities are enforced exactly as in the pooled sink.
#[derive(Clone, Debug)]
pub struct DiscreteSink {
    layout: PoolLayout,
    arena: NodeArena,
    root: NodeId,
    groups: Vec<Group>,
}

impl DiscreteSink {
    /// Create a root node and one empty group per layout entry.
    pub fn new(layout: PoolLayout) -> Self {
        let mut arena = NodeArena::new();
        let root = arena.insert("instances", InstanceTransform::IDENTITY, None);
        let groups = layout
            .iter()
            .map(|(_, name, capacity)| Group {
                node: arena.insert(name, InstanceTransform::IDENTITY, Some(root)),
                capacity,
                live: 0,
            })
            .collect();
        Self {
            layout,
            arena,
            root,
            groups,
        }
    }

    /// The scene arena.
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Root node all groups hang from.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Object nodes of one asset type.
    pub fn objects(&self, asset: AssetTypeId) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.groups
            .get(asset.0 as usize)
            .into_iter()
            .flat_map(|g| self.arena.children(g.node))
    }

    fn group_mut(&mut self, asset: AssetTypeId) -> Result<&mut Group, InstanceError> {
        self.groups
            .get_mut(asset.0 as usize)
            .ok_or_else(|| InstanceError::UnknownAssetType(format!("#{}", asset.0)))
    }
}

impl InstanceSink for DiscreteSink {
    fn mode(&self) -> SinkMode {
        SinkMode::Discrete
    }

    fn asset_type(&self, name: &str) -> Option<AssetTypeId> {
        self.layout.id(name)
    }

    fn acquire(
        &mut self,
        asset: AssetTypeId,
        transform: InstanceTransform,
    ) -> Result<InstanceHandle, InstanceError> {
        let group = self.group_mut(asset)?;
        if group.live >= group.capacity {
            let capacity = group.capacity;
            let name = self.layout.name(asset).unwrap_or_default().to_string();
            return Err(InstanceError::PoolOverflow {
                asset: name,
                capacity,
            });
        }
        group.live += 1;
        let parent = group.node;
        let name = self.layout.name(asset).unwrap_or_default().to_string();
        let id = self.arena.insert(&name, transform, Some(parent));
        Ok(InstanceHandle {
            asset,
            index: id.index,
            generation: id.generation,
        })
    }

    fn release(&mut self, handle: InstanceHandle) -> Result<(), InstanceError> {
        let id = NodeId {
            index: handle.index,
            generation: handle.generation,
        };
        let group_node = self
            .groups
            .get(handle.asset.0 as usize)
            .map(|g| g.node)
            .ok_or(InstanceError::StaleHandle)?;
        match self.arena.get(id) {
            Some(node) if node.parent == Some(group_node) => {}
            _ => return Err(InstanceError::StaleHandle),
        }
        self.arena.remove(id);
        self.group_mut(handle.asset)?.live -= 1;
        Ok(())
    }

    fn transform(&self, handle: InstanceHandle) -> Option<InstanceTransform> {
        let group = self.groups.get(handle.asset.0 as usize)?;
        let node = self.arena.get(NodeId {
            index: handle.index,
            generation: handle.generation,
        })?;
        (node.parent == Some(group.node)).then_some(node.transform)
    }

    fn clear(&mut self, asset: AssetTypeId) -> Result<(), InstanceError> {
        let node = self.group_mut(asset)?.node;
        let children: Vec<NodeId> = self.arena.children(node).map(|(id, _)| id).collect();
        for child in children {
            self.arena.remove(child);
        }
        self.group_mut(asset)?.live = 0;
        Ok(())
    }

    fn clear_all(&mut self) {
        for i in 0..self.groups.len() {
            let _ = self.clear(AssetTypeId(i as u16));
        }
    }

    fn live_count(&self, asset: AssetTypeId) -> Option<u32> {
        self.groups.get(asset.0 as usize).map(|g| g.live)
    }

    fn capacity(&self, asset: AssetTypeId) -> Option<u32> {
        self.groups.get(asset.0 as usize).map(|g| g.capacity)
    }

    fn usage(&self) -> Vec<PoolUsage> {
        self.layout
            .iter()
            .zip(&self.groups)
            .map(|((_, name, _), g)| PoolUsage {
                name: name.to_string(),
                live: g.live,
                capacity: g.capacity,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn sink() -> DiscreteSink {
        let mut layout = PoolLayout::new();
        layout.add("tree_oak", 2);
        layout.add("rock_small", 8);
        DiscreteSink::new(layout)
    }

    #[test]
    fn test_each_placement_is_a_node() {
        let mut sink = sink();
        let oak = sink.asset_type("tree_oak").unwrap();
        let t = InstanceTransform::from_placement(Vec3::new(4.0, 1.0, 2.0), 0.3, 1.2);
        sink.acquire(oak, t).unwrap();
        let objects: Vec<_> = sink.objects(oak).collect();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].1.transform, t);
        assert_eq!(objects[0].1.name, "tree_oak");
    }

    #[test]
    fn test_transform_lookup_follows_handle() {
        let mut sink = sink();
        let t = InstanceTransform::from_placement(Vec3::new(-3.0, 0.5, 9.0), 1.0, 0.8);
        let h = sink.acquire_named("tree_oak", t).unwrap();
        assert_eq!(sink.transform(h), Some(t));
        sink.release(h).unwrap();
        assert_eq!(sink.transform(h), None);
    }

    #[test]
    fn test_capacity_enforced_like_pool() {
        let mut sink = sink();
        let oak = sink.asset_type("tree_oak").unwrap();
        sink.acquire(oak, InstanceTransform::IDENTITY).unwrap();
        sink.acquire(oak, InstanceTransform::IDENTITY).unwrap();
        assert_eq!(
            sink.acquire(oak, InstanceTransform::IDENTITY),
            Err(InstanceError::PoolOverflow {
                asset: "tree_oak".to_string(),
                capacity: 2
            })
        );
        assert_eq!(sink.live_count(oak), Some(2));
    }

    #[test]
    fn test_release_removes_node_once() {
        let mut sink = sink();
        let h = sink.acquire_named("rock_small", InstanceTransform::IDENTITY).unwrap();
        let before = sink.arena().len();
        sink.release(h).unwrap();
        assert_eq!(sink.arena().len(), before - 1);
        assert_eq!(sink.release(h), Err(InstanceError::StaleHandle));
        assert_eq!(sink.total_live(), 0);
    }

    #[test]
    fn test_handle_of_other_asset_rejected() {
        let mut sink = sink();
        let h = sink.acquire_named("rock_small", InstanceTransform::IDENTITY).unwrap();
        let forged = InstanceHandle {
            asset: sink.asset_type("tree_oak").unwrap(),
            ..h
        };
        assert_eq!(sink.release(forged), Err(InstanceError::StaleHandle));
        assert_eq!(sink.total_live(), 1);
    }

    #[test]
    fn test_release_oldest_from_large_group() {
        let mut layout = PoolLayout::new();
        layout.add("grass_tuft", 10_000);
        let mut sink = DiscreteSink::new(layout);
        let handles: Vec<_> = (0..10_000)
            .map(|i| {
                let t = InstanceTransform::from_placement(Vec3::new(i as f32, 0.0, 0.0), 0.0, 1.0);
                sink.acquire_named("grass_tuft", t).unwrap()
            })
            .collect();
        for h in &handles[..1_024] {
            sink.release(*h).unwrap();
        }
        let grass = sink.asset_type("grass_tuft").unwrap();
        assert_eq!(sink.live_count(grass), Some(10_000 - 1_024));
        assert_eq!(sink.objects(grass).count(), 10_000 - 1_024);
        for h in &handles[1_024..] {
            assert!(sink.transform(*h).is_some(), "unreleased handle lost its node");
        }
    }

    #[test]
    fn test_clear_keeps_groups() {
        let mut sink = sink();
        let oak = sink.asset_type("tree_oak").unwrap();
        sink.acquire(oak, InstanceTransform::IDENTITY).unwrap();
        sink.clear_all();
        assert_eq!(sink.objects(oak).count(), 0);
        // root + two groups
        assert_eq!(sink.arena().len(), 3);
        assert!(sink.acquire(oak, InstanceTransform::IDENTITY).is_ok());
    }
}
