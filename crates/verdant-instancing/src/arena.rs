//! Scene-node arena addressed by generational index.
//!
//! Parent/child links are stored as [`NodeId`]s, so removing a node never
//! leaves a dangling reference: a stale id simply fails to resolve.
//!
//! Each entry remembers its position in the parent's child list, so unlinking
//! is a swap-remove and costs the same for a group of ten or ten thousand.

use crate::InstanceTransform;

/// Generational node index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// Slot index.
    pub index: u32,
    /// Slot generation at insertion.
    pub generation: u32,
}

/// A node in the discrete scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    /// Node name (asset id for group and object nodes).
    pub name: String,
    /// Local transform.
    pub transform: InstanceTransform,
    /// Parent node, if any.
    pub parent: Option<NodeId>,
    /// Child nodes. Order is unspecified once a child has been removed.
    pub children: Vec<NodeId>,
}

#[derive(Clone, Debug)]
struct Entry {
    generation: u32,
    node: Option<SceneNode>,
    /// Position in the parent's `children`.
    slot: usize,
}

/// Arena of scene nodes with slot reuse.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    entries: Vec<Entry>,
    free: Vec<u32>,
    len: usize,
}

impl NodeArena {
    /// Empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, linking it under `parent` if that node is live.
    pub fn insert(
        &mut self,
        name: &str,
        transform: InstanceTransform,
        parent: Option<NodeId>,
    ) -> NodeId {
        let parent = parent.filter(|p| self.contains(*p));
        let slot = parent
            .and_then(|p| self.get(p))
            .map_or(0, |p| p.children.len());
        let node = SceneNode {
            name: name.to_string(),
            transform,
            parent,
            children: Vec::new(),
        };
        let id = if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.node = Some(node);
            entry.slot = slot;
            NodeId {
                index,
                generation: entry.generation,
            }
        } else {
            let index = self.entries.len() as u32;
            self.entries.push(Entry {
                generation: 0,
                node: Some(node),
                slot,
            });
            NodeId {
                index,
                generation: 0,
            }
        };
        if let Some(parent) = parent
            && let Some(p) = self.get_mut(parent)
        {
            p.children.push(id);
        }
        self.len += 1;
        id
    }

    /// Remove a node and its whole subtree. Returns the removed node.
    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        if !self.contains(id) {
            return None;
        }
        let entry = &mut self.entries[id.index as usize];
        let node = entry.node.take()?;
        let slot = entry.slot;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;

        if let Some(parent) = node.parent {
            self.unlink(parent, id, slot);
        }
        for child in &node.children {
            self.remove(*child);
        }
        Some(node)
    }

    /// Swap-remove `id` from `parent`'s children and fix the slot of the
    /// child that moved into its place.
    fn unlink(&mut self, parent: NodeId, id: NodeId, slot: usize) {
        let Some(p) = self.get_mut(parent) else {
            return;
        };
        if p.children.get(slot) != Some(&id) {
            // Slot out of sync with a children list edited through `get_mut`.
            p.children.retain(|c| *c != id);
            return;
        }
        p.children.swap_remove(slot);
        if let Some(&moved) = p.children.get(slot) {
            self.entries[moved.index as usize].slot = slot;
        }
    }

    /// Whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Look up a live node.
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.entries
            .get(id.index as usize)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.node.as_ref())
    }

    /// Look up a live node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.entries
            .get_mut(id.index as usize)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.node.as_mut())
    }

    /// Live children of a node.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|c| self.get(*c).map(|n| (*c, n)))
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
