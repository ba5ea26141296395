//! Nearest-first load queue for chunk generation requests.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::ChunkCoord;

/// An entry in the heap. Ordered so that `BinaryHeap` (a max-heap) pops the
/// smallest distance first, breaking ties by insertion sequence.
#[derive(Clone, Debug)]
struct QueueEntry {
    coord: ChunkCoord,
    distance: u32,
    /// Insertion sequence; also detects stale entries after re-pushes.
    sequence: u64,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .cmp(&self.distance)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// A request popped from the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    /// Chunk to generate.
    pub coord: ChunkCoord,
    /// Ring distance to the viewpoint when the request was queued.
    pub distance: u32,
}

/// Priority queue of chunk load requests, nearest first.
///
/// Equal distances come out in the order they were pushed, so a given
/// sequence of pushes always drains in the same order. Removal is lazy: the
/// heap entry stays until popped and is then skipped.
#[derive(Debug, Default)]
pub struct LoadQueue {
    heap: BinaryHeap<QueueEntry>,
    /// Live sequence number per queued coordinate.
    live: HashMap<ChunkCoord, u64>,
    next_sequence: u64,
}

impl LoadQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a chunk, or update its distance if already queued.
    pub fn push(&mut self, coord: ChunkCoord, distance: u32) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.live.insert(coord, sequence);
        self.heap.push(QueueEntry {
            coord,
            distance,
            sequence,
        });
    }

    /// Remove and return the nearest request.
    pub fn pop(&mut self) -> Option<LoadRequest> {
        while let Some(entry) = self.heap.pop() {
            if self.live.get(&entry.coord) == Some(&entry.sequence) {
                self.live.remove(&entry.coord);
                return Some(LoadRequest {
                    coord: entry.coord,
                    distance: entry.distance,
                });
            }
            // Stale entry, skip it.
        }
        None
    }

    /// Drop a queued chunk. Returns `true` if it was queued.
    pub fn remove(&mut self, coord: ChunkCoord) -> bool {
        let removed = self.live.remove(&coord).is_some();
        if self.live.is_empty() {
            self.heap.clear();
        }
        removed
    }

    /// Whether a chunk is queued.
    #[must_use]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.live.contains_key(&coord)
    }

    /// Number of queued chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, z: i32) -> ChunkCoord {
        ChunkCoord::new(x, z)
    }

    #[test]
    fn test_queue_returns_nearest_first() {
        let mut queue = LoadQueue::new();
        queue.push(c(3, 0), 3);
        queue.push(c(0, 0), 0);
        queue.push(c(1, 1), 1);
        assert_eq!(queue.pop().map(|r| r.coord), Some(c(0, 0)));
        assert_eq!(queue.pop().map(|r| r.coord), Some(c(1, 1)));
        assert_eq!(queue.pop().map(|r| r.coord), Some(c(3, 0)));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_ties_drain_in_push_order() {
        let mut queue = LoadQueue::new();
        let ring = [c(-1, -1), c(0, -1), c(1, -1), c(-1, 0), c(1, 0)];
        for coord in ring {
            queue.push(coord, 1);
        }
        let drained: Vec<_> = std::iter::from_fn(|| queue.pop().map(|r| r.coord)).collect();
        assert_eq!(drained, ring);
    }

    #[test]
    fn test_repush_updates_distance() {
        let mut queue = LoadQueue::new();
        queue.push(c(0, 0), 5);
        queue.push(c(1, 0), 2);
        queue.push(c(0, 0), 1);
        assert_eq!(queue.len(), 2);
        assert_eq!(
            queue.pop(),
            Some(LoadRequest {
                coord: c(0, 0),
                distance: 1
            })
        );
        assert_eq!(queue.pop().map(|r| r.coord), Some(c(1, 0)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_removed_entries_are_skipped() {
        let mut queue = LoadQueue::new();
        queue.push(c(0, 0), 0);
        queue.push(c(1, 0), 1);
        assert!(queue.remove(c(0, 0)));
        assert!(!queue.remove(c(0, 0)));
        assert!(!queue.contains(c(0, 0)));
        assert_eq!(queue.pop().map(|r| r.coord), Some(c(1, 0)));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_clear() {
        let mut queue = LoadQueue::new();
        queue.push(c(0, 0), 0);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }
}
