//! Residency cap enforcement: choose which resident chunks to evict when
//! more are resident than allowed.

use crate::ChunkCoord;

/// A resident chunk and when it was last accessed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResidentChunk {
    /// The chunk.
    pub coord: ChunkCoord,
    /// Tick of the last access.
    pub last_access: u64,
}

/// Pick chunks to evict so that at most `cap` remain.
///
/// Returns coordinates in eviction order, least recently accessed first.
/// Equal access times fall back to coordinate order so the choice is
/// deterministic.
#[must_use]
pub fn select_lru_evictions(
    resident: impl IntoIterator<Item = ResidentChunk>,
    cap: usize,
) -> Vec<ChunkCoord> {
    let mut candidates: Vec<ResidentChunk> = resident.into_iter().collect();
    if candidates.len() <= cap {
        return Vec::new();
    }
    let excess = candidates.len() - cap;
    candidates.sort_by(|a, b| {
        a.last_access
            .cmp(&b.last_access)
            .then_with(|| a.coord.cmp(&b.coord))
    });
    candidates
        .into_iter()
        .take(excess)
        .map(|entry| entry.coord)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(x: i32, last_access: u64) -> ResidentChunk {
        ResidentChunk {
            coord: ChunkCoord::new(x, 0),
            last_access,
        }
    }

    #[test]
    fn test_under_cap_evicts_nothing() {
        let chunks = [entry(0, 1), entry(1, 2)];
        assert!(select_lru_evictions(chunks, 2).is_empty());
        assert!(select_lru_evictions(chunks, 10).is_empty());
    }

    #[test]
    fn test_evicts_least_recent_first() {
        let chunks = [entry(0, 10), entry(1, 3), entry(2, 7), entry(3, 1)];
        let evicted = select_lru_evictions(chunks, 2);
        assert_eq!(evicted, vec![ChunkCoord::new(3, 0), ChunkCoord::new(1, 0)]);
    }

    #[test]
    fn test_ties_broken_by_coordinate() {
        let chunks = [entry(5, 1), entry(-2, 1), entry(0, 1)];
        let evicted = select_lru_evictions(chunks, 1);
        assert_eq!(evicted, vec![ChunkCoord::new(-2, 0), ChunkCoord::new(0, 0)]);
    }

    #[test]
    fn test_zero_cap_evicts_all() {
        let chunks = [entry(0, 1), entry(1, 2)];
        assert_eq!(select_lru_evictions(chunks, 0).len(), 2);
    }
}
