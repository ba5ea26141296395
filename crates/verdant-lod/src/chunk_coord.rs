//! Integer chunk grid coordinates on the XZ plane.

use std::fmt;

use glam::{DVec2, DVec3};

/// A chunk's position in the world grid. Chunk `(x, z)` covers world
/// `[x·size, (x+1)·size) × [z·size, (z+1)·size)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Grid column.
    pub x: i32,
    /// Grid row.
    pub z: i32,
}

impl ChunkCoord {
    /// The origin chunk.
    pub const ORIGIN: Self = Self { x: 0, z: 0 };

    /// Create a coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk containing a world position. Y is ignored.
    #[must_use]
    pub fn from_world(position: DVec3, chunk_size: f64) -> Self {
        Self {
            x: (position.x / chunk_size).floor() as i32,
            z: (position.z / chunk_size).floor() as i32,
        }
    }

    /// Chebyshev (ring) distance in chunks.
    #[must_use]
    pub fn chebyshev(self, other: Self) -> u32 {
        let dx = (i64::from(self.x) - i64::from(other.x)).unsigned_abs();
        let dz = (i64::from(self.z) - i64::from(other.z)).unsigned_abs();
        dx.max(dz).min(u64::from(u32::MAX)) as u32
    }

    /// World-space center on the XZ plane.
    #[must_use]
    pub fn center(self, chunk_size: f64) -> DVec2 {
        DVec2::new(
            (f64::from(self.x) + 0.5) * chunk_size,
            (f64::from(self.z) + 0.5) * chunk_size,
        )
    }

    /// Coordinate shifted by a chunk offset.
    #[must_use]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            z: self.z.saturating_add(dz),
        }
    }

    /// As a plain `(x, z)` pair.
    #[must_use]
    pub fn as_tuple(self) -> (i32, i32) {
        (self.x, self.z)
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from((x, z): (i32, i32)) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Every coordinate within Chebyshev distance `radius` of `center`, nearest
/// ring first. Ring `d` holds the `8d` cells whose distance is exactly `d`,
/// corners included, so the result is the full `(2r+1)²` square.
#[must_use]
pub fn chunks_in_radius(center: ChunkCoord, radius: u32) -> Vec<ChunkCoord> {
    let r = radius.min(i32::MAX as u32 / 2) as i32;
    let side = (2 * r as usize) + 1;
    let mut out = Vec::with_capacity(side * side);
    out.push(center);
    for d in 1..=r {
        // Walk the ring row by row for a stable order.
        for dz in -d..=d {
            if dz == -d || dz == d {
                for dx in -d..=d {
                    out.push(center.offset(dx, dz));
                }
            } else {
                out.push(center.offset(-d, dz));
                out.push(center.offset(d, dz));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_from_world_floors_negative() {
        assert_eq!(
            ChunkCoord::from_world(DVec3::new(-0.5, 100.0, 63.9), 64.0),
            ChunkCoord::new(-1, 0)
        );
        assert_eq!(
            ChunkCoord::from_world(DVec3::new(64.0, 0.0, -64.0), 64.0),
            ChunkCoord::new(1, -1)
        );
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = ChunkCoord::new(0, 0);
        assert_eq!(a.chebyshev(ChunkCoord::new(3, -1)), 3);
        assert_eq!(a.chebyshev(ChunkCoord::new(-2, 2)), 2);
        assert_eq!(a.chebyshev(a), 0);
    }

    #[test]
    fn test_chebyshev_extreme_coords() {
        let a = ChunkCoord::new(i32::MIN, 0);
        let b = ChunkCoord::new(i32::MAX, 0);
        assert_eq!(a.chebyshev(b), u32::MAX);
    }

    #[test]
    fn test_center() {
        assert_eq!(ChunkCoord::new(-1, 2).center(64.0), DVec2::new(-32.0, 160.0));
    }

    #[test]
    fn test_radius_one_is_three_by_three() {
        let chunks = chunks_in_radius(ChunkCoord::new(5, 5), 1);
        assert_eq!(chunks.len(), 9);
        let unique: HashSet<_> = chunks.iter().copied().collect();
        assert_eq!(unique.len(), 9);
        for c in &chunks {
            assert!(c.chebyshev(ChunkCoord::new(5, 5)) <= 1);
        }
        // Corners are part of the first ring.
        assert!(unique.contains(&ChunkCoord::new(4, 4)));
        assert!(unique.contains(&ChunkCoord::new(6, 6)));
    }

    #[test]
    fn test_rings_ordered_nearest_first() {
        let center = ChunkCoord::new(-3, 7);
        let chunks = chunks_in_radius(center, 4);
        assert_eq!(chunks.len(), 81);
        assert_eq!(chunks[0], center);
        let distances: Vec<u32> = chunks.iter().map(|c| c.chebyshev(center)).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_radius_zero_is_center_only() {
        assert_eq!(chunks_in_radius(ChunkCoord::ORIGIN, 0), vec![ChunkCoord::ORIGIN]);
    }

    #[test]
    fn test_display_and_tuple() {
        let c = ChunkCoord::from((2, -9));
        assert_eq!(c.to_string(), "(2, -9)");
        assert_eq!(c.as_tuple(), (2, -9));
    }
}
