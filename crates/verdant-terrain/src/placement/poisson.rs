//! Poisson-disc (blue-noise) sampling over a rectangle.
//!
//! Bridson's algorithm: dart throwing around active points, with a uniform
//! acceleration grid of cell size `r / √2` so each cell holds at most one
//! sample. Knows nothing about terrain.

use glam::DVec2;
use rand::Rng;

/// Upper bound on acceleration grid cells. Spacing is raised until the grid
/// fits, which also bounds the number of points returned.
pub const MAX_GRID_CELLS: usize = 1 << 18;

/// Axis-aligned rectangle on the XZ plane. `min` is inclusive, `max` exclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Lower corner.
    pub min: DVec2,
    /// Upper corner.
    pub max: DVec2,
}

impl Rect {
    /// Create a rectangle from its corners.
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Extent along X.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along Z.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Center point.
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Whether a point lies inside the half-open rectangle.
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }
}

struct Grid {
    cell: f64,
    cols: usize,
    rows: usize,
    origin: DVec2,
    cells: Vec<Option<usize>>,
}

impl Grid {
    fn new(bounds: Rect, min_distance: f64) -> Self {
        let cell = min_distance / std::f64::consts::SQRT_2;
        let cols = (bounds.width() / cell).ceil().max(1.0) as usize;
        let rows = (bounds.height() / cell).ceil().max(1.0) as usize;
        Self {
            cell,
            cols,
            rows,
            origin: bounds.min,
            cells: vec![None; cols * rows],
        }
    }

    fn cell_of(&self, p: DVec2) -> (usize, usize) {
        let local = (p - self.origin) / self.cell;
        (
            (local.x as usize).min(self.cols - 1),
            (local.y as usize).min(self.rows - 1),
        )
    }

    fn insert(&mut self, p: DVec2, index: usize) {
        let (cx, cy) = self.cell_of(p);
        self.cells[cy * self.cols + cx] = Some(index);
    }

    /// Any stored point closer than `min_distance` to `p`? Two cells in each
    /// direction covers the whole exclusion disc.
    fn has_neighbor(&self, p: DVec2, points: &[DVec2], min_distance: f64) -> bool {
        let (cx, cy) = self.cell_of(p);
        let min_sq = min_distance * min_distance;
        let x0 = cx.saturating_sub(2);
        let y0 = cy.saturating_sub(2);
        let x1 = (cx + 2).min(self.cols - 1);
        let y1 = (cy + 2).min(self.rows - 1);
        for gy in y0..=y1 {
            for gx in x0..=x1 {
                if let Some(i) = self.cells[gy * self.cols + gx]
                    && points[i].distance_squared(p) < min_sq
                {
                    return true;
                }
            }
        }
        false
    }
}

/// Generate blue-noise points inside `bounds` with pairwise spacing of at
/// least `min_distance`.
///
/// Returns an empty list for an empty rectangle or a non-positive spacing.
/// A spacing so small that the grid would exceed [`MAX_GRID_CELLS`] is raised
/// to the smallest spacing that fits; see [`min_spacing_for`].
/// The output is a pure function of the RNG state and the arguments.
pub fn poisson_disc<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: Rect,
    min_distance: f64,
    max_attempts: u32,
) -> Vec<DVec2> {
    if bounds.is_empty() || !(min_distance > 0.0) || !min_distance.is_finite() {
        return Vec::new();
    }
    let floor = min_spacing_for(bounds);
    let min_distance = if min_distance < floor {
        tracing::warn!(
            requested = min_distance,
            used = floor,
            "poisson spacing too fine for region, raising it"
        );
        floor
    } else {
        min_distance
    };

    let mut grid = Grid::new(bounds, min_distance);
    let mut points = Vec::new();
    let mut active = Vec::new();

    let first = DVec2::new(
        rng.random_range(bounds.min.x..bounds.max.x),
        rng.random_range(bounds.min.y..bounds.max.y),
    );
    grid.insert(first, 0);
    points.push(first);
    active.push(0usize);

    while !active.is_empty() {
        let slot = rng.random_range(0..active.len());
        let origin = points[active[slot]];
        let mut placed = false;

        for _ in 0..max_attempts {
            let angle = rng.random_range(0.0..std::f64::consts::TAU);
            let radius = rng.random_range(min_distance..2.0 * min_distance);
            let candidate = origin + DVec2::new(angle.cos(), angle.sin()) * radius;

            if !bounds.contains(candidate) || grid.has_neighbor(candidate, &points, min_distance) {
                continue;
            }

            let index = points.len();
            grid.insert(candidate, index);
            points.push(candidate);
            active.push(index);
            placed = true;
            break;
        }

        if !placed {
            // Retired points stay in the output.
            active.swap_remove(slot);
        }
    }

    points
}

/// Smallest spacing whose acceleration grid over `bounds` stays within
/// [`MAX_GRID_CELLS`].
pub fn min_spacing_for(bounds: Rect) -> f64 {
    // One extra column and row absorbs the ceil in `Grid::new`.
    let budget = MAX_GRID_CELLS as f64;
    let (w, h) = (bounds.width(), bounds.height());
    let cell = ((w + h) + ((w + h).powi(2) + 4.0 * (budget - 1.0) * w * h).sqrt())
        / (2.0 * (budget - 1.0));
    cell * std::f64::consts::SQRT_2
}
