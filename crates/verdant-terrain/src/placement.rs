//! Vegetation placement: blue-noise candidate sampling followed by terrain,
//! biome and density filtering.

mod filter;
mod poisson;

pub use filter::{PlacementPoint, PlacementStats, VegetationPlanner};
pub use poisson::{Rect, poisson_disc};
