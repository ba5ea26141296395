//! Terrain, biome and density filtering of Poisson-disc candidates.

use glam::DVec2;
use hashbrown::HashSet;
use rand::Rng;
use verdant_config::{VegetationCategory, VegetationRule};

use super::{Rect, poisson_disc};
use crate::biome::{BiomeId, BiomeRegistry};
use crate::height_field::HeightField;
use crate::seed::category_rng;

/// An accepted vegetation placement.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementPoint {
    /// Position on the XZ plane.
    pub position: DVec2,
    /// Terrain height at `position`.
    pub height: f64,
    /// Rotation about the vertical axis, radians in `[0, 2π)`.
    pub rotation: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Vegetation category.
    pub category: VegetationCategory,
    /// Asset id picked from the rule's list.
    pub asset: String,
}

/// Why candidates were dropped, summed over categories.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlacementStats {
    /// Points produced by the sampler.
    pub candidates: usize,
    /// Rejected by the height range.
    pub rejected_height: usize,
    /// Rejected by the slope range.
    pub rejected_slope: usize,
    /// Rejected because the biome is not allowed.
    pub rejected_biome: usize,
    /// Rejected by the density draw.
    pub rejected_density: usize,
    /// Accepted placements.
    pub accepted: usize,
}

impl PlacementStats {
    /// Add another set of counters into this one.
    pub fn merge(&mut self, other: &PlacementStats) {
        self.candidates += other.candidates;
        self.rejected_height += other.rejected_height;
        self.rejected_slope += other.rejected_slope;
        self.rejected_biome += other.rejected_biome;
        self.rejected_density += other.rejected_density;
        self.accepted += other.accepted;
    }
}

#[derive(Clone, Debug)]
struct CategoryPlan {
    rule: VegetationRule,
    /// `None` means every biome.
    allowed: Option<HashSet<BiomeId>>,
}

/// Turns vegetation rules into per-chunk placement lists.
#[derive(Clone, Debug)]
pub struct VegetationPlanner {
    categories: Vec<CategoryPlan>,
}

impl VegetationPlanner {
    /// Resolve rule biome names against the registry. Names the registry does
    /// not know are logged and ignored.
    pub fn new(rules: &[VegetationRule], registry: &BiomeRegistry) -> Self {
        let categories = rules
            .iter()
            .map(|rule| {
                let allowed = (!rule.biomes.is_empty()).then(|| {
                    rule.biomes
                        .iter()
                        .filter_map(|name| {
                            let id = registry.lookup_by_name(name);
                            if id.is_none() {
                                tracing::warn!(
                                    category = ?rule.category,
                                    biome = %name,
                                    "vegetation rule names an unknown biome"
                                );
                            }
                            id
                        })
                        .collect()
                });
                CategoryPlan {
                    rule: rule.clone(),
                    allowed,
                }
            })
            .collect();
        Self { categories }
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// `true` if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Every asset id any rule can place.
    pub fn asset_ids(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .flat_map(|c| c.rule.assets.iter().map(String::as_str))
    }

    /// Sample and filter every category allowed at `lod` over `bounds`.
    ///
    /// Each category draws from its own RNG stream seeded by `chunk_seed`, so
    /// the result does not depend on rule order or on other chunks.
    pub fn plan(
        &self,
        field: &HeightField,
        registry: &BiomeRegistry,
        bounds: Rect,
        chunk_seed: u64,
        lod: u8,
    ) -> (Vec<PlacementPoint>, PlacementStats) {
        let mut points = Vec::new();
        let mut stats = PlacementStats::default();

        for plan in &self.categories {
            let rule = &plan.rule;
            if lod > rule.max_lod || rule.assets.is_empty() {
                continue;
            }

            let mut rng = category_rng(chunk_seed, rule.category);
            let candidates = poisson_disc(&mut rng, bounds, rule.min_distance, rule.max_attempts);
            stats.candidates += candidates.len();

            for position in candidates {
                let (height, biome) = field.sample(position.x, position.y);
                if height < rule.height_range.0 || height > rule.height_range.1 {
                    stats.rejected_height += 1;
                    continue;
                }

                let slope = field.slope(position.x, position.y);
                if slope < rule.slope_range.0 || slope > rule.slope_range.1 {
                    stats.rejected_slope += 1;
                    continue;
                }

                if let Some(allowed) = &plan.allowed
                    && !allowed.contains(&biome)
                {
                    stats.rejected_biome += 1;
                    continue;
                }

                let density = registry
                    .try_get(biome)
                    .map_or(0.0, |record| record.density(rule.category));
                if rng.random::<f64>() >= density {
                    stats.rejected_density += 1;
                    continue;
                }

                let asset = rule.assets[rng.random_range(0..rule.assets.len())].clone();
                let rotation = rng.random_range(0.0..std::f64::consts::TAU);
                let scale = rng.random_range(rule.scale_range.0..=rule.scale_range.1);

                stats.accepted += 1;
                points.push(PlacementPoint {
                    position,
                    height,
                    rotation,
                    scale,
                    category: rule.category,
                    asset,
                });
            }
        }

        tracing::trace!(
            candidates = stats.candidates,
            accepted = stats.accepted,
            lod,
            "vegetation planned"
        );
        (points, stats)
    }
}
