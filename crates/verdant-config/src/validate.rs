//! Startup validation. Any error here is fatal: the engine refuses to start.

use std::collections::HashSet;

use crate::catalog::VegetationRule;
use crate::config::Config;
use crate::error::ConfigError;

/// Poisson spacing may not be finer than this fraction of a chunk.
pub const MIN_SPACING_DIVISOR: f64 = 256.0;

/// Chunks inside a square view radius, the smallest usable residency cap.
pub fn chunks_in_view(view_radius: u32) -> usize {
    let side = 2 * view_radius as usize + 1;
    side.saturating_mul(side)
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

fn ordered(range: (f64, f64)) -> bool {
    !range.0.is_nan() && !range.1.is_nan() && range.0 <= range.1
}

fn probability(p: f64) -> bool {
    (0.0..=1.0).contains(&p)
}

impl Config {
    /// Check that the configuration describes a usable world.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        if !(world.chunk_size.is_finite() && world.chunk_size > 0.0) {
            return Err(invalid(format!(
                "chunk_size must be positive, got {}",
                world.chunk_size
            )));
        }
        if !(world.tile_size.is_finite() && world.tile_size > 0.0) {
            return Err(invalid(format!(
                "tile_size must be positive, got {}",
                world.tile_size
            )));
        }
        if world.tile_size > world.chunk_size {
            return Err(invalid("tile_size must not exceed chunk_size"));
        }

        let terrain = &self.terrain;
        if !(1..=16).contains(&terrain.octaves) {
            return Err(invalid(format!(
                "octaves must be in 1..=16, got {}",
                terrain.octaves
            )));
        }
        for (name, value) in [
            ("base_frequency", terrain.base_frequency),
            ("amplitude", terrain.amplitude),
            ("persistence", terrain.persistence),
            ("lacunarity", terrain.lacunarity),
            ("climate_frequency", terrain.climate_frequency),
            ("elevation_frequency", terrain.elevation_frequency),
        ] {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be finite")));
            }
        }

        self.validate_biomes()?;

        let streaming = &self.streaming;
        if streaming.unload_radius < streaming.view_radius {
            return Err(invalid(format!(
                "unload_radius ({}) must be >= view_radius ({})",
                streaming.unload_radius, streaming.view_radius
            )));
        }
        if streaming.max_concurrent == 0 {
            return Err(invalid("max_concurrent must be at least 1"));
        }
        if streaming.yield_every == 0 {
            return Err(invalid("yield_every must be at least 1"));
        }
        if streaming.max_resident_chunks == 0 {
            return Err(invalid("max_resident_chunks must be at least 1"));
        }
        if streaming.lod_table.is_empty() {
            return Err(invalid("lod_table must have at least one step"));
        }
        for pair in streaming.lod_table.windows(2) {
            if pair[1].max_distance <= pair[0].max_distance {
                return Err(invalid("lod_table distances must be strictly increasing"));
            }
        }
        let wanted = chunks_in_view(streaming.view_radius);
        if streaming.max_resident_chunks < wanted {
            // Evicted chunks inside the view are never requeued while the
            // viewpoint stays put, so a smaller cap leaves permanent holes.
            return Err(invalid(format!(
                "max_resident_chunks ({}) must cover the {wanted} chunks inside view_radius {}",
                streaming.max_resident_chunks, streaming.view_radius
            )));
        }
        if streaming.max_resident_chunks < chunks_in_view(streaming.unload_radius) {
            log::warn!(
                "max_resident_chunks ({}) is below the {} chunks inside unload_radius; \
                 chunks leaving the view will be evicted early",
                streaming.max_resident_chunks,
                chunks_in_view(streaming.unload_radius)
            );
        }

        let min_spacing = world.chunk_size / MIN_SPACING_DIVISOR;
        for rule in &self.vegetation {
            validate_rule(rule, min_spacing)?;
        }

        let instancing = &self.instancing;
        if instancing.default_capacity == 0 {
            return Err(invalid("default_capacity must be positive"));
        }
        if let Some((asset, _)) = instancing.capacities.iter().find(|(_, c)| **c == 0) {
            return Err(invalid(format!("capacity for {asset} must be positive")));
        }
        if self.tiles.default.ground.is_empty() {
            return Err(invalid("default tile set needs a ground asset"));
        }

        Ok(())
    }

    fn validate_biomes(&self) -> Result<(), ConfigError> {
        if self.biomes.is_empty() {
            return Err(invalid("biome registry is empty"));
        }
        let mut seen = HashSet::new();
        for biome in &self.biomes {
            if biome.id.is_empty() {
                return Err(invalid("biome id must not be empty"));
            }
            if !seen.insert(biome.id.as_str()) {
                return Err(invalid(format!("duplicate biome id: {}", biome.id)));
            }
            if !biome.height_modifier.is_finite() {
                return Err(invalid(format!(
                    "biome {} has non-finite height_modifier",
                    biome.id
                )));
            }
            let d = &biome.vegetation_density;
            for p in [d.tree, d.bush, d.rock, d.plant, biome.ground_cover_density] {
                if !probability(p) {
                    return Err(invalid(format!(
                        "biome {} has density {p} outside [0, 1]",
                        biome.id
                    )));
                }
            }
        }
        Ok(())
    }
}

fn validate_rule(rule: &VegetationRule, min_spacing: f64) -> Result<(), ConfigError> {
    let name = format!("{:?}", rule.category);
    if !(rule.min_distance.is_finite() && rule.min_distance > 0.0) {
        return Err(invalid(format!("{name}: min_distance must be positive")));
    }
    if rule.min_distance < min_spacing {
        return Err(invalid(format!(
            "{name}: min_distance {} is below {min_spacing} (chunk_size / {MIN_SPACING_DIVISOR})",
            rule.min_distance
        )));
    }
    if rule.max_attempts == 0 {
        return Err(invalid(format!("{name}: max_attempts must be at least 1")));
    }
    if rule.assets.is_empty() {
        return Err(invalid(format!("{name}: needs at least one asset")));
    }
    if !ordered(rule.height_range) || !ordered(rule.slope_range) || !ordered(rule.scale_range) {
        return Err(invalid(format!("{name}: ranges must be ordered (min <= max)")));
    }
    if rule.scale_range.0 <= 0.0 {
        return Err(invalid(format!("{name}: scale must be positive")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VegetationCategory;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_non_positive_chunk_size_rejected() {
        let mut config = Config::default();
        config.world.chunk_size = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.world.chunk_size = -64.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_biome_registry_rejected() {
        let mut config = Config::default();
        config.biomes.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("biome registry is empty"));
    }

    #[test]
    fn test_duplicate_biome_rejected() {
        let mut config = Config::default();
        let first = config.biomes[0].clone();
        config.biomes.push(first);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_density_out_of_range_rejected() {
        let mut config = Config::default();
        config.biomes[0].vegetation_density.tree = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unload_radius_below_view_radius_rejected() {
        let mut config = Config::default();
        config.streaming.view_radius = 3;
        config.streaming.unload_radius = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_increasing_lod_table_rejected() {
        let mut config = Config::default();
        config.streaming.lod_table[1].max_distance = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = Config::default();
        config.streaming.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rule_without_assets_rejected() {
        let mut config = Config::default();
        config.vegetation.push(VegetationRule {
            category: VegetationCategory::Rock,
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tiny_min_distance_rejected() {
        let mut config = Config::default();
        for rule in &mut config.vegetation {
            rule.min_distance = 1e-6;
        }
        let err = config.validate().unwrap_err();
        assert!(
            err.to_string().contains("min_distance"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_min_distance_floor_scales_with_chunk_size() {
        let mut config = Config::default();
        config.world.chunk_size = 512.0;
        config.vegetation[0].min_distance = 1.0;
        assert!(config.validate().is_err(), "1.0 is below 512 / 256");
        config.vegetation[0].min_distance = 2.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_residency_cap_below_view_rejected() {
        let mut config = Config::default();
        config.streaming.view_radius = 2;
        config.streaming.max_resident_chunks = 24;
        let err = config.validate().unwrap_err();
        assert!(
            err.to_string().contains("max_resident_chunks"),
            "unexpected error: {err}"
        );
        config.streaming.max_resident_chunks = chunks_in_view(2);
        assert!(config.validate().is_ok(), "a cap of exactly 25 covers the view");
    }

    #[test]
    fn test_inverted_height_range_rejected() {
        let mut config = Config::default();
        config.vegetation[0].height_range = (10.0, -10.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_pool_capacity_rejected() {
        let mut config = Config::default();
        config.instancing.capacities.insert("tree_oak".into(), 0);
        assert!(config.validate().is_err());
    }
}
