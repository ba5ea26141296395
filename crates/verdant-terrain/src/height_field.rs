//! Fractal height field scaled by the local biome's height modifier.
//!
//! A pure query: any `(x, z)` can be sampled without a chunk being resident.

use crate::biome::{BiomeClassifier, BiomeId, BiomeRegistry};
use crate::noise_field::NoiseField;

/// Step used for finite-difference slope estimates, in world units.
pub const SLOPE_STEP: f64 = 1.0;

/// Elevation and slope queries over the XZ plane.
#[derive(Clone, Debug)]
pub struct HeightField {
    noise: NoiseField,
    classifier: BiomeClassifier,
    /// Height modifier per biome, indexed by `BiomeId`.
    modifiers: Vec<f64>,
}

impl HeightField {
    /// Combine a terrain noise field with a classifier and the registry's
    /// height modifiers.
    pub fn new(noise: NoiseField, classifier: BiomeClassifier, registry: &BiomeRegistry) -> Self {
        let modifiers = registry
            .iter()
            .map(|(_, record)| record.height_modifier)
            .collect();
        Self {
            noise,
            classifier,
            modifiers,
        }
    }

    /// Terrain height at a world coordinate.
    ///
    /// The modifier switches at biome borders, so height is continuous
    /// within a biome but may step across a border.
    pub fn height(&self, x: f64, z: f64) -> f64 {
        let biome = self.classifier.classify(x, z);
        self.noise.sample(x, z) * self.modifier(biome)
    }

    /// Biome at a world coordinate.
    pub fn biome(&self, x: f64, z: f64) -> BiomeId {
        self.classifier.classify(x, z)
    }

    /// Height and biome together, classifying only once.
    pub fn sample(&self, x: f64, z: f64) -> (f64, BiomeId) {
        let biome = self.classifier.classify(x, z);
        (self.noise.sample(x, z) * self.modifier(biome), biome)
    }

    /// Gradient magnitude (rise over run) by central difference.
    pub fn slope(&self, x: f64, z: f64) -> f64 {
        let h = SLOPE_STEP;
        let dx = (self.height(x + h, z) - self.height(x - h, z)) / (2.0 * h);
        let dz = (self.height(x, z + h) - self.height(x, z - h)) / (2.0 * h);
        (dx * dx + dz * dz).sqrt()
    }

    /// The classifier used for biome lookups.
    pub fn classifier(&self) -> &BiomeClassifier {
        &self.classifier
    }

    fn modifier(&self, biome: BiomeId) -> f64 {
        self.modifiers.get(biome.0 as usize).copied().unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise_field::NoiseParams;
    use verdant_config::{BiomeEntry, TerrainConfig};

    fn field(seed: u64, entries: &[BiomeEntry]) -> HeightField {
        let terrain = TerrainConfig::default();
        let registry = BiomeRegistry::from_entries(entries).unwrap();
        let classifier = BiomeClassifier::new(seed, &terrain, &registry).unwrap();
        let noise = NoiseField::new(NoiseParams::from_config(seed, &terrain));
        HeightField::new(noise, classifier, &registry)
    }

    #[test]
    fn test_height_deterministic() {
        let a = field(1337, &BiomeEntry::standard_set());
        let b = field(1337, &BiomeEntry::standard_set());
        for i in 0..300 {
            let x = i as f64 * 17.1 - 2000.0;
            let z = i as f64 * -9.3 + 500.0;
            assert_eq!(a.height(x, z), b.height(x, z), "height differs at ({x}, {z})");
            assert_eq!(a.biome(x, z), b.biome(x, z));
        }
    }

    #[test]
    fn test_height_applies_biome_modifier() {
        let mut flat = BiomeEntry::standard_set();
        for entry in &mut flat {
            entry.height_modifier = 0.0;
        }
        let field = field(5, &flat);
        for i in 0..100 {
            let x = i as f64 * 31.0;
            assert_eq!(field.height(x, -x), 0.0);
            assert_eq!(field.slope(x, -x), 0.0);
        }
    }

    #[test]
    fn test_height_within_scaled_amplitude() {
        let field = field(77, &BiomeEntry::standard_set());
        let max_modifier = BiomeEntry::standard_set()
            .iter()
            .map(|e| e.height_modifier)
            .fold(0.0, f64::max);
        let bound = field.noise.max_amplitude() * max_modifier + 1e-9;
        for i in 0..500 {
            let x = i as f64 * 11.0;
            let h = field.height(x, x * 0.5);
            assert!(h.abs() <= bound, "height {h} exceeds bound {bound}");
        }
    }

    #[test]
    fn test_sample_matches_separate_queries() {
        let field = field(3, &BiomeEntry::standard_set());
        let (h, biome) = field.sample(120.5, -88.0);
        assert_eq!(h, field.height(120.5, -88.0));
        assert_eq!(biome, field.biome(120.5, -88.0));
    }

    #[test]
    fn test_slope_non_negative_and_finite() {
        let field = field(8, &BiomeEntry::standard_set());
        for i in 0..200 {
            let s = field.slope(i as f64 * 4.0, 10.0);
            assert!(s.is_finite() && s >= 0.0, "bad slope {s}");
        }
    }
}
