//! Multi-octave fractal Brownian motion (fBm) noise field.
//!
//! Composites octaves of simplex noise, each doubling frequency and halving
//! amplitude, into a continuous and reproducible scalar field over the XZ plane.

use noise::{NoiseFn, Simplex};
use verdant_config::TerrainConfig;

/// Configuration for multi-octave fBm noise.
#[derive(Clone, Debug)]
pub struct NoiseParams {
    /// Seed for deterministic generation.
    pub seed: u64,
    /// Number of noise octaves to composite. Default: 4.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves. Default: 2.0.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves. Default: 0.5.
    pub persistence: f64,
    /// Frequency of the first (lowest) octave.
    pub base_frequency: f64,
    /// Amplitude of the first octave.
    pub amplitude: f64,
    /// Offset added to sample coordinates before scaling, used to decorrelate
    /// channels that share a seed family.
    pub offset: (f64, f64),
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 0.01,
            amplitude: 1.0,
            offset: (0.0, 0.0),
        }
    }
}

impl NoiseParams {
    /// Terrain elevation parameters taken from the config.
    pub fn from_config(seed: u64, terrain: &TerrainConfig) -> Self {
        Self {
            seed,
            octaves: terrain.octaves,
            lacunarity: terrain.lacunarity,
            persistence: terrain.persistence,
            base_frequency: terrain.base_frequency,
            amplitude: terrain.amplitude,
            offset: (0.0, 0.0),
        }
    }
}

/// A deterministic fBm noise field: a pure function of `(x, z)` for a fixed seed.
#[derive(Clone)]
pub struct NoiseField {
    noise: Simplex,
    params: NoiseParams,
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl NoiseField {
    /// Create a new field with the given parameters.
    pub fn new(params: NoiseParams) -> Self {
        // Simplex takes a 32-bit seed; fold the high half in so seeds that
        // differ only above bit 32 still differ.
        let folded = (params.seed ^ (params.seed >> 32)) as u32;
        let noise = Simplex::new(folded);
        Self { noise, params }
    }

    /// Sample the field at a world coordinate.
    ///
    /// The result lies in `[-max_amplitude, +max_amplitude]`.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.params.base_frequency;
        let mut amplitude = self.params.amplitude;
        let (ox, oz) = self.params.offset;

        for _ in 0..self.params.octaves {
            let noise_val = self.noise.get([(x + ox) * frequency, (z + oz) * frequency]);
            total += noise_val * amplitude;

            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        total
    }

    /// Sample the field remapped to `[0.0, 1.0]`.
    pub fn sample_normalized(&self, x: f64, z: f64) -> f64 {
        let max_amp = self.max_amplitude();
        if max_amp == 0.0 {
            return 0.5;
        }
        ((self.sample(x, z) / max_amp + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Theoretical maximum absolute value (geometric series of amplitudes).
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amp = self.params.amplitude.abs();
        for _ in 0..self.params.octaves {
            sum += amp;
            amp *= self.params.persistence.abs();
        }
        sum
    }

    /// Return a reference to the current parameters.
    pub fn params(&self) -> &NoiseParams {
        &self.params
    }
}
