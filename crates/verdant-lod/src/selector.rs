//! Distance-based LOD selection from a step table.

use verdant_config::LodStep;

/// Errors building a [`LodTable`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LodTableError {
    /// No steps were given.
    #[error("LOD table is empty")]
    Empty,
    /// Step distances must strictly increase.
    #[error("LOD table distances must be strictly increasing (step {0})")]
    NotIncreasing(usize),
}

/// Maps a chunk distance (in chunks) to a LOD level.
///
/// A chunk at distance `d` gets the level of the first step whose
/// `max_distance >= d`; beyond the last step it gets the coarsest level.
#[derive(Clone, Debug, PartialEq)]
pub struct LodTable {
    steps: Vec<LodStep>,
    coarsest: u8,
}

impl LodTable {
    /// Build from configured steps.
    ///
    /// # Errors
    ///
    /// Returns [`LodTableError`] if `steps` is empty or not strictly
    /// increasing in distance.
    pub fn new(steps: &[LodStep]) -> Result<Self, LodTableError> {
        if steps.is_empty() {
            return Err(LodTableError::Empty);
        }
        for (i, pair) in steps.windows(2).enumerate() {
            if pair[1].max_distance <= pair[0].max_distance {
                return Err(LodTableError::NotIncreasing(i + 1));
            }
        }
        let coarsest = steps.iter().map(|s| s.level).max().unwrap_or(0);
        Ok(Self {
            steps: steps.to_vec(),
            coarsest,
        })
    }

    /// LOD level for a chunk `distance` chunks from the viewpoint.
    #[must_use]
    pub fn select(&self, distance: u32) -> u8 {
        self.steps
            .iter()
            .find(|step| distance <= step.max_distance)
            .map_or(self.coarsest, |step| step.level)
    }

    /// The coarsest level in the table.
    #[must_use]
    pub fn coarsest(&self) -> u8 {
        self.coarsest
    }

    /// The configured steps.
    #[must_use]
    pub fn steps(&self) -> &[LodStep] {
        &self.steps
    }
}

impl Default for LodTable {
    fn default() -> Self {
        Self {
            steps: verdant_config::StreamingConfig::default().lod_table,
            coarsest: 3,
        }
    }
}
