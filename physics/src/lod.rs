use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_LOD_DISTANCES;

/// Level of detail bucket, `0` (closest) to [`MAX_LOD`].
pub type LodLevel = u8;

pub const MAX_LOD: LodLevel = 3;

/// Distance bands separating the four LOD levels.
///
/// `distances[i]` is the distance from the eye (meters) beyond which an
/// object drops from level `i` to level `i + 1`. Must be strictly increasing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodBands {
    pub distances: [f32; 3],
}

impl Default for LodBands {
    fn default() -> Self {
        Self {
            distances: DEFAULT_LOD_DISTANCES,
        }
    }
}

impl LodBands {
    /// Squared thresholds, computed once per query.
    #[inline]
    pub fn thresholds_sq(&self) -> [f32; 3] {
        self.distances.map(|d| d * d)
    }

    pub fn is_valid(&self) -> bool {
        let [a, b, c] = self.distances;
        a.is_finite() && c.is_finite() && a >= 0.0 && a < b && b < c
    }
}

/// Counts how many thresholds `distance_sq` exceeds.
///
/// Written as a compare-and-count over a fixed lane array so it compiles to a
/// vector compare plus population count.
#[inline]
pub fn lod_from_distance_sq(distance_sq: f32, thresholds_sq: &[f32; 3]) -> LodLevel {
    thresholds_sq.iter().filter(|&&t| distance_sq > t).count() as LodLevel
}
