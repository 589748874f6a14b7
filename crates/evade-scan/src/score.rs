#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunable weights of the candidate score.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoreWeights {
    /// Added when the spot breaks line of sight to the threat.
    pub cover_bonus: f32,
    /// Multiplies the distance from the spot to the threat's eye.
    pub distance_weight: f32,
    /// Subtracted when the directional probe hit the threat itself.
    pub direct_sight_penalty: f32,
    /// Added when the directional probe hit a safe point. `None` disables safe points entirely,
    /// including in the probe mask.
    pub safe_point_bonus: Option<f32>,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            cover_bonus: 1000.0,
            distance_weight: 2.0,
            direct_sight_penalty: 500.0,
            safe_point_bonus: None,
        }
    }
}

/// Per-candidate inputs to [`ScoreWeights::score`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreTerms {
    pub cover: bool,
    pub distance: f32,
    pub direct_sight: bool,
    pub safe_point: bool,
}

impl ScoreWeights {
    pub fn score(&self, terms: ScoreTerms) -> f32 {
        let mut score = terms.distance * self.distance_weight;
        if terms.cover {
            score += self.cover_bonus;
        }
        if terms.direct_sight {
            score -= self.direct_sight_penalty;
        }
        if terms.safe_point {
            score += self.safe_point_bonus.unwrap_or(0.0);
        }
        score
    }

    pub fn safe_points_enabled(&self) -> bool {
        self.safe_point_bonus.is_some()
    }
}
