use evade_core::ClassMasks;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ScoreWeights};

/// Tunables of a [`Scanner`](crate::Scanner).
///
/// Distances are world units, times are seconds. Every field has a default, so partial
/// configuration files are fine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScanConfig {
    /// Maximum distance of a candidate from the agent.
    pub scan_radius: f32,
    /// Minimum spacing between sampled directions' points.
    pub min_spacing: f32,
    pub scan_interval: f64,
    /// Minimum time between two movement requests.
    pub repath_cooldown: f64,
    /// How far a candidate stays back from whatever stopped its probe.
    pub stand_off: f32,
    /// Search radius when projecting a candidate onto the walkable surface.
    pub nav_sample_radius: f32,
    /// Eye height above ground, applied to both the candidate and the threat.
    pub eye_height: f32,
    /// Upward offset of the probe origin so it doesn't graze the floor.
    pub ray_lift: f32,
    pub masks: ClassMasks,
    pub weights: ScoreWeights,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_radius: 10.0,
            min_spacing: 1.5,
            scan_interval: 0.5,
            repath_cooldown: 0.75,
            stand_off: 0.6,
            nav_sample_radius: 1.0,
            eye_height: 1.6,
            ray_lift: 0.2,
            masks: ClassMasks::default(),
            weights: ScoreWeights::default(),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let floats = [
            ("scan_radius", self.scan_radius as f64),
            ("min_spacing", self.min_spacing as f64),
            ("scan_interval", self.scan_interval),
            ("repath_cooldown", self.repath_cooldown),
            ("stand_off", self.stand_off as f64),
            ("nav_sample_radius", self.nav_sample_radius as f64),
            ("eye_height", self.eye_height as f64),
            ("ray_lift", self.ray_lift as f64),
            ("weights.cover_bonus", self.weights.cover_bonus as f64),
            ("weights.distance_weight", self.weights.distance_weight as f64),
            (
                "weights.direct_sight_penalty",
                self.weights.direct_sight_penalty as f64,
            ),
            (
                "weights.safe_point_bonus",
                self.weights.safe_point_bonus.unwrap_or(0.0) as f64,
            ),
        ];
        for (field, value) in floats {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }

        if self.scan_radius <= 0.0 {
            return Err(ConfigError::NonPositiveRadius(self.scan_radius));
        }
        if self.min_spacing <= 0.0 || self.min_spacing > self.scan_radius {
            return Err(ConfigError::SpacingOutOfRange {
                spacing: self.min_spacing,
                radius: self.scan_radius,
            });
        }

        let non_negative = [
            ("scan_interval", self.scan_interval),
            ("repath_cooldown", self.repath_cooldown),
            ("stand_off", self.stand_off as f64),
            ("nav_sample_radius", self.nav_sample_radius as f64),
            ("eye_height", self.eye_height as f64),
            ("ray_lift", self.ray_lift as f64),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if self.stand_off > self.scan_radius {
            return Err(ConfigError::StandOffTooLarge {
                stand_off: self.stand_off,
                radius: self.scan_radius,
            });
        }
        Ok(())
    }

    /// Mask for the directional probe; safe points only stop probes when they score.
    pub fn probe_mask(&self) -> evade_core::ClassMask {
        let mut mask = self.masks.probe();
        if self.weights.safe_points_enabled() {
            mask |= self.masks.safe_point;
        }
        mask
    }
}
