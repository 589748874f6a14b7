use thiserror::Error;

/// Rejected [`ScanConfig`](crate::ScanConfig) values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite (got {value})")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("scan_radius must be positive (got {0})")]
    NonPositiveRadius(f32),

    #[error("min_spacing must be in (0, scan_radius = {radius}] (got {spacing})")]
    SpacingOutOfRange { spacing: f32, radius: f32 },

    #[error("stand_off {stand_off} exceeds scan_radius {radius}")]
    StandOffTooLarge { stand_off: f32, radius: f32 },
}
