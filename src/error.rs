//! Configuration errors.
//!
//! Stepping the controller never fails. Every abnormal condition is caught
//! when tunables are validated and kinematics are derived.

use std::fmt;

/// Which ray fan a ray count belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayAxis {
    Horizontal,
    Vertical,
}

impl fmt::Display for RayAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RayAxis::Horizontal => write!(f, "horizontal"),
            RayAxis::Vertical => write!(f, "vertical"),
        }
    }
}

/// Errors raised by [`MovementConfig::validate_and_derive`](crate::config::MovementConfig::validate_and_derive)
/// and the RON loaders.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("time until jump apex must be positive, got {0}")]
    NonPositiveTimeToApex(f32),

    #[error("fixed timestep must be positive and finite, got {0}")]
    NonPositiveTimestep(f32),

    #[error("{axis} ray count must be at least 2, got {count}")]
    TooFewRays { axis: RayAxis, count: u32 },

    #[error("`{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("max fall speed must be positive, got {0}")]
    NonPositiveMaxFallSpeed(f32),

    #[error("failed to parse tunables: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to read tunables file: {0}")]
    Io(#[from] std::io::Error),
}
