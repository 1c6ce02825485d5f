//! Validation errors for location fixes.
//!
//! A fix that breaks one of these rules must never reach storage.

use std::fmt;

/// Why a fix was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Latitude/longitude outside [-90, 90] / [-180, 180] or not finite
    InvalidCoordinates {
        trail_id: String,
        latitude: f64,
        longitude: f64,
    },
    /// Timestamp before the Unix epoch
    NegativeTimestamp {
        trail_id: String,
        timestamp_millis: i64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidCoordinates {
                trail_id,
                latitude,
                longitude,
            } => {
                write!(
                    f,
                    "Trail '{}' fix has invalid coordinates ({}, {})",
                    trail_id, latitude, longitude
                )
            }
            ValidationError::NegativeTimestamp {
                trail_id,
                timestamp_millis,
            } => {
                write!(
                    f,
                    "Trail '{}' fix has negative timestamp {}",
                    trail_id, timestamp_millis
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result type alias for fix validation.
pub type Result<T> = std::result::Result<T, ValidationError>;
