//! # Trailcore
//!
//! Geodesic math and trail aggregation for recorded GPS trails.
//!
//! This library provides:
//! - Coordinate types (`GpsPoint`, `Bounds`) and the persisted `LocationFix`
//! - Great-circle (haversine) distance between fixes
//! - One-pass trail summaries: duration, distance, average speed, bounds
//!
//! Nothing in this crate performs I/O. Storage, ingestion and session
//! handling live in `trailrec`.
//!
//! ## Quick Start
//!
//! ```rust
//! use trailcore::{LocationFix, summarize_fixes};
//!
//! let fixes = vec![
//!     LocationFix::new("morning-walk", 0.0, 0.0, 0),
//!     LocationFix::new("morning-walk", 0.0, 0.01, 5_000),
//! ];
//!
//! let summary = summarize_fixes(&fixes).unwrap();
//! assert_eq!(summary.duration_millis, 5_000);
//! assert!((summary.total_distance_meters - 1112.0).abs() < 5.0);
//! ```

use serde::{Deserialize, Serialize};

// Validation errors
pub mod error;
pub use error::{Result, ValidationError};

// Geographic utilities (distance, path length)
pub mod geo_utils;
pub use geo_utils::{haversine_distance, polyline_length};

// Trail summaries (duration, distance, speed, bounds)
pub mod summary;
pub use summary::{TrailSummary, average_speed_kmh, ordered_fixes, path_points, summarize_fixes};

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use trailcore::GpsPoint;
/// let point = GpsPoint::new(38.7223, -9.1393); // Lisbon
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Minimal latitude/longitude rectangle enclosing a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Degenerate bounds covering a single point.
    pub fn around(point: GpsPoint) -> Self {
        Self {
            min_lat: point.latitude,
            max_lat: point.latitude,
            min_lng: point.longitude,
            max_lng: point.longitude,
        }
    }

    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::around(*first);
        for p in rest {
            bounds.include(*p);
        }
        Some(bounds)
    }

    /// Grow the bounds so they contain `point`.
    pub fn include(&mut self, point: GpsPoint) {
        self.min_lat = self.min_lat.min(point.latitude);
        self.max_lat = self.max_lat.max(point.latitude);
        self.min_lng = self.min_lng.min(point.longitude);
        self.max_lng = self.max_lng.max(point.longitude);
    }
}

/// Surrogate key assigned by the store when a fix is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FixId(pub i64);

/// One persisted GPS sample belonging to a trail.
///
/// `id` is `None` until the store has assigned one; fixes are never updated
/// after that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub id: Option<FixId>,
    /// Groups fixes into a trail. Not unique per fix.
    pub trail_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Milliseconds since the Unix epoch
    pub timestamp_millis: i64,
}

impl LocationFix {
    /// Create a fix that has not been stored yet.
    pub fn new(trail_id: &str, latitude: f64, longitude: f64, timestamp_millis: i64) -> Self {
        Self {
            id: None,
            trail_id: trail_id.to_string(),
            latitude,
            longitude,
            timestamp_millis,
        }
    }

    pub fn position(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }

    /// Check the fix against the persisted schema constraints.
    pub fn validate(&self) -> Result<()> {
        if !self.position().is_valid() {
            return Err(ValidationError::InvalidCoordinates {
                trail_id: self.trail_id.clone(),
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        if self.timestamp_millis < 0 {
            return Err(ValidationError::NegativeTimestamp {
                trail_id: self.trail_id.clone(),
                timestamp_millis: self.timestamp_millis,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
