//! # Trail Summaries
//!
//! Reduces the fixes of one trail to the figures shown after recording:
//! start/end time, elapsed duration, total distance, average speed and the
//! bounding region used to frame the trail on a map.
//!
//! Distance and bounds come from the fixes in chronological order. Fixes that
//! arrive out of order are sorted first (stable, so equal timestamps keep the
//! order they were given in).

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::geo_utils::polyline_length;
use crate::{Bounds, GpsPoint, LocationFix};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Derived statistics for a non-empty trail. Computed fresh on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailSummary {
    pub trail_id: String,
    /// Timestamp of the first fix (ms since epoch)
    pub start_time_millis: i64,
    /// Timestamp of the last fix (ms since epoch)
    pub end_time_millis: i64,
    /// `end - start`, zero for a single fix
    pub duration_millis: i64,
    /// Sum of haversine distances between consecutive fixes
    pub total_distance_meters: f64,
    /// Zero when the duration is zero
    pub average_speed_kmh: f64,
    pub bounds: Bounds,
    pub fix_count: usize,
}

impl TrailSummary {
    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_meters / 1000.0
    }
}

/// Average speed in km/h, defined as 0 when no time has elapsed.
pub fn average_speed_kmh(distance_meters: f64, duration_millis: i64) -> f64 {
    if duration_millis <= 0 {
        return 0.0;
    }
    let hours = duration_millis as f64 / MILLIS_PER_HOUR;
    (distance_meters / 1000.0) / hours
}

/// Fixes in chronological order, borrowing when they already are.
pub fn ordered_fixes(fixes: &[LocationFix]) -> Cow<'_, [LocationFix]> {
    let sorted = fixes
        .windows(2)
        .all(|w| w[0].timestamp_millis <= w[1].timestamp_millis);

    if sorted {
        Cow::Borrowed(fixes)
    } else {
        log::debug!(
            "trailcore: [Summary] Sorting {} out-of-order fixes",
            fixes.len()
        );
        let mut owned = fixes.to_vec();
        owned.sort_by_key(|f| f.timestamp_millis);
        Cow::Owned(owned)
    }
}

/// Positions of the fixes in chronological order, ready to draw as a path.
pub fn path_points(fixes: &[LocationFix]) -> Vec<GpsPoint> {
    ordered_fixes(fixes).iter().map(LocationFix::position).collect()
}

/// Summarize a trail.
///
/// Returns `None` for an empty trail; callers present that as "no data".
/// A single fix yields zero duration, distance and speed.
pub fn summarize_fixes(fixes: &[LocationFix]) -> Option<TrailSummary> {
    let fixes = ordered_fixes(fixes);
    let (first, last) = (fixes.first()?, fixes.last()?);

    let path: Vec<GpsPoint> = fixes.iter().map(LocationFix::position).collect();
    let bounds = Bounds::from_points(&path)?;
    let total_distance_meters = polyline_length(&path);

    let start_time_millis = first.timestamp_millis;
    let end_time_millis = last.timestamp_millis;
    let duration_millis = end_time_millis - start_time_millis;

    Some(TrailSummary {
        trail_id: first.trail_id.clone(),
        start_time_millis,
        end_time_millis,
        duration_millis,
        total_distance_meters,
        average_speed_kmh: average_speed_kmh(total_distance_meters, duration_millis),
        bounds,
        fix_count: fixes.len(),
    })
}

// ============================================================================
// Tests
// ============================================================================
