//! # Trail Aggregator
//!
//! Reads a stored trail and turns it into something to show: a summary
//! (duration, distance, average speed, bounds) and the path to draw.
//!
//! An empty trail is a normal result ([`TrailView::Empty`]), not an error.
//! A failed read is returned to the caller once, with no retry.

use std::fmt::Display;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use geo::LineString;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::display::MapDisplay;
use crate::error::Result;
use crate::store::TrailStore;
use trailcore::{GpsPoint, TrailSummary, path_points, summarize_fixes};

/// Shown when a trail has no fixes.
pub const NO_TRAIL_MESSAGE: &str = "No trail found.";

/// Summary plus the chronological path of a non-empty trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailReport {
    pub summary: TrailSummary,
    pub path: Vec<GpsPoint>,
}

impl TrailReport {
    /// Info text in the host's local time zone.
    pub fn describe(&self) -> String {
        self.describe_in(&Local)
    }

    /// Info text with the start time rendered in `tz`.
    pub fn describe_in<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let start = DateTime::from_timestamp_millis(self.summary.start_time_millis)
            .map(|utc| {
                utc.with_timezone(tz)
                    .format("%d/%m/%Y %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| "-".to_string());

        format!(
            "Start: {}\nDuration: {}\nDistance: {:.2} km\nAverage speed: {:.2} km/h",
            start,
            format_duration(self.summary.duration_millis),
            self.summary.total_distance_km(),
            self.summary.average_speed_kmh
        )
    }

    /// Path as a Google encoded polyline (5 decimal places).
    pub fn encoded_polyline(&self) -> String {
        // geo::LineString expects (x, y) = (lng, lat)
        let line: LineString<f64> = self
            .path
            .iter()
            .map(|p| (p.longitude, p.latitude))
            .collect();

        polyline::encode_coordinates(line, 5).unwrap_or_default()
    }
}

/// What the viewer should show for a trail id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrailView {
    Empty { trail_id: String },
    /// Nothing has been recorded yet
    NoTrails,
    Loaded(TrailReport),
}

impl TrailView {
    pub fn is_empty(&self) -> bool {
        !matches!(self, TrailView::Loaded(_))
    }

    pub fn report(&self) -> Option<&TrailReport> {
        match self {
            TrailView::Empty { .. } | TrailView::NoTrails => None,
            TrailView::Loaded(report) => Some(report),
        }
    }

    /// Text for the info panel.
    pub fn message(&self) -> String {
        match self {
            TrailView::Empty { .. } | TrailView::NoTrails => NO_TRAIL_MESSAGE.to_string(),
            TrailView::Loaded(report) => report.describe(),
        }
    }
}

/// `HH:MM:SS` for a duration in milliseconds. Hours are not capped at 24.
pub fn format_duration(duration_millis: i64) -> String {
    let secs = duration_millis.max(0) / 1000;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

pub struct TrailAggregator {
    store: Arc<dyn TrailStore>,
}

impl TrailAggregator {
    pub fn new(store: Arc<dyn TrailStore>) -> Self {
        Self { store }
    }

    /// Summarize one trail.
    pub fn summarize(&self, trail_id: &str) -> Result<TrailView> {
        let fixes = self.store.read_trail(trail_id)?;

        let Some(summary) = summarize_fixes(&fixes) else {
            info!("trailrec: [Aggregator] Trail {} has no fixes", trail_id);
            return Ok(TrailView::Empty {
                trail_id: trail_id.to_string(),
            });
        };

        debug!(
            "trailrec: [Aggregator] Trail {}: {} fixes, {:.1}m over {}ms ({:.2} km/h)",
            trail_id,
            summary.fix_count,
            summary.total_distance_meters,
            summary.duration_millis,
            summary.average_speed_kmh
        );

        Ok(TrailView::Loaded(TrailReport {
            summary,
            path: path_points(&fixes),
        }))
    }

    /// Summarize the most recently recorded trail, or [`TrailView::NoTrails`]
    /// when the store is empty.
    pub fn latest(&self) -> Result<TrailView> {
        match self.store.list_trails()?.into_iter().next() {
            Some(listing) => self.summarize(&listing.trail_id),
            None => Ok(TrailView::NoTrails),
        }
    }

    /// Draw the trail and frame the camera on it. Draws nothing when empty.
    pub fn render(view: &TrailView, display: &mut dyn MapDisplay, padding_px: u32) {
        let TrailView::Loaded(report) = view else {
            return;
        };

        for point in &report.path {
            display.append_polyline_point(*point);
        }
        display.fit_bounds(&report.summary.bounds, padding_px);
    }
}

// ============================================================================
// Tests
// ============================================================================
