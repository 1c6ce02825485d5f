//! Map display and preference collaborators.
//!
//! The host app supplies the map surface and the key/value preference store.
//! This module only decides what to draw and how the camera should move.

use serde::{Deserialize, Serialize};

use crate::ingest::LiveMetrics;
use crate::session::LiveMetricsObserver;
use trailcore::{Bounds, GpsPoint};

/// Preference key for the satellite map style.
pub const PREF_SATELLITE: &str = "isSatellite";
/// Preference key for course-up (rotating) navigation.
pub const PREF_COURSE_UP: &str = "isCourseUp";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPosition {
    pub target: GpsPoint,
    pub zoom: f32,
    /// Rotates the map so this heading points up
    pub bearing_deg: Option<f64>,
}

/// Map surface that can draw a path and move its camera.
pub trait MapDisplay {
    fn set_camera_position(&mut self, camera: CameraPosition);
    fn append_polyline_point(&mut self, point: GpsPoint);
    fn fit_bounds(&mut self, bounds: &Bounds, padding_px: u32);
    fn set_map_style(&mut self, satellite: bool);
    fn set_rotation_enabled(&mut self, enabled: bool);
}

/// Persisted key/value user preferences.
pub trait Preferences {
    fn get_bool(&self, key: &str, default: bool) -> bool;
    fn set_bool(&mut self, key: &str, value: bool);
}

/// Display mode chosen by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSettings {
    pub satellite: bool,
    /// Map rotates with the direction of travel instead of north-up
    pub course_up: bool,
}

impl MapSettings {
    pub fn load(prefs: &dyn Preferences) -> Self {
        Self {
            satellite: prefs.get_bool(PREF_SATELLITE, false),
            course_up: prefs.get_bool(PREF_COURSE_UP, false),
        }
    }

    pub fn save(&self, prefs: &mut dyn Preferences) {
        prefs.set_bool(PREF_SATELLITE, self.satellite);
        prefs.set_bool(PREF_COURSE_UP, self.course_up);
    }

    pub fn apply(&self, display: &mut dyn MapDisplay) {
        display.set_map_style(self.satellite);
        display.set_rotation_enabled(self.course_up);
    }
}

/// Live view of a recording: draws the path as it grows and follows the
/// latest fix.
pub struct RecordingMapView<D: MapDisplay> {
    display: D,
    settings: MapSettings,
    zoom: f32,
}

impl<D: MapDisplay> RecordingMapView<D> {
    /// Wrap `display`, applying the map settings once up front.
    pub fn new(mut display: D, settings: MapSettings, zoom: f32) -> Self {
        settings.apply(&mut display);
        Self {
            display,
            settings,
            zoom,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn into_display(self) -> D {
        self.display
    }
}

impl<D: MapDisplay + Send> LiveMetricsObserver for RecordingMapView<D> {
    fn on_metrics(&mut self, metrics: &LiveMetrics) {
        let bearing_deg = if self.settings.course_up {
            metrics.bearing_deg
        } else {
            None
        };

        self.display.set_camera_position(CameraPosition {
            target: metrics.position,
            zoom: self.zoom,
            bearing_deg,
        });
        self.display.append_polyline_point(metrics.position);
    }
}
