//! # Fix Ingestion Pipeline
//!
//! Turns raw location updates into stored fixes and live metrics.
//!
//! For each update, in order:
//! 1. Drop it if it has no usable position (missing, non-finite, out of range)
//! 2. Step distance to the prior fix (0 for the first fix of the session)
//! 3. Add the step to the cumulative distance
//! 4. Speed in km/h from the provider's instantaneous speed
//! 5. Append the fix to the store under the session's trail id
//! 6. Hand back live metrics for the observer
//! 7. Remember the fix as the prior fix
//!
//! A failed write at step 5 is returned in the outcome and counted; it never
//! stops the pipeline and is not retried.

use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::TrailStore;
use trailcore::{FixId, GpsPoint, LocationFix, haversine_distance};

const MPS_TO_KMH: f64 = 3.6;

/// One callback from the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp_millis: i64,
    /// Instantaneous speed reported by the provider
    pub speed_mps: Option<f64>,
    pub bearing_deg: Option<f64>,
    /// Whether `bearing_deg` carries a real reading
    pub has_bearing: bool,
}

impl LocationUpdate {
    pub fn new(latitude: f64, longitude: f64, timestamp_millis: i64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp_millis,
            speed_mps: None,
            bearing_deg: None,
            has_bearing: false,
        }
    }

    pub fn with_speed(mut self, speed_mps: f64) -> Self {
        self.speed_mps = Some(speed_mps);
        self
    }

    pub fn with_bearing(mut self, bearing_deg: f64) -> Self {
        self.bearing_deg = Some(bearing_deg);
        self.has_bearing = true;
        self
    }

    pub fn position(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }

    /// Bearing only when the provider flagged it as present.
    pub fn bearing(&self) -> Option<f64> {
        if self.has_bearing { self.bearing_deg } else { None }
    }
}

/// Position of the previously accepted fix in this session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriorFix {
    NoPriorFix,
    HasFix(GpsPoint),
}

/// Event emitted for every accepted fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMetrics {
    pub cumulative_distance_km: f64,
    pub step_distance_meters: f64,
    pub speed_kmh: Option<f64>,
    pub position: GpsPoint,
    pub bearing_deg: Option<f64>,
    pub timestamp_millis: i64,
}

/// Result of ingesting one accepted update.
#[derive(Debug)]
pub struct IngestOutcome {
    pub fix: LocationFix,
    pub metrics: LiveMetrics,
    /// Id of the stored fix, or why it could not be stored
    pub stored: Result<FixId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    pub accepted: u64,
    pub dropped: u64,
    pub write_failures: u64,
}

pub struct FixIngestionPipeline {
    trail_id: String,
    store: Arc<dyn TrailStore>,
    prior: PriorFix,
    cumulative_distance_meters: f64,
    stats: IngestStats,
}

impl FixIngestionPipeline {
    pub fn new(trail_id: &str, store: Arc<dyn TrailStore>) -> Self {
        Self {
            trail_id: trail_id.to_string(),
            store,
            prior: PriorFix::NoPriorFix,
            cumulative_distance_meters: 0.0,
            stats: IngestStats::default(),
        }
    }

    pub fn trail_id(&self) -> &str {
        &self.trail_id
    }

    pub fn prior(&self) -> PriorFix {
        self.prior
    }

    pub fn cumulative_distance_meters(&self) -> f64 {
        self.cumulative_distance_meters
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// Process one provider callback to completion.
    ///
    /// Returns `None` when the update was dropped (no position, or an invalid one).
    pub fn ingest(&mut self, update: Option<&LocationUpdate>) -> Option<IngestOutcome> {
        let Some(update) = update else {
            debug!("trailrec: [Ingest] Empty location result, skipping");
            self.stats.dropped += 1;
            return None;
        };

        let position = update.position();
        if !position.is_valid() {
            warn!(
                "trailrec: [Ingest] Dropping fix with invalid position ({}, {})",
                update.latitude, update.longitude
            );
            self.stats.dropped += 1;
            return None;
        }

        let step_distance_meters = match self.prior {
            PriorFix::NoPriorFix => 0.0,
            PriorFix::HasFix(last) => haversine_distance(&last, &position),
        };
        self.cumulative_distance_meters += step_distance_meters;

        let speed_kmh = update.speed_mps.map(|mps| mps * MPS_TO_KMH);

        let fix = LocationFix::new(
            &self.trail_id,
            update.latitude,
            update.longitude,
            update.timestamp_millis,
        );
        let stored = self.store.append(&fix);
        match &stored {
            Ok(id) => {
                debug!(
                    "trailrec: [Ingest] Stored fix {} (step {:.1}m, total {:.1}m)",
                    id.0, step_distance_meters, self.cumulative_distance_meters
                );
            }
            Err(e) => {
                self.stats.write_failures += 1;
                warn!(
                    "trailrec: [Ingest] Fix not persisted for trail {} ({} failures so far): {}",
                    self.trail_id, self.stats.write_failures, e
                );
            }
        }

        let metrics = LiveMetrics {
            cumulative_distance_km: self.cumulative_distance_meters / 1000.0,
            step_distance_meters,
            speed_kmh,
            position,
            bearing_deg: update.bearing(),
            timestamp_millis: update.timestamp_millis,
        };

        self.prior = PriorFix::HasFix(position);
        self.stats.accepted += 1;

        Some(IngestOutcome {
            fix: LocationFix {
                id: stored.as_ref().ok().copied(),
                ..fix
            },
            metrics,
            stored,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
