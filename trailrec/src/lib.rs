//! Trailrec - recording and replaying GPS trails
//!
//! This crate provides:
//! - SQLite trail store with in-place schema migrations
//! - Fix ingestion pipeline computing live distance and speed
//! - Trail aggregator producing summaries and renderable paths
//! - Session manager owning the lifecycle of one recording
//!
//! Map rendering, location delivery, permissions and preferences are
//! collaborators reached through the traits in [`display`] and [`session`].

// Re-export all public types from trailcore
pub use trailcore::*;

pub mod config;
pub use config::{LocationPriority, LocationRequest, TrailConfig};

pub mod error;
pub use error::{RecordError, Result, StoreAccess};

// Schema migrations for the trail store
pub mod migrations;

// Persistence layer with SQLite storage
pub mod store;
pub use store::{SqliteTrailStore, TrailListing, TrailStore};

// Raw fix -> accepted fix + live metrics
pub mod ingest;
pub use ingest::{
    FixIngestionPipeline, IngestOutcome, IngestStats, LiveMetrics, LocationUpdate, PriorFix,
};

// Summaries and renderable paths for stored trails
pub mod aggregate;
pub use aggregate::{TrailAggregator, TrailReport, TrailView};

// Map display and preference collaborators
pub mod display;
pub use display::{CameraPosition, MapDisplay, MapSettings, Preferences, RecordingMapView};

// Recording lifecycle
pub mod session;
pub use session::{
    LiveMetricsObserver, LocationProvider, PermissionGate, SessionManager, SessionReport,
    SessionState,
};

/// Initialize logging for Android
#[cfg(target_os = "android")]
pub fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("trailrec"),
    );
}

#[cfg(not(target_os = "android"))]
pub fn init_logging() {
    // No-op on non-Android platforms
}
