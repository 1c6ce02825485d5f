//! Recording configuration.
//!
//! Every field has a default, so a host only needs to supply what it wants
//! to change. JSON documents use camelCase keys.

use serde::{Deserialize, Serialize};

use crate::error::{RecordError, Result};

/// How hard the location provider should try for an accurate fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationPriority {
    HighAccuracy,
    Balanced,
    LowPower,
}

/// Subscription parameters handed to the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRequest {
    pub interval_ms: u64,
    pub priority: LocationPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrailConfig {
    /// Database file name inside the host's data directory.
    /// Default: "TrailDatabase.db"
    pub database_name: String,

    /// Requested interval between location fixes.
    /// Default: 5000 ms
    pub update_interval_ms: u64,

    /// Default: high accuracy
    pub priority: LocationPriority,

    /// Camera zoom while following a recording.
    /// Default: 17.0
    pub follow_zoom: f32,

    /// Padding around the trail when fitting the camera to it.
    /// Default: 100 px
    pub fit_padding_px: u32,

    /// Upper bound on how long a write waits for a locked database.
    /// Default: 2000 ms
    pub busy_timeout_ms: u64,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            database_name: "TrailDatabase.db".to_string(),
            update_interval_ms: 5_000,
            priority: LocationPriority::HighAccuracy,
            follow_zoom: 17.0,
            fit_padding_px: 100,
            busy_timeout_ms: 2_000,
        }
    }
}

impl TrailConfig {
    /// Parse a (possibly partial) JSON document over the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RecordError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_name.trim().is_empty() {
            return Err(RecordError::Config("databaseName is empty".to_string()));
        }
        if self.update_interval_ms == 0 {
            return Err(RecordError::Config(
                "updateIntervalMs must be positive".to_string(),
            ));
        }
        if self.busy_timeout_ms == 0 {
            return Err(RecordError::Config(
                "busyTimeoutMs must be positive".to_string(),
            ));
        }
        if self.follow_zoom.is_nan() || self.follow_zoom <= 0.0 {
            return Err(RecordError::Config(format!(
                "followZoom must be positive, got {}",
                self.follow_zoom
            )));
        }
        Ok(())
    }

    pub fn location_request(&self) -> LocationRequest {
        LocationRequest {
            interval_ms: self.update_interval_ms,
            priority: self.priority,
        }
    }
}
