//! # Session Manager
//!
//! Owns the lifecycle of one recording: `Idle -> Recording -> Stopped`.
//!
//! ## Subscription
//!
//! Starting a recording subscribes to the location provider, which pushes
//! updates into a channel owned by the session. [`SessionManager::pump`]
//! drains that channel, running each update through the ingestion pipeline to
//! completion before taking the next, so per-trail order is preserved and no
//! two fixes are ever in flight at once. Hosts that receive callbacks directly
//! can call [`SessionManager::ingest`] instead.
//!
//! If location permission is missing the session still starts (the trail id
//! exists) but ingests nothing until [`SessionManager::retry_subscription`]
//! succeeds.
//!
//! ## Teardown
//!
//! `stop` releases the subscription and is safe to call any number of times,
//! including when no subscription was ever established. Updates still queued
//! in the channel at that point are discarded. Fixes already ingested stay in
//! the store. Dropping the manager stops the session.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{LocationRequest, TrailConfig};
use crate::error::{RecordError, Result};
use crate::ingest::{FixIngestionPipeline, LiveMetrics, LocationUpdate};
use crate::store::TrailStore;

/// Source of location fixes. `None` in the channel is an empty result.
pub trait LocationProvider: Send {
    fn request_updates(
        &mut self,
        request: &LocationRequest,
        sink: Sender<Option<LocationUpdate>>,
    ) -> std::result::Result<(), String>;

    /// Stop delivering updates. Must tolerate being called without an active
    /// subscription.
    fn remove_updates(&mut self);
}

/// OS-level location permission.
pub trait PermissionGate: Send {
    fn has_location_permission(&self) -> bool;

    /// Ask the user; the answer arrives out of band.
    fn request_location_permission(&mut self);
}

/// Receives live metrics for every accepted fix.
pub trait LiveMetricsObserver: Send {
    fn on_metrics(&mut self, metrics: &LiveMetrics);
}

impl<F> LiveMetricsObserver for F
where
    F: FnMut(&LiveMetrics) + Send,
{
    fn on_metrics(&mut self, metrics: &LiveMetrics) {
        self(metrics)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Recording,
    Stopped,
}

impl SessionState {
    fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Stopped => "stopped",
        }
    }
}

/// What a finished session leaves behind besides its stored fixes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub trail_id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    pub accepted_fixes: u64,
    pub dropped_fixes: u64,
    pub write_failures: u64,
    pub cumulative_distance_meters: f64,
}

enum Subscription {
    AwaitingPermission,
    Active(Receiver<Option<LocationUpdate>>),
}

/// In-memory state of the active recording.
struct RecordingSession {
    pipeline: FixIngestionPipeline,
    started_at: DateTime<Utc>,
    subscription: Subscription,
}

enum Phase {
    Idle,
    Recording(RecordingSession),
    Stopped(SessionReport),
}

pub struct SessionManager {
    store: Arc<dyn TrailStore>,
    provider: Box<dyn LocationProvider>,
    permissions: Box<dyn PermissionGate>,
    observer: Option<Box<dyn LiveMetricsObserver>>,
    config: TrailConfig,
    phase: Phase,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn TrailStore>,
        provider: Box<dyn LocationProvider>,
        permissions: Box<dyn PermissionGate>,
        config: TrailConfig,
    ) -> Self {
        Self {
            store,
            provider,
            permissions,
            observer: None,
            config,
            phase: Phase::Idle,
        }
    }

    /// Attach the observer that receives live metrics.
    pub fn with_observer(mut self, observer: Box<dyn LiveMetricsObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Recording(_) => SessionState::Recording,
            Phase::Stopped(_) => SessionState::Stopped,
        }
    }

    /// Trail id of the current (or last stopped) session.
    pub fn trail_id(&self) -> Option<&str> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Recording(session) => Some(session.pipeline.trail_id()),
            Phase::Stopped(report) => Some(&report.trail_id),
        }
    }

    /// Whether fixes are currently being received.
    pub fn is_subscribed(&self) -> bool {
        matches!(
            &self.phase,
            Phase::Recording(RecordingSession {
                subscription: Subscription::Active(_),
                ..
            })
        )
    }

    /// Running distance of the active recording.
    pub fn cumulative_distance_meters(&self) -> Option<f64> {
        match &self.phase {
            Phase::Recording(session) => Some(session.pipeline.cumulative_distance_meters()),
            Phase::Stopped(report) => Some(report.cumulative_distance_meters),
            Phase::Idle => None,
        }
    }

    /// Time since the active recording started.
    pub fn elapsed(&self) -> Option<Duration> {
        match &self.phase {
            Phase::Recording(session) => Some(Utc::now() - session.started_at),
            Phase::Stopped(report) => Some(report.stopped_at - report.started_at),
            Phase::Idle => None,
        }
    }

    /// Begin a new recording under a fresh trail id.
    ///
    /// Returns the trail id. On `PermissionDenied` the session has still
    /// started; call [`Self::retry_subscription`] once permission is granted.
    pub fn start(&mut self) -> Result<String> {
        if let Phase::Recording(_) = self.phase {
            return Err(RecordError::InvalidState {
                operation: "start",
                state: self.state().as_str(),
            });
        }

        let trail_id = Uuid::new_v4().to_string();
        info!("trailrec: [Session] Starting recording {}", trail_id);

        self.phase = Phase::Recording(RecordingSession {
            pipeline: FixIngestionPipeline::new(&trail_id, self.store.clone()),
            started_at: Utc::now(),
            subscription: Subscription::AwaitingPermission,
        });

        self.subscribe()?;
        Ok(trail_id)
    }

    /// Subscribe to location updates after a permission denial.
    pub fn retry_subscription(&mut self) -> Result<()> {
        match &self.phase {
            Phase::Recording(RecordingSession {
                subscription: Subscription::Active(_),
                ..
            }) => Ok(()),
            Phase::Recording(_) => self.subscribe(),
            _ => Err(RecordError::InvalidState {
                operation: "subscribe",
                state: self.state().as_str(),
            }),
        }
    }

    fn subscribe(&mut self) -> Result<()> {
        let Phase::Recording(session) = &mut self.phase else {
            return Ok(());
        };

        if !self.permissions.has_location_permission() {
            warn!(
                "trailrec: [Session] Location permission missing for {}, requesting",
                session.pipeline.trail_id()
            );
            self.permissions.request_location_permission();
            return Err(RecordError::PermissionDenied);
        }

        let (sender, receiver) = mpsc::channel();
        self.provider
            .request_updates(&self.config.location_request(), sender)
            .map_err(RecordError::Provider)?;

        session.subscription = Subscription::Active(receiver);
        info!(
            "trailrec: [Session] Subscribed to location updates every {}ms",
            self.config.update_interval_ms
        );
        Ok(())
    }

    /// Run one update through the pipeline. Ignored unless recording with an
    /// active subscription.
    pub fn ingest(&mut self, update: Option<LocationUpdate>) -> Option<LiveMetrics> {
        let Phase::Recording(session) = &mut self.phase else {
            return None;
        };
        if !matches!(session.subscription, Subscription::Active(_)) {
            return None;
        }

        let outcome = session.pipeline.ingest(update.as_ref())?;
        if let Some(observer) = self.observer.as_mut() {
            observer.on_metrics(&outcome.metrics);
        }
        Some(outcome.metrics)
    }

    /// Process every update the provider has queued so far, in order.
    ///
    /// Returns the number of updates taken from the channel.
    pub fn pump(&mut self) -> usize {
        let pending: Vec<Option<LocationUpdate>> = match &self.phase {
            Phase::Recording(RecordingSession {
                subscription: Subscription::Active(receiver),
                ..
            }) => receiver.try_iter().collect(),
            _ => return 0,
        };

        let count = pending.len();
        for update in pending {
            self.ingest(update);
        }
        count
    }

    /// End the recording. Idempotent; returns the report of the last session,
    /// or `None` if nothing was ever recorded.
    pub fn stop(&mut self) -> Option<SessionReport> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => None,
            Phase::Stopped(report) => {
                self.phase = Phase::Stopped(report.clone());
                Some(report)
            }
            Phase::Recording(session) => {
                if let Subscription::Active(_) = session.subscription {
                    self.provider.remove_updates();
                }

                let stats = session.pipeline.stats();
                let report = SessionReport {
                    trail_id: session.pipeline.trail_id().to_string(),
                    started_at: session.started_at,
                    stopped_at: Utc::now(),
                    accepted_fixes: stats.accepted,
                    dropped_fixes: stats.dropped,
                    write_failures: stats.write_failures,
                    cumulative_distance_meters: session.pipeline.cumulative_distance_meters(),
                };

                info!(
                    "trailrec: [Session] Stopped {}: {} fixes, {:.1}m, {} write failures",
                    report.trail_id,
                    report.accepted_fixes,
                    report.cumulative_distance_meters,
                    report.write_failures
                );

                self.phase = Phase::Stopped(report.clone());
                Some(report)
            }
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// Tests
// ============================================================================
