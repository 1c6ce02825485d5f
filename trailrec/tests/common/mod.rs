//! Fakes for the host-side collaborators: location provider, permission
//! gate, preferences and map surface.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use trailrec::{
    Bounds, CameraPosition, GpsPoint, LocationProvider, LocationRequest, LocationUpdate,
    MapDisplay, PermissionGate, Preferences,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Shared view of a [`ScriptedProvider`] that stays with the test after the
/// provider is boxed into a session.
#[derive(Clone, Default)]
pub struct ProviderHandle {
    sink: Arc<Mutex<Option<Sender<Option<LocationUpdate>>>>>,
    requests: Arc<Mutex<Vec<LocationRequest>>>,
    removals: Arc<AtomicU32>,
}

impl ProviderHandle {
    /// Deliver one callback. Returns false when nobody is subscribed.
    pub fn deliver(&self, update: Option<LocationUpdate>) -> bool {
        match self.sink.lock().unwrap().as_ref() {
            Some(sink) => sink.send(update).is_ok(),
            None => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.sink.lock().unwrap().is_some()
    }

    pub fn requests(&self) -> Vec<LocationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn removals(&self) -> u32 {
        self.removals.load(Ordering::SeqCst)
    }
}

pub struct ScriptedProvider {
    handle: ProviderHandle,
}

impl ScriptedProvider {
    pub fn new() -> (Self, ProviderHandle) {
        let handle = ProviderHandle::default();
        (
            Self {
                handle: handle.clone(),
            },
            handle,
        )
    }
}

impl LocationProvider for ScriptedProvider {
    fn request_updates(
        &mut self,
        request: &LocationRequest,
        sink: Sender<Option<LocationUpdate>>,
    ) -> Result<(), String> {
        self.handle.requests.lock().unwrap().push(*request);
        *self.handle.sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn remove_updates(&mut self) {
        self.handle.sink.lock().unwrap().take();
        self.handle.removals.fetch_add(1, Ordering::SeqCst);
    }
}

/// Permission that the test can grant or revoke at any time.
#[derive(Clone)]
pub struct SwitchablePermission {
    granted: Arc<AtomicBool>,
    prompts: Arc<AtomicU32>,
}

impl SwitchablePermission {
    pub fn new(granted: bool) -> Self {
        Self {
            granted: Arc::new(AtomicBool::new(granted)),
            prompts: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn grant(&self) {
        self.granted.store(true, Ordering::SeqCst);
    }

    pub fn prompts(&self) -> u32 {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl PermissionGate for SwitchablePermission {
    fn has_location_permission(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn request_location_permission(&mut self) {
        self.prompts.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MemoryPrefs(pub HashMap<String, bool>);

impl Preferences for MemoryPrefs {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.0.get(key).copied().unwrap_or(default)
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.0.insert(key.to_string(), value);
    }
}

/// Map surface that records every call made on it.
#[derive(Debug, Default)]
pub struct RecordedMap {
    pub cameras: Vec<CameraPosition>,
    pub path: Vec<GpsPoint>,
    pub fitted: Option<(Bounds, u32)>,
    pub satellite: Option<bool>,
    pub rotation: Option<bool>,
}

impl MapDisplay for RecordedMap {
    fn set_camera_position(&mut self, camera: CameraPosition) {
        self.cameras.push(camera);
    }

    fn append_polyline_point(&mut self, point: GpsPoint) {
        self.path.push(point);
    }

    fn fit_bounds(&mut self, bounds: &Bounds, padding_px: u32) {
        self.fitted = Some((*bounds, padding_px));
    }

    fn set_map_style(&mut self, satellite: bool) {
        self.satellite = Some(satellite);
    }

    fn set_rotation_enabled(&mut self, enabled: bool) {
        self.rotation = Some(enabled);
    }
}

/// Map surface shared between a live view (moved into a session) and the test.
#[derive(Clone, Default)]
pub struct SharedMap(pub Arc<Mutex<RecordedMap>>);

impl MapDisplay for SharedMap {
    fn set_camera_position(&mut self, camera: CameraPosition) {
        self.0.lock().unwrap().set_camera_position(camera);
    }

    fn append_polyline_point(&mut self, point: GpsPoint) {
        self.0.lock().unwrap().append_polyline_point(point);
    }

    fn fit_bounds(&mut self, bounds: &Bounds, padding_px: u32) {
        self.0.lock().unwrap().fit_bounds(bounds, padding_px);
    }

    fn set_map_style(&mut self, satellite: bool) {
        self.0.lock().unwrap().set_map_style(satellite);
    }

    fn set_rotation_enabled(&mut self, enabled: bool) {
        self.0.lock().unwrap().set_rotation_enabled(enabled);
    }
}

/// A walk heading east along the equator, one fix every 5 s, ~111 m apart.
pub fn eastward_walk(fixes: usize) -> Vec<LocationUpdate> {
    (0..fixes)
        .map(|i| {
            LocationUpdate::new(0.0, i as f64 * 0.001, i as i64 * 5_000)
                .with_speed(22.2)
                .with_bearing(90.0)
        })
        .collect()
}
