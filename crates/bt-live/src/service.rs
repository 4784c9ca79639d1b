//! The query surface consumed by the transport layer.
//!
//! Every operation here reads the latest published snapshot — never the
//! live simulator — so any number of callers can run concurrently with the
//! tick without coordination.

use std::sync::Arc;

use bt_core::{Clock, GeoPoint, Timestamp};
use bt_route::RoutePath;
use bt_sim::{
    Eta, EtaEngine, NearestVehicle, QueryError, Snapshot, StopEta, VehicleSnapshot, geoindex,
};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::hub::{BroadcastHub, SnapshotStream};

// ── Result types ─────────────────────────────────────────────────────────────

/// The vehicle with the smallest projected ETA to a stop.
#[derive(Clone, Debug, serde::Serialize)]
pub struct BestEta {
    pub vehicle: VehicleSnapshot,
    pub eta: Eta,
}

/// Outcome of an arrival-notification window check.
#[derive(Clone, Debug, serde::Serialize)]
pub struct NotificationCheck {
    pub stop: String,
    pub should_notify: bool,
    /// Best ETA across the fleet, if any vehicle is projected to arrive.
    pub eta_minutes: Option<f64>,
    pub eta_time: Option<Timestamp>,
}

// ── TrackerService ───────────────────────────────────────────────────────────

/// Handle to a running simulation: the external operations plus shutdown.
///
/// Cheap operations throughout — each one is a pointer load of the latest
/// snapshot plus a linear pass over a handful of vehicles or stops.
pub struct TrackerService {
    route: Arc<RoutePath>,
    hub: Arc<BroadcastHub>,
    clock: Arc<dyn Clock>,
    eta_engine: EtaEngine,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TrackerService {
    pub(crate) fn new(
        route: Arc<RoutePath>,
        hub: Arc<BroadcastHub>,
        clock: Arc<dyn Clock>,
        nominal_speed_kmh: f64,
        shutdown: watch::Sender<bool>,
        task: JoinHandle<()>,
    ) -> Self {
        let eta_engine = EtaEngine::new(route.clone(), nominal_speed_kmh);
        Self {
            route,
            hub,
            clock,
            eta_engine,
            shutdown,
            task: Mutex::new(Some(task)),
        }
    }

    // ── Snapshot queries ──────────────────────────────────────────────────

    /// Current positions of all vehicles.
    pub fn vehicles(&self) -> Arc<Snapshot> {
        self.hub.latest()
    }

    /// Vehicles currently between the two named stops (inclusive span,
    /// direction-agnostic).
    pub fn vehicles_between(
        &self,
        from_stop: &str,
        to_stop: &str,
    ) -> Result<Vec<VehicleSnapshot>, QueryError> {
        geoindex::vehicles_between(&self.route, &self.hub.latest(), from_stop, to_stop)
    }

    /// The vehicle closest to `point`, or `None` on an empty fleet.
    pub fn nearest_vehicle(&self, point: GeoPoint) -> Option<NearestVehicle> {
        geoindex::nearest_vehicle(&self.hub.latest(), point)
    }

    // ── ETA queries ───────────────────────────────────────────────────────

    /// One vehicle's projected arrival at one stop.
    pub fn vehicle_eta(&self, vehicle_id: &str, stop_name: &str) -> Result<Eta, QueryError> {
        let snapshot = self.hub.latest();
        let vehicle = lookup_vehicle(&snapshot, vehicle_id)?;
        self.eta_engine.eta(vehicle, stop_name, self.clock.now())
    }

    /// Projected arrivals at every stop on the route for one vehicle.
    pub fn all_etas(&self, vehicle_id: &str) -> Result<Vec<Eta>, QueryError> {
        let snapshot = self.hub.latest();
        let vehicle = lookup_vehicle(&snapshot, vehicle_id)?;
        Ok(self.eta_engine.all_etas(vehicle, self.clock.now()))
    }

    /// Batch ETA over arbitrary stop names; unknown names are recorded per
    /// entry instead of failing the batch.
    pub fn etas_for<'a>(
        &self,
        vehicle_id: &str,
        stop_names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<StopEta>, QueryError> {
        let snapshot = self.hub.latest();
        let vehicle = lookup_vehicle(&snapshot, vehicle_id)?;
        Ok(self.eta_engine.etas_for(vehicle, stop_names, self.clock.now()))
    }

    /// The vehicle with the smallest ETA to the named stop, or `None` on an
    /// empty fleet.
    pub fn nearest_vehicle_to_stop(&self, stop_name: &str) -> Result<Option<BestEta>, QueryError> {
        // Validate the stop up front so "unknown stop" and "no vehicles"
        // stay distinguishable.
        self.route
            .stop(stop_name)
            .ok_or_else(|| QueryError::UnknownStop(stop_name.to_string()))?;

        let snapshot = self.hub.latest();
        let now = self.clock.now();

        let mut best: Option<BestEta> = None;
        for vehicle in &snapshot.vehicles {
            let eta = self.eta_engine.eta(vehicle, stop_name, now)?;
            if best.as_ref().is_none_or(|b| eta.eta_minutes < b.eta.eta_minutes) {
                best = Some(BestEta { vehicle: vehicle.clone(), eta });
            }
        }
        Ok(best)
    }

    /// Should a rider watching `stop_name` be notified now?  True when the
    /// best ETA across the fleet falls within `minutes_before` (and the bus
    /// has not already arrived).
    pub fn notification_due(
        &self,
        stop_name: &str,
        minutes_before: f64,
    ) -> Result<NotificationCheck, QueryError> {
        let best = self.nearest_vehicle_to_stop(stop_name)?;
        let (eta_minutes, eta_time) = match &best {
            Some(b) => (Some(b.eta.eta_minutes), Some(b.eta.eta_time)),
            None => (None, None),
        };
        Ok(NotificationCheck {
            stop: stop_name.to_string(),
            should_notify: eta_minutes.is_some_and(|m| m > 0.0 && m <= minutes_before),
            eta_minutes,
            eta_time,
        })
    }

    // ── Route metadata ────────────────────────────────────────────────────

    pub fn route(&self) -> &Arc<RoutePath> {
        &self.route
    }

    // ── Streaming ─────────────────────────────────────────────────────────

    /// A push stream of every snapshot published from now on.
    pub fn subscribe(&self) -> SnapshotStream {
        self.hub.subscribe()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Stop the scheduler task and wait for it to exit.  Idempotent;
    /// queries keep answering from the last published snapshot afterwards.
    pub async fn shutdown(&self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.lock().await.take() {
            let _ = task.await;
        }
    }
}

fn lookup_vehicle<'s>(
    snapshot: &'s Snapshot,
    vehicle_id: &str,
) -> Result<&'s VehicleSnapshot, QueryError> {
    snapshot
        .vehicle(vehicle_id)
        .ok_or_else(|| QueryError::UnknownVehicle(vehicle_id.to_string()))
}
