//! Arrival-time projection.
//!
//! The remaining distance to a stop respects the vehicle's current
//! direction: a vehicle moving *away* from a stop must first reach the route
//! endpoint, reverse, and come back, and the projected distance includes
//! that detour — never a negative value or a wraparound shortcut.

use std::sync::Arc;

use bt_core::Timestamp;
use bt_route::RoutePath;

use crate::error::QueryError;
use crate::snapshot::VehicleSnapshot;
use crate::state::Direction;

// ── Result types ─────────────────────────────────────────────────────────────

/// A projected arrival at one stop.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Eta {
    pub stop: String,
    /// Remaining path distance, direction-aware, km.
    pub distance_km: f64,
    pub eta_minutes: f64,
    /// Absolute wall-clock arrival time.
    pub eta_time: Timestamp,
}

/// One entry of a batch ETA request.
///
/// A stop lookup failure is recorded here instead of aborting the batch, so
/// one bad stop name never suppresses the results for the others.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StopEta {
    Ready(Eta),
    UnknownStop { stop: String },
}

// ── EtaEngine ────────────────────────────────────────────────────────────────

/// Projects vehicle snapshots onto arrival times.
///
/// Stateless beyond the shared route and the nominal cruising speed used
/// when a vehicle is dwelling (actual speed 0 would otherwise project an
/// infinite ETA).
pub struct EtaEngine {
    route: Arc<RoutePath>,
    nominal_speed_kmh: f64,
}

impl EtaEngine {
    pub fn new(route: Arc<RoutePath>, nominal_speed_kmh: f64) -> Self {
        Self { route, nominal_speed_kmh }
    }

    /// Project `vehicle`'s arrival at the named stop.
    pub fn eta(
        &self,
        vehicle: &VehicleSnapshot,
        stop_name: &str,
        now: Timestamp,
    ) -> Result<Eta, QueryError> {
        let (_, stop) = self
            .route
            .stop(stop_name)
            .ok_or_else(|| QueryError::UnknownStop(stop_name.to_string()))?;

        let distance_km = remaining_distance_km(
            vehicle.progress_km,
            vehicle.direction,
            stop.progress_km,
            self.route.total_length_km(),
        );

        let speed = if vehicle.speed_kmh > 0.0 {
            vehicle.speed_kmh
        } else {
            self.nominal_speed_kmh
        };
        let eta_minutes = distance_km / speed * 60.0;

        Ok(Eta {
            stop: stop.name.clone(),
            distance_km,
            eta_minutes,
            eta_time: now.plus_minutes(eta_minutes),
        })
    }

    /// Project arrivals at every stop on the route, in traversal order.
    pub fn all_etas(&self, vehicle: &VehicleSnapshot, now: Timestamp) -> Vec<Eta> {
        // Every route stop is known by definition; the lookup cannot miss.
        self.route
            .stops()
            .iter()
            .filter_map(|s| self.eta(vehicle, &s.name, now).ok())
            .collect()
    }

    /// Project arrivals at an arbitrary list of stop names, recording unknown
    /// names in place rather than failing the batch.
    pub fn etas_for<'a>(
        &self,
        vehicle: &VehicleSnapshot,
        stop_names: impl IntoIterator<Item = &'a str>,
        now: Timestamp,
    ) -> Vec<StopEta> {
        stop_names
            .into_iter()
            .map(|name| match self.eta(vehicle, name, now) {
                Ok(eta) => StopEta::Ready(eta),
                Err(_) => StopEta::UnknownStop { stop: name.to_string() },
            })
            .collect()
    }
}

// ── Distance model ───────────────────────────────────────────────────────────

/// Remaining path distance from `progress` to `stop_progress`, respecting
/// the back-and-forth loop semantics.
///
/// Moving towards the stop the distance is direct; moving away it is the
/// detour to the nearer endpoint and back:
///
/// ```text
/// Forward, stop behind:  (total - progress) + (total - stop_progress)
/// Reverse, stop ahead:   progress + stop_progress
/// ```
fn remaining_distance_km(
    progress: f64,
    direction: Direction,
    stop_progress: f64,
    total: f64,
) -> f64 {
    match direction {
        Direction::Forward => {
            if stop_progress >= progress {
                stop_progress - progress
            } else {
                (total - progress) + (total - stop_progress)
            }
        }
        Direction::Reverse => {
            if stop_progress <= progress {
                progress - stop_progress
            } else {
                progress + stop_progress
            }
        }
    }
}
