//! The per-tick motion state machine.

use std::sync::Arc;

use bt_core::{StopId, Timestamp, VehicleId, VehicleRng};
use bt_route::{RoutePath, Stop};
use log::debug;

use crate::config::SimulatorConfig;
use crate::error::SimResult;
use crate::snapshot::{Snapshot, VehicleSnapshot};
use crate::state::{Direction, VehicleState};

/// Advances every vehicle along the shared route once per tick.
///
/// Vehicles are mutually independent — each advance reads only its own state
/// plus the read-only [`RoutePath`] — so no cross-vehicle coordination is
/// needed.  The simulator is the *only* mutator of [`VehicleState`]; all
/// read paths consume the [`Snapshot`]s it emits.
pub struct VehicleSimulator {
    route: Arc<RoutePath>,
    config: SimulatorConfig,
    vehicles: Vec<VehicleState>,
    /// Parallel to `vehicles`; per-vehicle deterministic speed sampling.
    rngs: Vec<VehicleRng>,
}

impl VehicleSimulator {
    /// Create the fleet with staggered starting positions.
    ///
    /// Vehicle `i` of `n` starts at progress `i * total_length / n`, so the
    /// fleet is spaced evenly around the loop instead of collapsing onto one
    /// point.  The offsets are fixed here and never recomputed.
    pub fn new(
        route: Arc<RoutePath>,
        config: SimulatorConfig,
        now: Timestamp,
    ) -> SimResult<Self> {
        config.validate()?;

        let total = route.total_length_km();
        let n = config.vehicle_count;

        let mut vehicles = Vec::with_capacity(n);
        let mut rngs = Vec::with_capacity(n);
        for i in 0..n {
            let id = VehicleId(i as u32);
            let mut rng = VehicleRng::new(config.seed, id);
            let speed = rng.gen_range(config.min_speed_kmh..=config.max_speed_kmh);
            let progress = total * i as f64 / n as f64;
            vehicles.push(VehicleState::new(id, format!("bus-{}", i + 1), progress, speed, now));
            rngs.push(rng);
        }

        Ok(Self { route, config, vehicles, rngs })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn route(&self) -> &Arc<RoutePath> {
        &self.route
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn vehicles(&self) -> &[VehicleState] {
        &self.vehicles
    }

    pub fn vehicle(&self, label: &str) -> Option<&VehicleState> {
        self.vehicles.iter().find(|v| v.label == label)
    }

    #[cfg(test)]
    pub(crate) fn vehicle_mut(&mut self, index: usize) -> &mut VehicleState {
        &mut self.vehicles[index]
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance every vehicle to `now`.
    pub fn advance_all(&mut self, now: Timestamp) {
        for (v, rng) in self.vehicles.iter_mut().zip(self.rngs.iter_mut()) {
            advance_one(&self.route, &self.config, v, rng, now);
        }
    }

    /// Assemble the immutable snapshot of the fleet at `now`.
    pub fn snapshot(&self, now: Timestamp) -> Snapshot {
        let vehicles = self
            .vehicles
            .iter()
            .map(|v| {
                let position = self.route.position_at(v.progress_km);
                let (_, stop) = self.nearest_stop(v);
                VehicleSnapshot {
                    id: v.label.clone(),
                    position,
                    progress_km: v.progress_km,
                    direction: v.direction,
                    speed_kmh: v.speed_kmh,
                    is_moving: !v.is_dwelling(now),
                    nearest_stop: stop.name.clone(),
                }
            })
            .collect();
        Snapshot { at: now, vehicles }
    }

    /// The stop whose bound polyline position is geodesically closest to the
    /// vehicle's current interpolated coordinate.  Ties break to the lower
    /// stop index (earlier in route order).
    pub fn nearest_stop(&self, vehicle: &VehicleState) -> (StopId, &Stop) {
        let pos = self.route.position_at(vehicle.progress_km);
        let points = self.route.points();

        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for (i, stop) in self.route.stops().iter().enumerate() {
            let d = pos.distance_km(points[stop.path_index]);
            if d < best_d {
                best_d = d;
                best = i;
            }
        }
        // stops() is non-empty by RoutePath construction.
        (StopId(best as u16), &self.route.stops()[best])
    }
}

// ── Per-vehicle advance ──────────────────────────────────────────────────────

fn advance_one(
    route: &RoutePath,
    config: &SimulatorConfig,
    v: &mut VehicleState,
    rng: &mut VehicleRng,
    now: Timestamp,
) {
    // Clamp so a clock hiccup never moves a vehicle backwards.
    let elapsed_secs = now.seconds_since(v.last_tick_at).max(0.0);
    v.last_tick_at = now;

    // DWELLING: wait out the window, then resume at a fresh speed.
    if let Some(until) = v.dwell_until {
        if now < until {
            return;
        }
        v.dwell_until = None;
        v.speed_kmh = rng.gen_range(config.min_speed_kmh..=config.max_speed_kmh);
        debug!("{} resumes at {:.1} km/h", v.label, v.speed_kmh);
    }

    let displacement_km = v.speed_kmh * (elapsed_secs / 3_600.0);
    if displacement_km <= 0.0 {
        return;
    }

    let total = route.total_length_km();
    let from = v.progress_km;

    // Move, clamped to the route; direction flips exactly at the endpoints.
    match v.direction {
        Direction::Forward => {
            let p = from + displacement_km;
            if p >= total {
                v.progress_km = total;
                v.direction = Direction::Reverse;
            } else {
                v.progress_km = p;
            }
        }
        Direction::Reverse => {
            let p = from - displacement_km;
            if p <= 0.0 {
                v.progress_km = 0.0;
                v.direction = Direction::Forward;
            } else {
                v.progress_km = p;
            }
        }
    }

    capture_stop(route, config, v, from, now);

    // Once the vehicle is clear of its last dwell stop, it may be captured
    // there again on a later pass.  Checked AFTER capture: the departing
    // tick's traversed interval still contains the old stop, and clearing
    // first would recapture it immediately.
    if let Some(sid) = v.dwelled_stop {
        if let Some(stop) = route.stop_by_id(sid) {
            if (v.progress_km - stop.progress_km).abs() > config.stop_tolerance_km {
                v.dwelled_stop = None;
            }
        }
    }
}

/// Capture the first stop whose bound position lies in the interval the
/// vehicle just traversed (± tolerance), skipping the stop it last dwelled
/// at.  Captured vehicles snap to the stop and start their dwell window.
fn capture_stop(
    route: &RoutePath,
    config: &SimulatorConfig,
    v: &mut VehicleState,
    from: f64,
    now: Timestamp,
) {
    let tol = config.stop_tolerance_km;
    let lo = from.min(v.progress_km) - tol;
    let hi = from.max(v.progress_km) + tol;

    // First hit along the direction of travel: smallest distance out of `from`.
    let mut hit: Option<(StopId, f64)> = None;
    for (i, stop) in route.stops().iter().enumerate() {
        let sid = StopId(i as u16);
        if v.dwelled_stop == Some(sid) {
            continue;
        }
        if stop.progress_km < lo || stop.progress_km > hi {
            continue;
        }
        let along = match v.direction {
            Direction::Forward => stop.progress_km - from,
            Direction::Reverse => from - stop.progress_km,
        };
        // A flip inside this tick can put the stop slightly "behind" the
        // original direction; the interval check already bounded it.
        let along = along.abs();
        if hit.is_none_or(|(_, d)| along < d) {
            hit = Some((sid, along));
        }
    }

    if let Some((sid, _)) = hit {
        let stop = &route.stops()[sid.index()];
        v.progress_km = stop.progress_km;
        v.speed_kmh = 0.0;
        v.dwell_until = Some(now.plus_secs_f64(stop.dwell_secs as f64));
        v.dwelled_stop = Some(sid);
        debug!("{} dwelling at {:?} for {} s", v.label, stop.name, stop.dwell_secs);
    }
}
