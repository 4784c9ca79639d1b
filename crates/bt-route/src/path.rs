//! Route polyline and bound stops.
//!
//! # Data layout
//!
//! The polyline is stored as parallel arrays: `points[i]` is the i-th
//! coordinate and `cumulative_km[i]` is the haversine path length from the
//! start of the route to that coordinate (`cumulative_km[0] == 0`).  A
//! vehicle's position is a single scalar — its *progress* in km along the
//! route — and [`RoutePath::position_at`] maps that scalar back to a
//! coordinate with one binary search plus a linear interpolation.
//!
//! Stops are bound to the polyline at construction: each named stop is
//! associated with the polyline index closest to it (haversine scan — this
//! runs once at startup, never on the tick path), which fixes the stop's
//! own progress value used by stop capture and ETA projection.

use bt_core::{GeoPoint, StopId};

use crate::error::{RouteError, RouteResult};

// ── Stop ─────────────────────────────────────────────────────────────────────

/// Input description of a stop, before binding.
#[derive(Clone, Debug)]
pub struct StopSpec {
    pub name: String,
    pub position: GeoPoint,
    /// Per-stop dwell override in seconds; `None` uses the route default.
    pub dwell_secs: Option<u32>,
}

/// A named stop bound to the route polyline.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Stop {
    pub name: String,
    /// The stop's own coordinate (may sit slightly off the polyline).
    pub position: GeoPoint,
    /// Index of the polyline point nearest to `position`.
    pub path_index: usize,
    /// Route progress of the bound polyline point, in km.
    pub progress_km: f64,
    /// How long vehicles dwell here, in seconds.
    pub dwell_secs: u32,
}

// ── RoutePath ────────────────────────────────────────────────────────────────

/// Immutable route geometry: an ordered polyline plus bound stops.
///
/// Constructed once via [`RoutePath::new`]; shared read-only by all vehicles
/// thereafter (typically behind an `Arc`).
#[derive(Debug, serde::Serialize)]
pub struct RoutePath {
    name: String,
    points: Vec<GeoPoint>,
    /// Cumulative haversine distance from the route start to each point.
    /// Same length as `points`; strictly increasing.
    cumulative_km: Vec<f64>,
    /// Stops in traversal order; `path_index` is non-decreasing.
    stops: Vec<Stop>,
}

impl RoutePath {
    /// Validate geometry, bind each stop to its nearest polyline point, and
    /// build the route.
    ///
    /// Fails on degenerate input: fewer than 2 points, duplicate consecutive
    /// points, no stops, duplicate stop names, or stops that bind out of
    /// traversal order.
    pub fn new(
        name: impl Into<String>,
        points: Vec<GeoPoint>,
        stops: Vec<StopSpec>,
        default_dwell_secs: u32,
    ) -> RouteResult<Self> {
        if points.len() < 2 {
            return Err(RouteError::TooFewPoints(points.len()));
        }
        for (i, pair) in points.windows(2).enumerate() {
            if pair[0] == pair[1] {
                return Err(RouteError::DuplicateConsecutivePoints { index: i + 1 });
            }
        }
        if stops.is_empty() {
            return Err(RouteError::NoStops);
        }

        let mut cumulative_km = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumulative_km.push(0.0);
        for pair in points.windows(2) {
            total += pair[0].distance_km(pair[1]);
            cumulative_km.push(total);
        }

        let mut bound: Vec<Stop> = Vec::with_capacity(stops.len());
        for spec in stops {
            if bound.iter().any(|s| s.name == spec.name) {
                return Err(RouteError::DuplicateStopName(spec.name));
            }
            let path_index = nearest_index(&points, spec.position);
            if let Some(prev) = bound.last() {
                if path_index < prev.path_index {
                    return Err(RouteError::StopsOutOfOrder {
                        stop:     spec.name,
                        bound:    path_index,
                        previous: prev.path_index,
                    });
                }
            }
            bound.push(Stop {
                name: spec.name,
                position: spec.position,
                path_index,
                progress_km: cumulative_km[path_index],
                dwell_secs: spec.dwell_secs.unwrap_or(default_dwell_secs),
            });
        }

        Ok(Self {
            name: name.into(),
            points,
            cumulative_km,
            stops: bound,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Total route length in km.
    #[inline]
    pub fn total_length_km(&self) -> f64 {
        *self
            .cumulative_km
            .last()
            .unwrap_or(&0.0) // unreachable: construction requires ≥ 2 points
    }

    /// Look up a stop by name, with its traversal-order ID.
    pub fn stop(&self, name: &str) -> Option<(StopId, &Stop)> {
        self.stops
            .iter()
            .position(|s| s.name == name)
            .map(|i| (StopId(i as u16), &self.stops[i]))
    }

    pub fn stop_by_id(&self, id: StopId) -> Option<&Stop> {
        self.stops.get(id.index())
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    /// Coordinate at cumulative distance `progress_km` along the polyline.
    ///
    /// Interpolates linearly between the two bracketing points; progress
    /// outside `[0, total_length_km]` is clamped to the endpoints.
    pub fn position_at(&self, progress_km: f64) -> GeoPoint {
        let total = self.total_length_km();
        let p = progress_km.clamp(0.0, total);

        // First index whose cumulative distance is >= p; in [1, len-1]
        // because cumulative_km[0] == 0 and p <= total.
        let hi = self
            .cumulative_km
            .partition_point(|&c| c < p)
            .clamp(1, self.points.len() - 1);
        let lo = hi - 1;

        let seg = self.cumulative_km[hi] - self.cumulative_km[lo];
        if seg <= f64::EPSILON {
            return self.points[lo];
        }
        let t = (p - self.cumulative_km[lo]) / seg;
        self.points[lo].lerp(self.points[hi], t)
    }

    /// Polyline index geodesically closest to `point`.
    ///
    /// Linear haversine scan — used once per stop at construction, not on
    /// the tick path.
    pub fn nearest_point_index(&self, point: GeoPoint) -> usize {
        nearest_index(&self.points, point)
    }
}

fn nearest_index(points: &[GeoPoint], target: GeoPoint) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, p) in points.iter().enumerate() {
        let d = p.distance_km(target);
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}
