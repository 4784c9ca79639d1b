//! JSON route configuration loading.
//!
//! The on-disk shape matches the tracker's `routes.json`:
//!
//! ```json
//! {
//!   "bus_route": {
//!     "name": "Campus Loop",
//!     "coordinates": [[40.4168, -3.7038], [40.4172, -3.7031]],
//!     "stops": [
//!       { "name": "Main Gate", "lat": 40.4168, "lon": -3.7038, "wait_time": 30 }
//!     ]
//!   }
//! }
//! ```
//!
//! Coordinates are `[lat, lon]` pairs.  `wait_time` (seconds) is optional
//! per stop and falls back to the caller-supplied default dwell.

use std::fs;
use std::path::Path;

use bt_core::GeoPoint;
use serde::Deserialize;

use crate::error::RouteResult;
use crate::path::{RoutePath, StopSpec};

// ── Config types ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RouteFile {
    bus_route: RouteConfig,
}

/// The `bus_route` object of a route config file.
#[derive(Debug, Deserialize)]
pub struct RouteConfig {
    pub name: String,
    /// Polyline as `[lat, lon]` pairs.
    pub coordinates: Vec<[f64; 2]>,
    pub stops: Vec<StopConfig>,
}

#[derive(Debug, Deserialize)]
pub struct StopConfig {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Dwell override in seconds.
    #[serde(default)]
    pub wait_time: Option<u32>,
}

// ── Loading ──────────────────────────────────────────────────────────────────

/// Parse a route config from a JSON string and build the validated
/// [`RoutePath`].
pub fn load_route_str(json: &str, default_dwell_secs: u32) -> RouteResult<RoutePath> {
    let file: RouteFile = serde_json::from_str(json)?;
    build(file.bus_route, default_dwell_secs)
}

/// Read and parse a route config file.
pub fn load_route_file(
    path: impl AsRef<Path>,
    default_dwell_secs: u32,
) -> RouteResult<RoutePath> {
    let json = fs::read_to_string(path)?;
    load_route_str(&json, default_dwell_secs)
}

fn build(config: RouteConfig, default_dwell_secs: u32) -> RouteResult<RoutePath> {
    let points = config
        .coordinates
        .iter()
        .map(|&[lat, lon]| GeoPoint::new(lat, lon))
        .collect();
    let stops = config
        .stops
        .into_iter()
        .map(|s| StopSpec {
            position: GeoPoint::new(s.lat, s.lon),
            name: s.name,
            dwell_secs: s.wait_time,
        })
        .collect();
    RoutePath::new(config.name, points, stops, default_dwell_secs)
}
