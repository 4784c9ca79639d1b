//! Immutable per-tick output.

use bt_core::{GeoPoint, Timestamp};

use crate::state::Direction;

/// One vehicle's entry in a [`Snapshot`].
///
/// Carries everything the read side needs — position for geospatial queries,
/// progress and direction for ETA projection and span filtering — so that no
/// query ever has to reach back into the live simulator state.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VehicleSnapshot {
    /// Wire identifier, e.g. `"bus-1"`.
    pub id: String,
    pub position: GeoPoint,
    pub progress_km: f64,
    pub direction: Direction,
    pub speed_kmh: f64,
    /// `false` while dwelling at a stop.
    pub is_moving: bool,
    /// Name of the geodesically closest bound stop.
    pub nearest_stop: String,
}

/// A timestamped, immutable copy of the whole fleet at one tick.
///
/// Produced once per tick by the simulator and published through the hub;
/// prior snapshots are discarded (no history is retained by the core).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub at: Timestamp,
    pub vehicles: Vec<VehicleSnapshot>,
}

impl Snapshot {
    /// Look up a vehicle by its wire identifier.
    pub fn vehicle(&self, id: &str) -> Option<&VehicleSnapshot> {
        self.vehicles.iter().find(|v| v.id == id)
    }
}
