//! Per-vehicle motion state.

use bt_core::{StopId, Timestamp, VehicleId};

// ── Direction ────────────────────────────────────────────────────────────────

/// Traversal direction along the route polyline.
///
/// The route is driven as a continuous back-and-forth loop: progress grows
/// towards `total_length_km` going `Forward`, shrinks towards 0 going
/// `Reverse`, and the direction flips exactly at the two endpoints.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    #[inline]
    pub fn flip(self) -> Direction {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

// ── VehicleState ─────────────────────────────────────────────────────────────

/// The mutable motion record of one vehicle.
///
/// Created at startup and alive for the whole process; mutated exclusively
/// by [`VehicleSimulator::advance_all`][crate::VehicleSimulator::advance_all].
/// Readers only ever see copies of this data inside published
/// [`Snapshot`][crate::Snapshot]s.
#[derive(Clone, Debug)]
pub struct VehicleState {
    pub id: VehicleId,

    /// Public wire identifier, e.g. `"bus-2"`.
    pub label: String,

    /// Cumulative distance travelled along the polyline, km, always within
    /// `[0, total_length_km]`.
    pub progress_km: f64,

    pub direction: Direction,

    /// Current scalar speed; 0 while dwelling, otherwise within the
    /// configured band.
    pub speed_kmh: f64,

    /// While `now < dwell_until` the vehicle is parked at a stop.
    pub dwell_until: Option<Timestamp>,

    /// When this vehicle last advanced — elapsed time per tick is computed
    /// from it, so the model is robust to variable tick intervals.
    pub last_tick_at: Timestamp,

    /// The stop this vehicle is dwelling at, or most recently dwelled at and
    /// has not yet moved clear of.  Prevents re-capturing the same stop on
    /// the same pass.
    pub dwelled_stop: Option<StopId>,
}

impl VehicleState {
    pub fn new(
        id: VehicleId,
        label: String,
        progress_km: f64,
        speed_kmh: f64,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            label,
            progress_km,
            direction: Direction::Forward,
            speed_kmh,
            dwell_until: None,
            last_tick_at: now,
            dwelled_stop: None,
        }
    }

    /// `true` while the dwell window is still open.
    #[inline]
    pub fn is_dwelling(&self, now: Timestamp) -> bool {
        self.dwell_until.is_some_and(|until| now < until)
    }
}
