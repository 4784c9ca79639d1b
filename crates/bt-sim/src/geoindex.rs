//! Stateless geospatial queries over a published snapshot.
//!
//! Fleets are tiny (single digits of vehicles), so both queries are plain
//! linear scans over the snapshot using the shared haversine primitive —
//! no spatial index, and results stay consistent with every other distance
//! the core reports.

use bt_core::GeoPoint;
use bt_route::RoutePath;

use crate::error::QueryError;
use crate::snapshot::{Snapshot, VehicleSnapshot};

/// The winner of a nearest-vehicle query.
#[derive(Clone, Debug, serde::Serialize)]
pub struct NearestVehicle {
    pub vehicle: VehicleSnapshot,
    pub distance_km: f64,
}

/// The vehicle closest to `point`, or `None` on an empty fleet (a valid
/// outcome, not an error).
///
/// Ties break to the lowest vehicle id: snapshots list vehicles in creation
/// order and only a strictly smaller distance displaces the current winner.
pub fn nearest_vehicle(snapshot: &Snapshot, point: GeoPoint) -> Option<NearestVehicle> {
    let mut best: Option<NearestVehicle> = None;
    for v in &snapshot.vehicles {
        let d = point.distance_km(v.position);
        if best.as_ref().is_none_or(|b| d < b.distance_km) {
            best = Some(NearestVehicle { vehicle: v.clone(), distance_km: d });
        }
    }
    best
}

/// All vehicles whose progress lies within the span bounded by the two
/// stops, inclusive and direction-agnostic.
///
/// An unknown stop name is a [`QueryError::UnknownStop`] — distinguishable
/// from the valid empty match of a span that simply contains no vehicles.
pub fn vehicles_between(
    route: &RoutePath,
    snapshot: &Snapshot,
    from_stop: &str,
    to_stop: &str,
) -> Result<Vec<VehicleSnapshot>, QueryError> {
    let (_, from) = route
        .stop(from_stop)
        .ok_or_else(|| QueryError::UnknownStop(from_stop.to_string()))?;
    let (_, to) = route
        .stop(to_stop)
        .ok_or_else(|| QueryError::UnknownStop(to_stop.to_string()))?;

    let lo = from.progress_km.min(to.progress_km);
    let hi = from.progress_km.max(to.progress_km);

    Ok(snapshot
        .vehicles
        .iter()
        .filter(|v| (lo..=hi).contains(&v.progress_km))
        .cloned()
        .collect())
}
