//! `bt-core` — foundational types for the bus-tracker simulation core.
//!
//! This crate is a dependency of every other `bt-*` crate.  It intentionally
//! has no `bt-*` dependencies and minimal external ones (only `rand` and
//! `serde` via the workspace).
//!
//! # What lives here
//!
//! | Module    | Contents                                        |
//! |-----------|-------------------------------------------------|
//! | [`ids`]   | `VehicleId`, `StopId`                           |
//! | [`geo`]   | `GeoPoint`, haversine distance                  |
//! | [`time`]  | `Timestamp`, the injected `Clock` trait         |
//! | [`rng`]   | `VehicleRng` (per-vehicle deterministic RNG)    |

pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::GeoPoint;
pub use ids::{StopId, VehicleId};
pub use rng::VehicleRng;
pub use time::{Clock, ManualClock, SystemClock, Timestamp};
