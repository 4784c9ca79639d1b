//! `bt-sim` — the vehicle motion model and the read-side query engines.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`config`]    | `SimulatorConfig` — speed band, dwell, tolerance, seed    |
//! | [`state`]     | `VehicleState`, `Direction` — per-vehicle motion record   |
//! | [`simulator`] | `VehicleSimulator` — the per-tick motion state machine    |
//! | [`snapshot`]  | `Snapshot`, `VehicleSnapshot` — immutable tick output     |
//! | [`eta`]       | `EtaEngine` — direction-aware arrival projection          |
//! | [`geoindex`]  | nearest-vehicle and between-stops queries over a snapshot |
//! | [`error`]     | `SimError`, `QueryError`                                  |
//!
//! # Motion model
//!
//! Each vehicle is an independent state machine with two states, MOVING and
//! DWELLING.  A moving vehicle advances its scalar *progress* (km along the
//! route polyline) by `speed × elapsed` per tick, bouncing between the two
//! route endpoints in a continuous back-and-forth loop.  Crossing a stop's
//! bound position captures the vehicle: speed drops to zero for the stop's
//! dwell window, after which it resumes at a freshly sampled speed within
//! the configured band.
//!
//! Everything downstream of the tick — ETA projection, nearest-vehicle,
//! between-stops filtering — reads immutable [`Snapshot`]s, never the live
//! [`VehicleState`]s.

pub mod config;
pub mod error;
pub mod eta;
pub mod geoindex;
pub mod simulator;
pub mod snapshot;
pub mod state;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SimulatorConfig;
pub use error::{QueryError, SimError, SimResult};
pub use eta::{Eta, EtaEngine, StopEta};
pub use geoindex::{NearestVehicle, nearest_vehicle, vehicles_between};
pub use simulator::VehicleSimulator;
pub use snapshot::{Snapshot, VehicleSnapshot};
pub use state::{Direction, VehicleState};
