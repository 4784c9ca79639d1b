//! `bt-live` — the live side of the tracker: one periodic mutator, many
//! concurrent readers.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`hub`]       | `BroadcastHub`, `SnapshotStream` — latest-snapshot fan-out  |
//! | [`scheduler`] | `Simulation` — owned sim aggregate with `tick`/`start`      |
//! | [`service`]   | `TrackerService` — the query operations + `shutdown`        |
//!
//! # Concurrency model
//!
//! A single scheduler task owns the [`VehicleSimulator`][bt_sim::VehicleSimulator]
//! and advances it on a fixed interval.  Each tick produces a fresh immutable
//! [`Snapshot`][bt_sim::Snapshot] behind an `Arc`; publishing swaps one
//! pointer in the hub and best-effort-sends to subscribers.  Readers only
//! ever dereference published snapshots, so they never lock against the
//! mutator and never observe a half-advanced fleet.  A slow subscriber loses
//! old snapshots from its bounded buffer; it cannot stall the tick.

pub mod hub;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use hub::{BroadcastHub, SnapshotStream};
pub use scheduler::Simulation;
pub use service::{BestEta, NotificationCheck, TrackerService};
