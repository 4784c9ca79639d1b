//! `bt-route` — the immutable route a fleet drives along.
//!
//! # Crate layout
//!
//! | Module     | Contents                                               |
//! |------------|--------------------------------------------------------|
//! | [`path`]   | `RoutePath`, `Stop`, `StopSpec` — polyline + bound stops |
//! | [`loader`] | JSON route configuration loading                       |
//! | [`error`]  | `RouteError`, `RouteResult<T>`                         |
//!
//! A [`RoutePath`] is constructed once at startup — from a JSON config, a
//! road-aligned polyline handed in by an external directions fetcher, or
//! literal coordinates in a test — validated, and then shared read-only by
//! every vehicle for the life of the process.

pub mod error;
pub mod loader;
pub mod path;

#[cfg(test)]
mod tests;

pub use error::{RouteError, RouteResult};
pub use loader::{RouteConfig, StopConfig, load_route_file, load_route_str};
pub use path::{RoutePath, Stop, StopSpec};
