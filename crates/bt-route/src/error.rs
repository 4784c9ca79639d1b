//! Route-construction and loading errors.
//!
//! All of these are fatal configuration errors: the core refuses to start on
//! degenerate geometry rather than simulate on it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route needs at least 2 polyline points, got {0}")]
    TooFewPoints(usize),

    #[error("duplicate consecutive polyline points at index {index}")]
    DuplicateConsecutivePoints { index: usize },

    #[error("route has no stops")]
    NoStops,

    #[error("duplicate stop name {0:?}")]
    DuplicateStopName(String),

    #[error("stop {stop:?} binds to polyline index {bound} before previous stop's index {previous}")]
    StopsOutOfOrder {
        stop:     String,
        bound:    usize,
        previous: usize,
    },

    #[error("route config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RouteResult<T> = Result<T, RouteError>;
