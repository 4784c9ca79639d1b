//! Simulation and query error types.
//!
//! `SimError` covers fatal construction problems; `QueryError` covers
//! recoverable lookup failures, which always carry the offending identifier
//! so the transport layer can echo it back to the caller.  Empty results
//! (no vehicles, no match in a span) are *not* errors — they are `None` or
//! an empty `Vec` at the query sites.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulator configuration error: {0}")]
    Config(String),
}

pub type SimResult<T> = Result<T, SimError>;

/// A lookup miss on the query path.  Never aborts a batch: batch ETA
/// computation records these per-stop and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unknown stop {0:?}")]
    UnknownStop(String),

    #[error("unknown vehicle {0:?}")]
    UnknownVehicle(String),
}
