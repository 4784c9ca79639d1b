//! Time model: millisecond timestamps and the injected clock.
//!
//! No component in the core reads the system clock directly — everything
//! goes through a shared [`Clock`], so a test can hold a [`ManualClock`]
//! and step simulated time deterministically while production code runs on
//! [`SystemClock`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

// ── Timestamp ────────────────────────────────────────────────────────────────

/// A wall-clock instant as Unix milliseconds.
///
/// Milliseconds (not seconds) so that sub-second tick intervals still
/// produce a non-zero elapsed time between advances.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    #[inline]
    pub fn from_unix_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    #[inline]
    pub fn from_unix_secs(secs: i64) -> Self {
        Timestamp(secs * 1_000)
    }

    #[inline]
    pub fn unix_millis(self) -> i64 {
        self.0
    }

    /// Fractional seconds elapsed from `earlier` to `self`.
    ///
    /// Negative if `earlier` is actually later — callers on the motion path
    /// clamp to zero so a clock hiccup never moves a vehicle backwards.
    #[inline]
    pub fn seconds_since(self, earlier: Timestamp) -> f64 {
        (self.0 - earlier.0) as f64 / 1_000.0
    }

    /// This instant shifted forward by fractional seconds.
    #[inline]
    pub fn plus_secs_f64(self, secs: f64) -> Timestamp {
        Timestamp(self.0 + (secs * 1_000.0).round() as i64)
    }

    /// This instant shifted forward by fractional minutes.
    #[inline]
    pub fn plus_minutes(self, minutes: f64) -> Timestamp {
        self.plus_secs_f64(minutes * 60.0)
    }
}

impl fmt::Display for Timestamp {
    /// `HH:MM:SS` time-of-day in UTC.  Enough for logs and ETA payloads
    /// without pulling in a datetime library.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs_of_day = (self.0.div_euclid(1_000)).rem_euclid(86_400);
        let h = secs_of_day / 3_600;
        let m = (secs_of_day % 3_600) / 60;
        let s = secs_of_day % 60;
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}

// ── Clock ────────────────────────────────────────────────────────────────────

/// The injected time source.
///
/// `Send + Sync` because the scheduler task and query paths share one clock
/// behind an `Arc<dyn Clock>`.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Production clock backed by `std::time::SystemTime`.
#[derive(Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp(since_epoch.as_millis() as i64)
    }
}

/// Hand-cranked clock for deterministic tests.
///
/// Cheap to clone — clones share the same underlying instant, so a test can
/// hold one handle while the simulation holds another.
#[derive(Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start.0)),
        }
    }

    pub fn set(&self, to: Timestamp) {
        self.millis.store(to.0, Ordering::SeqCst);
    }

    /// Step the clock forward by fractional seconds.
    pub fn advance_secs(&self, secs: f64) {
        self.millis
            .fetch_add((secs * 1_000.0).round() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.millis.load(Ordering::SeqCst))
    }
}
