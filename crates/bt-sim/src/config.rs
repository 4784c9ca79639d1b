//! Simulator configuration.

use crate::error::{SimError, SimResult};

/// Tunable parameters of the motion model.
///
/// Typically deserialized from the application's config file alongside the
/// route; the defaults reproduce the original tracker's campus-loop
/// behavior (3 buses at 20–35 km/h, 30 s dwells, 2 s ticks).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Number of simulated vehicles, spaced evenly around the route.
    pub vehicle_count: usize,

    /// Lower edge of the cruising-speed band, km/h.
    pub min_speed_kmh: f64,

    /// Upper edge of the cruising-speed band, km/h.
    pub max_speed_kmh: f64,

    /// Speed used for ETA projection while a vehicle is dwelling (its actual
    /// speed is 0 and would otherwise project an infinite ETA).
    pub nominal_speed_kmh: f64,

    /// Dwell duration for stops without a per-stop override, seconds.
    pub default_dwell_secs: u32,

    /// How close (km along the route) a vehicle must come to a stop's bound
    /// position to be captured for a dwell.
    pub stop_tolerance_km: f64,

    /// Scheduler tick interval in milliseconds.  The simulation cadence is
    /// fixed by this value, independent of any client's read rate.
    pub tick_interval_ms: u64,

    /// Master RNG seed; the same seed always produces the same speed
    /// sequences.
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            vehicle_count:      3,
            min_speed_kmh:      20.0,
            max_speed_kmh:      35.0,
            nominal_speed_kmh:  25.0,
            default_dwell_secs: 30,
            stop_tolerance_km:  0.02,
            tick_interval_ms:   2_000,
            seed:               42,
        }
    }
}

impl SimulatorConfig {
    /// Reject configurations the motion model cannot run on.
    pub fn validate(&self) -> SimResult<()> {
        if self.vehicle_count == 0 {
            return Err(SimError::Config("vehicle_count must be at least 1".into()));
        }
        if !(self.min_speed_kmh > 0.0 && self.min_speed_kmh <= self.max_speed_kmh) {
            return Err(SimError::Config(format!(
                "speed band [{}, {}] km/h is not a positive, ordered range",
                self.min_speed_kmh, self.max_speed_kmh
            )));
        }
        if self.nominal_speed_kmh <= 0.0 {
            return Err(SimError::Config("nominal_speed_kmh must be positive".into()));
        }
        if self.stop_tolerance_km <= 0.0 {
            return Err(SimError::Config("stop_tolerance_km must be positive".into()));
        }
        if self.tick_interval_ms == 0 {
            return Err(SimError::Config("tick_interval_ms must be positive".into()));
        }
        Ok(())
    }
}
