//! The owned simulation aggregate and its tick loop.

use std::sync::Arc;
use std::time::Duration;

use bt_core::Clock;
use bt_route::RoutePath;
use bt_sim::{SimResult, SimulatorConfig, VehicleSimulator};
use log::info;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::hub::BroadcastHub;
use crate::service::TrackerService;

/// The whole simulation as a single owned object: the mutable fleet, the
/// shared route, the injected clock, and the hub its snapshots flow into.
///
/// Lifecycle: construct with [`new`][Simulation::new], step deterministically
/// with [`tick`][Simulation::tick] (tests do this directly, no runtime
/// needed), or hand the whole thing to [`start`][Simulation::start], which
/// moves it into a background tokio task ticking at the configured interval
/// until [`TrackerService::shutdown`].
pub struct Simulation {
    simulator: VehicleSimulator,
    clock: Arc<dyn Clock>,
    hub: Arc<BroadcastHub>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation").finish_non_exhaustive()
    }
}

impl Simulation {
    /// Build the fleet on `route` and publish the initial snapshot.
    pub fn new(
        route: Arc<RoutePath>,
        config: SimulatorConfig,
        clock: Arc<dyn Clock>,
    ) -> SimResult<Self> {
        let now = clock.now();
        let simulator = VehicleSimulator::new(route, config, now)?;
        let hub = Arc::new(BroadcastHub::new(simulator.snapshot(now)));
        Ok(Self { simulator, clock, hub })
    }

    /// Advance every vehicle to the clock's current instant and publish the
    /// resulting snapshot.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.simulator.advance_all(now);
        self.hub.publish(self.simulator.snapshot(now));
    }

    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    pub fn route(&self) -> &Arc<RoutePath> {
        self.simulator.route()
    }

    /// Spawn the scheduler task and return the query service.
    ///
    /// The tick cadence comes from `config.tick_interval_ms` and runs
    /// independently of any reader; missed ticks are delayed, not bursted,
    /// so elapsed-time-based motion stays smooth under load.
    pub fn start(self) -> TrackerService {
        let interval_ms = self.simulator.config().tick_interval_ms;
        let nominal_speed = self.simulator.config().nominal_speed_kmh;
        let route = self.simulator.route().clone();
        let hub = self.hub.clone();
        let clock = self.clock.clone();

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut sim = self;
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(
                "simulation scheduler started: {} vehicles, tick every {} ms",
                sim.simulator.vehicles().len(),
                interval_ms
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => sim.tick(),
                    _ = shutdown_rx.changed() => break,
                }
            }

            info!("simulation scheduler stopped");
        });

        TrackerService::new(route, hub, clock, nominal_speed, shutdown_tx, task)
    }
}
