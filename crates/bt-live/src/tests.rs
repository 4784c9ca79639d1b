//! Unit tests for bt-live.

use std::sync::Arc;
use std::time::Duration;

use bt_core::{Clock, GeoPoint, ManualClock, Timestamp};
use bt_route::{RoutePath, StopSpec};
use bt_sim::{QueryError, Snapshot, SimulatorConfig, StopEta};

use crate::Simulation;
use crate::hub::BroadcastHub;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Straight ~10 km polyline with stops bound at indices 0, 5, 9.
fn route() -> Arc<RoutePath> {
    let points = (0..10).map(|i| GeoPoint::new(i as f64 * 0.01, 0.0)).collect();
    let stops = ["alpha", "mid", "omega"]
        .iter()
        .zip([0usize, 5, 9])
        .map(|(name, idx)| StopSpec {
            name: (*name).into(),
            position: GeoPoint::new(idx as f64 * 0.01, 0.0),
            dwell_secs: None,
        })
        .collect();
    Arc::new(RoutePath::new("test line", points, stops, 30).unwrap())
}

fn config(vehicles: usize, tick_ms: u64) -> SimulatorConfig {
    SimulatorConfig {
        vehicle_count: vehicles,
        tick_interval_ms: tick_ms,
        ..SimulatorConfig::default()
    }
}

fn manual_clock() -> (ManualClock, Arc<dyn Clock>) {
    let clock = ManualClock::new(Timestamp::from_unix_secs(1_000));
    let shared: Arc<dyn Clock> = Arc::new(clock.clone());
    (clock, shared)
}

fn snapshot_at(secs: i64) -> Snapshot {
    Snapshot {
        at: Timestamp::from_unix_secs(secs),
        vehicles: vec![],
    }
}

// ── BroadcastHub ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod hub {
    use super::*;

    #[test]
    fn latest_is_overwritten_by_publish() {
        let hub = BroadcastHub::new(snapshot_at(0));
        hub.publish(snapshot_at(1));
        hub.publish(snapshot_at(2));
        assert_eq!(hub.latest().at, Timestamp::from_unix_secs(2));
    }

    #[test]
    fn latest_without_publish_returns_the_same_snapshot() {
        let hub = BroadcastHub::new(snapshot_at(7));
        let a = hub.latest();
        let b = hub.latest();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn publish_without_subscribers_succeeds() {
        let hub = BroadcastHub::new(snapshot_at(0));
        assert_eq!(hub.subscriber_count(), 0);
        hub.publish(snapshot_at(1)); // must not panic or block
    }

    #[tokio::test]
    async fn subscriber_receives_each_publish_in_order() {
        let hub = BroadcastHub::new(snapshot_at(0));
        let mut stream = hub.subscribe();

        hub.publish(snapshot_at(1));
        hub.publish(snapshot_at(2));

        assert_eq!(stream.recv().await.unwrap().at, Timestamp::from_unix_secs(1));
        assert_eq!(stream.recv().await.unwrap().at, Timestamp::from_unix_secs(2));
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_ahead_instead_of_blocking() {
        let hub = BroadcastHub::new(snapshot_at(0));
        let mut stream = hub.subscribe();

        // Overrun the 16-entry subscriber buffer without ever receiving.
        for i in 1..=40 {
            hub.publish(snapshot_at(i));
        }

        // The stream resumes at the oldest retained snapshot, not snapshot 1.
        let first = stream.recv().await.unwrap();
        assert!(first.at > Timestamp::from_unix_secs(1));

        // And still reaches the newest one.
        let mut last = first;
        for _ in 0..40 {
            match tokio::time::timeout(Duration::from_millis(50), stream.recv()).await {
                Ok(Some(s)) => last = s,
                _ => break,
            }
        }
        assert_eq!(last.at, Timestamp::from_unix_secs(40));
    }

    #[tokio::test]
    async fn dropping_one_subscriber_leaves_others_attached() {
        let hub = BroadcastHub::new(snapshot_at(0));
        let dropped = hub.subscribe();
        let mut kept = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        drop(dropped);
        hub.publish(snapshot_at(1));

        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(kept.recv().await.unwrap().at, Timestamp::from_unix_secs(1));
    }
}

// ── Simulation lifecycle ─────────────────────────────────────────────────────

#[cfg(test)]
mod simulation {
    use super::*;

    #[test]
    fn new_publishes_an_initial_snapshot() {
        let (_, clock) = manual_clock();
        let sim = Simulation::new(route(), config(3, 1_000), clock).unwrap();

        let snap = sim.hub().latest();
        assert_eq!(snap.at, Timestamp::from_unix_secs(1_000));
        assert_eq!(snap.vehicles.len(), 3);
        assert_eq!(snap.vehicles[0].id, "bus-1");
    }

    #[test]
    fn manual_ticks_advance_and_republish() {
        let (clock, shared) = manual_clock();
        let mut sim = Simulation::new(route(), config(1, 1_000), shared).unwrap();
        let before = sim.hub().latest();

        clock.advance_secs(60.0);
        sim.tick();
        clock.advance_secs(60.0);
        sim.tick();

        let after = sim.hub().latest();
        assert_eq!(after.at, Timestamp::from_unix_secs(1_120));
        assert_ne!(before.at, after.at);
    }

    #[test]
    fn invalid_config_refuses_to_build() {
        let (_, clock) = manual_clock();
        let err = Simulation::new(route(), config(0, 1_000), clock).unwrap_err();
        assert!(matches!(err, bt_sim::SimError::Config(_)));
    }
}

// ── TrackerService ───────────────────────────────────────────────────────────

#[cfg(test)]
mod service {
    use super::*;

    /// Start a service with a long tick interval: all queries below run
    /// against the deterministic initial snapshot.
    async fn quiet_service(vehicles: usize) -> crate::TrackerService {
        let (_, clock) = manual_clock();
        Simulation::new(route(), config(vehicles, 3_600_000), clock)
            .unwrap()
            .start()
    }

    #[tokio::test]
    async fn vehicles_returns_the_whole_fleet() {
        let service = quiet_service(3).await;
        let snap = service.vehicles();
        let ids: Vec<&str> = snap.vehicles.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["bus-1", "bus-2", "bus-3"]);
        service.shutdown().await;
    }

    #[tokio::test]
    async fn vehicles_between_filters_by_span() {
        // Two vehicles start at progress 0 and total/2; the alpha→mid span
        // (5/9 of the route) covers both, mid→omega covers neither.
        let service = quiet_service(2).await;

        let both = service.vehicles_between("alpha", "mid").unwrap();
        assert_eq!(both.len(), 2);

        let none = service.vehicles_between("mid", "omega").unwrap();
        assert!(none.is_empty());

        let err = service.vehicles_between("alpha", "atlantis").unwrap_err();
        assert_eq!(err, QueryError::UnknownStop("atlantis".into()));
        service.shutdown().await;
    }

    #[tokio::test]
    async fn vehicle_eta_and_unknown_lookups() {
        let service = quiet_service(1).await;

        let eta = service.vehicle_eta("bus-1", "omega").unwrap();
        assert!(eta.eta_minutes.is_finite() && eta.eta_minutes > 0.0);

        assert_eq!(
            service.vehicle_eta("bus-9", "omega").unwrap_err(),
            QueryError::UnknownVehicle("bus-9".into())
        );
        assert_eq!(
            service.vehicle_eta("bus-1", "atlantis").unwrap_err(),
            QueryError::UnknownStop("atlantis".into())
        );
        service.shutdown().await;
    }

    #[tokio::test]
    async fn all_etas_and_partial_batches() {
        let service = quiet_service(1).await;

        let all = service.all_etas("bus-1").unwrap();
        assert_eq!(all.len(), 3);

        let batch = service.etas_for("bus-1", ["mid", "atlantis"]).unwrap();
        assert!(matches!(&batch[0], StopEta::Ready(_)));
        assert!(matches!(&batch[1], StopEta::UnknownStop { stop } if stop == "atlantis"));
        service.shutdown().await;
    }

    #[tokio::test]
    async fn nearest_vehicle_to_stop_minimizes_eta() {
        let service = quiet_service(3).await;

        let best = service.nearest_vehicle_to_stop("omega").unwrap().unwrap();
        for v in &service.vehicles().vehicles {
            let eta = service.vehicle_eta(&v.id, "omega").unwrap();
            assert!(best.eta.eta_minutes <= eta.eta_minutes);
        }
        service.shutdown().await;
    }

    #[tokio::test]
    async fn nearest_vehicle_picks_closest_position() {
        let service = quiet_service(2).await;
        // bus-1 sits at progress 0 == the route origin.
        let hit = service.nearest_vehicle(GeoPoint::new(0.0, 0.0)).unwrap();
        assert_eq!(hit.vehicle.id, "bus-1");
        assert!(hit.distance_km < 0.01);
        service.shutdown().await;
    }

    #[tokio::test]
    async fn notification_window_check() {
        let service = quiet_service(1).await;

        // Far-future window: any finite positive ETA triggers it.
        let due = service.notification_due("omega", 10_000.0).unwrap();
        assert!(due.should_notify);
        assert!(due.eta_minutes.unwrap() > 0.0);

        // Tiny window: bus-1 is a full route away from omega.
        let not_due = service.notification_due("omega", 0.001).unwrap();
        assert!(!not_due.should_notify);

        assert!(service.notification_due("atlantis", 5.0).is_err());
        service.shutdown().await;
    }

    #[tokio::test]
    async fn scheduler_publishes_on_its_own_cadence() {
        let (clock, shared) = manual_clock();
        let service = Simulation::new(route(), config(1, 5), shared)
            .unwrap()
            .start();

        let mut stream = service.subscribe();
        clock.advance_secs(30.0);

        // The background task ticks every 5 ms; a publish made before the
        // clock moved may still be in flight, so drain until the advanced
        // timestamp shows up.
        let deadline = Duration::from_secs(2);
        loop {
            let snap = tokio::time::timeout(deadline, stream.recv())
                .await
                .expect("scheduler never published")
                .expect("stream closed");
            if snap.at == Timestamp::from_unix_secs(1_030) {
                break;
            }
        }

        service.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_stops_publishing_and_is_idempotent() {
        let (clock, shared) = manual_clock();
        let service = Simulation::new(route(), config(1, 5), shared)
            .unwrap()
            .start();

        service.shutdown().await;
        service.shutdown().await; // second call is a no-op

        // Queries still answer from the last snapshot.
        let last = service.vehicles();

        // And nothing new arrives on a fresh subscription.
        clock.advance_secs(60.0);
        let mut stream = service.subscribe();
        let next = tokio::time::timeout(Duration::from_millis(100), stream.recv()).await;
        assert!(next.is_err(), "scheduler still publishing after shutdown");
        assert_eq!(service.vehicles().at, last.at);
    }
}

// ── Compile-time checks ──────────────────────────────────────────────────────

#[test]
fn hub_and_service_are_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BroadcastHub>();
    assert_send_sync::<crate::TrackerService>();
}
