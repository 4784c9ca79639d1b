//! citybus — end-to-end demo of the bus-tracker simulation core.
//!
//! Runs a 3-bus fleet around a small campus loop on the real system clock,
//! streams live snapshots from a subscriber task, and fires a few one-shot
//! queries (ETAs, nearest vehicle, span filter) against the running service.
//!
//! ```text
//! RUST_LOG=debug cargo run -p citybus
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use bt_core::{GeoPoint, SystemClock};
use bt_live::Simulation;
use bt_route::load_route_str;
use bt_sim::SimulatorConfig;
use log::info;

// ── Constants ─────────────────────────────────────────────────────────────────

const DEFAULT_DWELL_SECS: u32 = 30;
const RUN_FOR: Duration = Duration::from_secs(20);

// Campus loop: ~13 polyline points, 4 named stops.  Stands in for the
// road-aligned polyline an external directions fetcher would normally
// substitute at startup.
const ROUTE_JSON: &str = r#"{
    "bus_route": {
        "name": "Campus Loop",
        "coordinates": [
            [37.4220, -122.0850], [37.4232, -122.0843], [37.4243, -122.0835],
            [37.4255, -122.0829], [37.4264, -122.0838], [37.4271, -122.0851],
            [37.4268, -122.0867], [37.4259, -122.0879], [37.4247, -122.0886],
            [37.4236, -122.0881], [37.4228, -122.0870], [37.4223, -122.0859],
            [37.4220, -122.0851]
        ],
        "stops": [
            { "name": "Main Gate",    "lat": 37.4220, "lon": -122.0850 },
            { "name": "Science Hall", "lat": 37.4255, "lon": -122.0829, "wait_time": 20 },
            { "name": "Stadium",      "lat": 37.4268, "lon": -122.0867 },
            { "name": "Library",      "lat": 37.4236, "lon": -122.0881, "wait_time": 45 }
        ]
    }
}"#;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let route = Arc::new(load_route_str(ROUTE_JSON, DEFAULT_DWELL_SECS)?);
    info!(
        "loaded route {:?}: {:.2} km, {} stops",
        route.name(),
        route.total_length_km(),
        route.stops().len()
    );

    let config = SimulatorConfig {
        tick_interval_ms: 1_000,
        ..SimulatorConfig::default()
    };
    let service = Simulation::new(route.clone(), config, Arc::new(SystemClock))?.start();

    // Streaming subscriber, the way a WebSocket handler would consume us.
    let mut stream = service.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(snapshot) = stream.recv().await {
            for v in &snapshot.vehicles {
                println!(
                    "[{}] {} @ {} {:>5.1} km/h {} (near {})",
                    snapshot.at,
                    v.id,
                    v.position,
                    v.speed_kmh,
                    if v.is_moving { "moving" } else { "dwelling" },
                    v.nearest_stop,
                );
            }
        }
    });

    tokio::time::sleep(RUN_FOR).await;

    // One-shot queries, the way REST handlers would consume us.
    println!("\n── queries ──");
    for eta in service.all_etas("bus-1")? {
        println!("bus-1 → {:<12} {:>6.2} km, {:>5.1} min (at {})",
            eta.stop, eta.distance_km, eta.eta_minutes, eta.eta_time);
    }

    if let Some(hit) = service.nearest_vehicle(GeoPoint::new(37.4240, -122.0860)) {
        println!("nearest vehicle: {} at {:.2} km", hit.vehicle.id, hit.distance_km);
    }

    let span = service.vehicles_between("Main Gate", "Stadium")?;
    println!("between Main Gate and Stadium: {} vehicle(s)", span.len());

    if let Some(best) = service.nearest_vehicle_to_stop("Library")? {
        println!(
            "next arrival at Library: {} in {:.1} min",
            best.vehicle.id, best.eta.eta_minutes
        );
    }

    service.shutdown().await;
    // Last hub handle goes away with the service; the stream then closes
    // and the printer task drains out.
    drop(service);
    printer.await?;
    Ok(())
}
