//! Unit tests for bt-route.

use bt_core::{GeoPoint, StopId};

use crate::{RouteError, RoutePath, StopSpec, load_route_str};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Straight north-running polyline: 10 points, 0.01° (~1.112 km) apart.
fn straight_points() -> Vec<GeoPoint> {
    (0..10).map(|i| GeoPoint::new(i as f64 * 0.01, 0.0)).collect()
}

fn stop(name: &str, lat: f64) -> StopSpec {
    StopSpec {
        name: name.into(),
        position: GeoPoint::new(lat, 0.0),
        dwell_secs: None,
    }
}

/// Three stops bound at polyline indices 0, 5, 9.
fn straight_route() -> RoutePath {
    RoutePath::new(
        "test line",
        straight_points(),
        vec![stop("alpha", 0.0), stop("mid", 0.05), stop("omega", 0.09)],
        30,
    )
    .unwrap()
}

// ── Construction validation ──────────────────────────────────────────────────

#[cfg(test)]
mod validation {
    use super::*;

    #[test]
    fn fewer_than_two_points_is_fatal() {
        let err = RoutePath::new("r", vec![GeoPoint::new(0.0, 0.0)], vec![stop("a", 0.0)], 30)
            .unwrap_err();
        assert!(matches!(err, RouteError::TooFewPoints(1)));
    }

    #[test]
    fn duplicate_consecutive_points_is_fatal() {
        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.01, 0.0),
            GeoPoint::new(0.01, 0.0),
        ];
        let err = RoutePath::new("r", points, vec![stop("a", 0.0)], 30).unwrap_err();
        assert!(matches!(
            err,
            RouteError::DuplicateConsecutivePoints { index: 2 }
        ));
    }

    #[test]
    fn empty_stop_list_is_fatal() {
        let err = RoutePath::new("r", straight_points(), vec![], 30).unwrap_err();
        assert!(matches!(err, RouteError::NoStops));
    }

    #[test]
    fn duplicate_stop_names_are_fatal() {
        let err = RoutePath::new(
            "r",
            straight_points(),
            vec![stop("a", 0.0), stop("a", 0.05)],
            30,
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::DuplicateStopName(name) if name == "a"));
    }

    #[test]
    fn stops_binding_out_of_order_are_fatal() {
        let err = RoutePath::new(
            "r",
            straight_points(),
            vec![stop("late", 0.08), stop("early", 0.02)],
            30,
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::StopsOutOfOrder { stop, .. } if stop == "early"));
    }
}

// ── Stop binding ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod binding {
    use super::*;

    #[test]
    fn stops_bind_to_nearest_polyline_index() {
        let route = straight_route();
        let indices: Vec<usize> = route.stops().iter().map(|s| s.path_index).collect();
        assert_eq!(indices, vec![0, 5, 9]);
    }

    #[test]
    fn off_polyline_stop_binds_to_closest_point() {
        // Stop sits ~50 m east of polyline point 3.
        let route = RoutePath::new(
            "r",
            straight_points(),
            vec![StopSpec {
                name: "offset".into(),
                position: GeoPoint::new(0.03, 0.0005),
                dwell_secs: None,
            }],
            30,
        )
        .unwrap();
        assert_eq!(route.stops()[0].path_index, 3);
    }

    #[test]
    fn stop_progress_matches_cumulative_distance() {
        let route = straight_route();
        let (_, mid) = route.stop("mid").unwrap();
        // 5 segments of ~1.112 km each.
        assert!((mid.progress_km - route.total_length_km() * 5.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn stop_lookup_by_name_and_id() {
        let route = straight_route();
        let (id, s) = route.stop("omega").unwrap();
        assert_eq!(id, StopId(2));
        assert_eq!(s.path_index, 9);
        assert!(route.stop("nowhere").is_none());
        assert_eq!(route.stop_by_id(id).unwrap().name, "omega");
    }
}

// ── Geometry ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod geometry {
    use super::*;

    #[test]
    fn total_length_is_sum_of_segments() {
        let route = straight_route();
        // 9 segments of ~1.112 km.
        assert!((route.total_length_km() - 9.0 * 1.112).abs() < 0.05);
    }

    #[test]
    fn position_at_zero_and_total_are_the_endpoints() {
        let route = straight_route();
        assert_eq!(route.position_at(0.0), route.points()[0]);
        let end = route.position_at(route.total_length_km());
        let last = route.points()[9];
        assert!(end.distance_km(last) < 1e-9);
    }

    #[test]
    fn position_at_interpolates_within_a_segment() {
        let route = straight_route();
        let seg = route.total_length_km() / 9.0;
        let p = route.position_at(seg * 2.5);
        assert!((p.lat - 0.025).abs() < 1e-6);
        assert!(p.lon.abs() < 1e-12);
    }

    #[test]
    fn position_at_clamps_out_of_range_progress() {
        let route = straight_route();
        assert_eq!(route.position_at(-5.0), route.points()[0]);
        let past_end = route.position_at(route.total_length_km() + 5.0);
        assert!(past_end.distance_km(route.points()[9]) < 1e-9);
    }

    #[test]
    fn nearest_point_index_picks_closest() {
        let route = straight_route();
        let idx = route.nearest_point_index(GeoPoint::new(0.041, 0.001));
        assert_eq!(idx, 4);
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use super::*;

    const ROUTE_JSON: &str = r#"{
        "bus_route": {
            "name": "Campus Loop",
            "coordinates": [[0.0, 0.0], [0.01, 0.0], [0.02, 0.0], [0.03, 0.0]],
            "stops": [
                { "name": "Gate", "lat": 0.0, "lon": 0.0 },
                { "name": "Library", "lat": 0.03, "lon": 0.0, "wait_time": 45 }
            ]
        }
    }"#;

    #[test]
    fn loads_route_and_applies_dwell_default_and_override() {
        let route = load_route_str(ROUTE_JSON, 30).unwrap();
        assert_eq!(route.name(), "Campus Loop");
        assert_eq!(route.points().len(), 4);
        assert_eq!(route.stops().len(), 2);
        assert_eq!(route.stops()[0].dwell_secs, 30); // default
        assert_eq!(route.stops()[1].dwell_secs, 45); // per-stop wait_time
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = load_route_str("{ not json", 30).unwrap_err();
        assert!(matches!(err, RouteError::Parse(_)));
    }

    #[test]
    fn degenerate_geometry_fails_after_parsing() {
        let json = r#"{"bus_route":{"name":"r","coordinates":[[0.0,0.0]],"stops":[{"name":"a","lat":0.0,"lon":0.0}]}}"#;
        let err = load_route_str(json, 30).unwrap_err();
        assert!(matches!(err, RouteError::TooFewPoints(1)));
    }
}
