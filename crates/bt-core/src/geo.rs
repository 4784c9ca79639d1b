//! Geographic coordinate type and the single distance primitive.
//!
//! Every distance claim in the tracker — stop binding, nearest-stop,
//! nearest-vehicle, remaining path length — goes through
//! [`GeoPoint::distance_km`] so that "distance to stop" and "distance to
//! vehicle" results are always mutually consistent.

/// A WGS-84 geographic coordinate in double precision.
///
/// Route polylines are short (hundreds of points, a handful of vehicles), so
/// f64 costs nothing here and keeps interpolated positions and cumulative
/// path lengths drift-free over long runs.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in kilometres.
    pub fn distance_km(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371.0; // mean Earth radius, km

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// Linear interpolation towards `other` by fraction `t` in `[0, 1]`.
    ///
    /// Plain lat/lon blending; over the ~10–100 m polyline segments this
    /// tracker interpolates across, the error vs. a true geodesic is
    /// far below the haversine approximation itself.
    #[inline]
    pub fn lerp(self, other: GeoPoint, t: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
