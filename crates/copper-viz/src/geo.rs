//! Spherical geometry for flow arrows.
//!
//! Arrows sit at the great-circle midpoint of a branch and point along the
//! initial bearing from the sending to the receiving bus.

use copper_core::{Bus, Degrees};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<&Bus> for GeoPoint {
    fn from(bus: &Bus) -> Self {
        Self::new(bus.x, bus.y)
    }
}

/// Point halfway along the great circle from `a` to `b`.
pub fn midpoint(a: GeoPoint, b: GeoPoint) -> GeoPoint {
    let lat1 = Degrees(a.lat).to_radians().value();
    let lon1 = Degrees(a.lon).to_radians().value();
    let lat2 = Degrees(b.lat).to_radians().value();
    let d_lon = Degrees(b.lon - a.lon).to_radians().value();

    let bx = lat2.cos() * d_lon.cos();
    let by = lat2.cos() * d_lon.sin();
    let lat = (lat1.sin() + lat2.sin()).atan2(((lat1.cos() + bx).powi(2) + by.powi(2)).sqrt());
    let lon = lon1 + by.atan2(lat1.cos() + bx);

    GeoPoint::new(wrap_longitude(lon.to_degrees()), lat.to_degrees())
}

/// Longitude in `[-180, 180)`.
fn wrap_longitude(lon: f64) -> f64 {
    Degrees(lon + 180.0).normalized().value() - 180.0
}

/// Initial bearing from `a` towards `b`, clockwise from north in `[0, 360)`.
pub fn bearing(a: GeoPoint, b: GeoPoint) -> Degrees {
    let lat1 = Degrees(a.lat).to_radians().value();
    let lat2 = Degrees(b.lat).to_radians().value();
    let d_lon = Degrees(b.lon - a.lon).to_radians().value();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    Degrees(y.atan2(x).to_degrees()).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn midpoint_on_the_equator() {
        let m = midpoint(GeoPoint::new(0.0, 0.0), GeoPoint::new(10.0, 0.0));
        assert!(close(m.lon, 5.0));
        assert!(close(m.lat, 0.0));
    }

    #[test]
    fn midpoint_along_a_meridian() {
        let m = midpoint(GeoPoint::new(9.0, 52.0), GeoPoint::new(9.0, 54.0));
        assert!(close(m.lon, 9.0));
        assert!(close(m.lat, 53.0));
    }

    #[test]
    fn midpoint_bends_towards_the_pole() {
        let m = midpoint(GeoPoint::new(0.0, 50.0), GeoPoint::new(20.0, 50.0));
        assert!(close(m.lon, 10.0));
        assert!(m.lat > 50.0);
    }

    #[test]
    fn midpoint_across_the_antimeridian() {
        let m = midpoint(GeoPoint::new(175.0, 0.0), GeoPoint::new(-165.0, 0.0));
        assert!(close(m.lon, -175.0), "{m:?}");
        assert!(close(m.lat, 0.0));

        let back = midpoint(GeoPoint::new(-165.0, 0.0), GeoPoint::new(175.0, 0.0));
        assert!(close(back.lon, -175.0), "{back:?}");
    }

    #[test]
    fn cardinal_bearings() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!(close(bearing(origin, GeoPoint::new(0.0, 1.0)).value(), 0.0));
        assert!(close(bearing(origin, GeoPoint::new(1.0, 0.0)).value(), 90.0));
        assert!(close(bearing(origin, GeoPoint::new(0.0, -1.0)).value(), 180.0));
        assert!(close(bearing(origin, GeoPoint::new(-1.0, 0.0)).value(), 270.0));
    }

    #[test]
    fn bearing_is_normalized() {
        let b = bearing(GeoPoint::new(10.0, 54.0), GeoPoint::new(9.0, 53.0));
        assert!((180.0..270.0).contains(&b.value()));
    }
}
