//! Great-circle distance and initial bearing between geographic points

use crate::types::GeoPoint;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters using the haversine formula
///
/// Coincident points give exactly zero and antipodal points half the
/// circumference; the intermediate term is clamped so rounding never
/// produces NaN.
///
/// # Example
/// ```
/// use ar_compass::haversine;
///
/// assert_eq!(haversine(51.935260, 7.651058, 51.935260, 7.651058), 0.0);
/// ```
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Distance in meters between two points
pub fn compute_distance_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Initial great-circle bearing from `from` to `to` in degrees (0-360)
///
/// Measured clockwise from north, the same convention as a compass heading.
pub fn initial_bearing_degrees(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let x = delta_lon.sin() * lat2_rad.cos();
    let y = lat1_rad.cos() * lat2_rad.sin() - lat1_rad.sin() * lat2_rad.cos() * delta_lon.cos();

    x.atan2(y).to_degrees().rem_euclid(360.0)
}
