//! Great-circle distance between WGS84 coordinates.
//!
//! Coordinates follow the `geo` convention used throughout the workspace:
//! `x = longitude`, `y = latitude`, both in degrees.

use geo::Point;

/// Mean Earth radius used by every distance in the system, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometres.
///
/// The function is symmetric and returns `0.0` for identical points. Callers
/// validate coordinate ranges; no clamping happens here beyond guarding the
/// `asin` argument against rounding just above `1.0`.
///
/// # Examples
/// ```
/// use geo::Point;
/// use chargewise_core::haversine_km;
///
/// let bangalore = Point::new(77.5946, 12.9716);
/// assert_eq!(haversine_km(bangalore, bangalore), 0.0);
/// let mumbai = Point::new(72.8777, 19.0760);
/// let km = haversine_km(bangalore, mumbai);
/// assert!((km - 845.0).abs() < 5.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the haversine formula is floating-point trigonometry"
)]
pub fn haversine_km(a: Point<f64>, b: Point<f64>) -> f64 {
    let lat_a = a.y().to_radians();
    let lat_b = b.y().to_radians();
    let d_lat = lat_b - lat_a;
    let d_lng = (b.x() - a.x()).to_radians();

    let half_chord =
        (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    let central_angle = 2.0 * half_chord.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * central_angle
}
