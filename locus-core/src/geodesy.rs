//! Great-circle distance primitives.
//!
//! Distances are haversine great-circle miles on a sphere of radius
//! [`EARTH_RADIUS_MILES`]. Point-to-segment distance projects onto the
//! segment in a planar `(lon, lat)` approximation before applying the
//! haversine; see [`segment_distance_miles`] for the limits of that
//! approximation.

use geo::Coord;

use crate::geometry::{Path, Ring};

/// Mean Earth radius in miles used by every distance computation.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Haversine great-circle distance between two positions, in miles.
///
/// Deterministic and pure; `haversine_miles(a, a)` is exactly zero and the
/// function is symmetric in its arguments.
#[must_use]
pub fn haversine_miles(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat_a = a.y.to_radians();
    let lat_b = b.y.to_radians();
    let d_lat = (b.y - a.y).to_radians();
    let d_lon = (b.x - a.x).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}

/// Distance in miles from `p` to the closest point of the segment
/// `start..end`.
///
/// The closest point is found by clamped linear projection in a planar
/// `(lon, lat)` space and the final distance is haversine. This is a
/// controlled approximation, not a geodesic solution: it is adequate at the
/// sub-100-mile scale the engine operates at, and it is preserved as-is so
/// nearest-feature ordering stays stable for existing deployments.
#[must_use]
pub fn segment_distance_miles(p: Coord<f64>, start: Coord<f64>, end: Coord<f64>) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_squared = dx * dx + dy * dy;

    let t = if length_squared == 0.0 {
        0.0
    } else {
        (((p.x - start.x) * dx + (p.y - start.y) * dy) / length_squared).clamp(0.0, 1.0)
    };
    let closest = Coord {
        x: start.x + t * dx,
        y: start.y + t * dy,
    };
    haversine_miles(p, closest)
}

/// Minimum distance in miles from `p` to any segment of `paths`.
///
/// Returns [`f64::INFINITY`] when the paths contain no segments.
#[must_use]
pub fn polyline_distance_miles(p: Coord<f64>, paths: &[Path]) -> f64 {
    paths
        .iter()
        .flat_map(|path| path.windows(2))
        .filter_map(|pair| match pair {
            [start, end] => Some(segment_distance_miles(p, *start, *end)),
            _ => None,
        })
        .fold(f64::INFINITY, f64::min)
}

/// Minimum distance in miles from `p` to the outer ring of `rings`.
///
/// Segment distances are tied with plain vertex distances for numerical
/// robustness near sharp corners. Returns [`f64::INFINITY`] for an empty
/// ring set.
#[must_use]
pub fn polygon_distance_miles(p: Coord<f64>, rings: &[Ring]) -> f64 {
    let Some(outer) = rings.first() else {
        return f64::INFINITY;
    };
    let segments = outer
        .windows(2)
        .filter_map(|pair| match pair {
            [start, end] => Some(segment_distance_miles(p, *start, *end)),
            _ => None,
        })
        .fold(f64::INFINITY, f64::min);
    let vertices = outer
        .iter()
        .map(|vertex| haversine_miles(p, *vertex))
        .fold(f64::INFINITY, f64::min);
    segments.min(vertices)
}
