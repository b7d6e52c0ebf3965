//! Ray-casting point-in-polygon tests with hole support.
//!
//! A horizontal ray is cast from the probe point toward +longitude and edge
//! crossings are counted; an odd count means the point is inside the ring.
//! Behaviour for points exactly on a vertex or edge is implementation
//! defined but consistent within this implementation.

use geo::Coord;

use crate::geometry::Ring;

/// Ray-casting containment test against a single ring.
///
/// Rings with fewer than three vertices are degenerate and contain nothing.
/// The ring may be explicitly closed (first vertex repeated at the end) or
/// not; the closing edge is considered either way.
#[must_use]
pub fn point_in_ring(p: Coord<f64>, ring: &[Coord<f64>]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut previous = match ring.last() {
        Some(last) => *last,
        None => return false,
    };
    for &vertex in ring {
        // Only edges whose latitude span straddles the probe can cross the
        // ray toward +longitude.
        if (vertex.y > p.y) != (previous.y > p.y) {
            let crossing_x = (previous.x - vertex.x) * (p.y - vertex.y)
                / (previous.y - vertex.y)
                + vertex.x;
            // Inclusive comparison: a point exactly on a crossed edge
            // counts as inside.
            if p.x <= crossing_x {
                inside = !inside;
            }
        }
        previous = vertex;
    }
    inside
}

/// Containment test against a polygon with holes.
///
/// The point is contained iff it is inside the outer boundary (`rings[0]`)
/// and inside none of the holes (`rings[1..]`). A point inside a hole is
/// NOT contained even though it is inside the outer ring; every caller
/// relies on exactly this contract.
#[must_use]
pub fn point_in_polygon(p: Coord<f64>, rings: &[Ring]) -> bool {
    let Some(outer) = rings.first() else {
        return false;
    };
    if !point_in_ring(p, outer) {
        return false;
    }
    !rings.iter().skip(1).any(|hole| point_in_ring(p, hole))
}
