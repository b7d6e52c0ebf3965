//! Geometry shapes returned by remote feature services.
//!
//! Vertices are raw [`geo::Coord`] values (`x = longitude`, `y = latitude`)
//! rather than validated [`crate::Coordinate`]s: remote data is tolerated as
//! received, only caller-supplied origins are validated.

use geo::Coord;

/// An ordered sequence of vertices forming one run of a polyline.
pub type Path = Vec<Coord<f64>>;

/// A closed ordered sequence of vertices.
///
/// The first and last vertex of a well-formed ring are equal and the ring
/// has at least three distinct vertices. Rings that fall short of this are
/// degenerate and contain nothing.
pub type Ring = Vec<Coord<f64>>;

/// A feature's shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A single position.
    Point(Coord<f64>),
    /// One or more paths of connected segments.
    Polyline(Vec<Path>),
    /// An outer boundary (`rings[0]`) plus zero or more holes (`rings[1..]`).
    Polygon(Vec<Ring>),
}

impl Geometry {
    /// The polygon rings, when this geometry is a polygon.
    #[must_use]
    pub fn rings(&self) -> Option<&[Ring]> {
        match self {
            Self::Polygon(rings) => Some(rings),
            _ => None,
        }
    }
}

/// Arithmetic mean of all vertices across all paths.
///
/// Returns `None` when the paths hold no vertices. Used for line datasets
/// that do not expose a queryable containment geometry and are treated as
/// points instead.
#[must_use]
pub fn centroid(paths: &[Path]) -> Option<Coord<f64>> {
    let mut sum = Coord { x: 0.0, y: 0.0 };
    let mut count = 0u32;
    for vertex in paths.iter().flatten() {
        sum.x += vertex.x;
        sum.y += vertex.y;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let n = f64::from(count);
    Some(Coord {
        x: sum.x / n,
        y: sum.y / n,
    })
}
