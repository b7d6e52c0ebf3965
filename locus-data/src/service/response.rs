//! Wire types for Esri-style feature-service query responses.
//!
//! A query response carries either an `error` object or a `features`
//! array, plus an optional `exceededTransferLimit` continuation signal.
//! Geometry arrives as one of three provider shapes: `{x, y}` points,
//! `{paths}` polylines or `{rings}` polygons; coordinate tuples may carry
//! trailing `z`/`m` values, which are ignored.

use geo::Coord;
use locus_core::{AttributeMap, Geometry};
use serde::Deserialize;

use super::SourceError;

/// Top-level query response body.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    /// Error payload; present when the batch failed service-side.
    pub error: Option<ServiceErrorBody>,
    /// Returned features; absent on error responses.
    #[serde(default)]
    pub features: Vec<RawFeature>,
    /// Explicit "more records exist" continuation signal.
    #[serde(default, rename = "exceededTransferLimit")]
    pub exceeded_transfer_limit: Option<bool>,
}

/// Service-reported error payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceErrorBody {
    /// Service-specific error code.
    #[serde(default)]
    pub code: i64,
    /// Error description.
    #[serde(default)]
    pub message: String,
}

/// One raw feature as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawFeature {
    /// Raw attribute dictionary, carried verbatim.
    #[serde(default)]
    pub attributes: AttributeMap,
    /// Provider-specific geometry shape, when present.
    pub geometry: Option<RawGeometry>,
}

/// Provider-specific geometry shape.
///
/// Exactly one of the point, paths or rings forms is populated in
/// practice; rings win over paths over point when several appear.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawGeometry {
    x: Option<f64>,
    y: Option<f64>,
    paths: Option<Vec<Vec<Vec<f64>>>>,
    rings: Option<Vec<Vec<Vec<f64>>>>,
}

/// A successfully decoded batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeaturePage {
    /// Features in this batch.
    pub features: Vec<RawFeature>,
    /// Whether the service signalled that more records exist.
    pub more: bool,
}

impl QueryResponse {
    /// Convert the wire response into a [`FeaturePage`].
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::ServiceReported`] when the body carried an
    /// error object.
    pub fn into_page(self) -> Result<FeaturePage, SourceError> {
        if let Some(error) = self.error {
            return Err(SourceError::ServiceReported {
                code: error.code,
                message: error.message,
            });
        }
        Ok(FeaturePage {
            features: self.features,
            more: self.exceeded_transfer_limit.unwrap_or(false),
        })
    }
}

impl RawGeometry {
    /// A point shape.
    #[must_use]
    pub const fn point(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            paths: None,
            rings: None,
        }
    }

    /// A polyline shape from `(x, y)` vertex tuples.
    #[must_use]
    pub fn polyline(paths: Vec<Vec<(f64, f64)>>) -> Self {
        Self {
            x: None,
            y: None,
            paths: Some(to_wire_paths(paths)),
            rings: None,
        }
    }

    /// A polygon shape from `(x, y)` vertex tuples.
    #[must_use]
    pub fn polygon(rings: Vec<Vec<(f64, f64)>>) -> Self {
        Self {
            x: None,
            y: None,
            paths: None,
            rings: Some(to_wire_paths(rings)),
        }
    }

    /// Interpret the provider shape as an engine [`Geometry`].
    ///
    /// A shape with no usable form yields `None`; the owning feature is
    /// kept, only its geometry is dropped.
    #[must_use]
    pub fn to_geometry(&self) -> Option<Geometry> {
        if let Some(rings) = &self.rings {
            let rings = convert_paths(rings);
            if rings.is_empty() {
                return None;
            }
            return Some(Geometry::Polygon(rings));
        }
        if let Some(paths) = &self.paths {
            let paths = convert_paths(paths);
            if paths.is_empty() {
                return None;
            }
            return Some(Geometry::Polyline(paths));
        }
        match (self.x, self.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => {
                Some(Geometry::Point(Coord { x, y }))
            }
            _ => None,
        }
    }
}

fn to_wire_paths(paths: Vec<Vec<(f64, f64)>>) -> Vec<Vec<Vec<f64>>> {
    paths
        .into_iter()
        .map(|path| path.into_iter().map(|(x, y)| vec![x, y]).collect())
        .collect()
}

fn convert_paths(paths: &[Vec<Vec<f64>>]) -> Vec<Vec<Coord<f64>>> {
    paths
        .iter()
        .map(|path| {
            path.iter()
                .filter_map(|tuple| match (tuple.first(), tuple.get(1)) {
                    (Some(&x), Some(&y)) => Some(Coord { x, y }),
                    _ => None,
                })
                .collect::<Vec<_>>()
        })
        .filter(|path: &Vec<Coord<f64>>| !path.is_empty())
        .collect()
}
