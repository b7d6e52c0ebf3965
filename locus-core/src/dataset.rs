//! Caller-supplied dataset configuration and query inputs.

use thiserror::Error;

use crate::coordinate::Coordinate;

/// The geometry a dataset's layer serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    /// Point features; distance is measured to the point itself.
    Point,
    /// Line features; distance is measured to the nearest segment.
    Polyline,
    /// Line features whose service cannot answer segment queries; distance
    /// is measured to the centroid of the paths instead.
    PolylineAsPoint,
    /// Polygon features; containment queries are meaningful.
    Polygon,
}

/// Per-dataset configuration supplied by the caller on every invocation.
///
/// The engine holds no persistent reference to a descriptor; it is read
/// during one resolution and discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetDescriptor {
    /// Feature-service base URL, e.g. `https://host/arcgis/rest/services/X/FeatureServer`.
    pub endpoint: String,
    /// Layer identifier under the endpoint.
    pub layer_id: u32,
    /// Geometry the layer serves.
    pub geometry_kind: GeometryKind,
    /// Whether the layer supports polygon containment queries.
    pub supports_containment: bool,
    /// Ceiling applied to any requested radius, in miles.
    pub max_radius_miles: f64,
    /// Identity-field candidates in priority order.
    pub identity_fields: Vec<String>,
}

/// Errors for contradictory dataset configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DatasetError {
    /// The endpoint URL was empty.
    #[error("dataset endpoint must not be empty")]
    EmptyEndpoint,
    /// The maximum radius was non-finite or not positive.
    #[error("dataset maximum radius must be finite and positive, got {value}")]
    InvalidMaxRadius {
        /// Offending radius value.
        value: f64,
    },
    /// Containment support was declared for a non-polygon layer.
    #[error("containment support requires polygon geometry, got {kind:?}")]
    ContainmentWithoutPolygons {
        /// Declared geometry kind.
        kind: GeometryKind,
    },
}

impl DatasetDescriptor {
    /// Validates and constructs a [`DatasetDescriptor`].
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] for contradictory configuration; validation
    /// runs before any network activity.
    pub fn new(
        endpoint: impl Into<String>,
        layer_id: u32,
        geometry_kind: GeometryKind,
        supports_containment: bool,
        max_radius_miles: f64,
        identity_fields: Vec<String>,
    ) -> Result<Self, DatasetError> {
        let descriptor = Self {
            endpoint: endpoint.into(),
            layer_id,
            geometry_kind,
            supports_containment,
            max_radius_miles,
            identity_fields,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Re-run construction-time validation.
    ///
    /// Fields are public, so the resolver re-checks a descriptor before
    /// issuing requests.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] for contradictory configuration.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.endpoint.is_empty() {
            return Err(DatasetError::EmptyEndpoint);
        }
        if !self.max_radius_miles.is_finite() || self.max_radius_miles <= 0.0 {
            return Err(DatasetError::InvalidMaxRadius {
                value: self.max_radius_miles,
            });
        }
        if self.supports_containment && self.geometry_kind != GeometryKind::Polygon {
            return Err(DatasetError::ContainmentWithoutPolygons {
                kind: self.geometry_kind,
            });
        }
        Ok(())
    }
}

/// One resolution request: an origin and an optional search radius.
///
/// An absent or non-positive radius means only a containment pass is
/// attempted (when the dataset supports one); a present radius is clamped
/// to the dataset's ceiling before use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryRequest {
    /// Validated query origin.
    pub origin: Coordinate,
    /// Requested search radius in miles, if any.
    pub radius_miles: Option<f64>,
}

impl QueryRequest {
    /// Construct a request around a validated origin.
    #[must_use]
    pub const fn new(origin: Coordinate, radius_miles: Option<f64>) -> Self {
        Self {
            origin,
            radius_miles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn base_descriptor() -> DatasetDescriptor {
        DatasetDescriptor {
            endpoint: "https://gis.example.com/arcgis/rest/services/Parcels/FeatureServer"
                .to_owned(),
            layer_id: 0,
            geometry_kind: GeometryKind::Polygon,
            supports_containment: true,
            max_radius_miles: 50.0,
            identity_fields: vec!["OBJECTID".to_owned()],
        }
    }

    #[rstest]
    fn accepts_well_formed_configuration() {
        assert!(base_descriptor().validate().is_ok());
    }

    #[rstest]
    fn rejects_empty_endpoint() {
        let mut descriptor = base_descriptor();
        descriptor.endpoint = String::new();
        assert_eq!(descriptor.validate(), Err(DatasetError::EmptyEndpoint));
    }

    #[rstest]
    #[case(-1.0)]
    #[case(0.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn rejects_invalid_max_radius(#[case] value: f64) {
        let mut descriptor = base_descriptor();
        descriptor.max_radius_miles = value;
        assert!(matches!(
            descriptor.validate(),
            Err(DatasetError::InvalidMaxRadius { .. })
        ));
    }

    #[rstest]
    #[case(GeometryKind::Point)]
    #[case(GeometryKind::Polyline)]
    #[case(GeometryKind::PolylineAsPoint)]
    fn rejects_containment_on_non_polygon_layers(#[case] kind: GeometryKind) {
        let mut descriptor = base_descriptor();
        descriptor.geometry_kind = kind;
        assert!(matches!(
            descriptor.validate(),
            Err(DatasetError::ContainmentWithoutPolygons { .. })
        ));
    }

    #[rstest]
    fn constructor_applies_validation() {
        let result = DatasetDescriptor::new(
            "https://gis.example.com/FeatureServer",
            3,
            GeometryKind::Polyline,
            false,
            -2.0,
            Vec::new(),
        );
        assert!(matches!(
            result,
            Err(DatasetError::InvalidMaxRadius { value }) if value == -2.0
        ));
    }
}
