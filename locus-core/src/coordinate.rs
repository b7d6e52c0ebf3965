use geo::Coord;
use thiserror::Error;

/// A validated WGS84 position.
///
/// Latitude is restricted to `[-90, 90]` and longitude to `[-180, 180]`;
/// both components must be finite. Construction is the only place these
/// checks run, so a `Coordinate` held by a caller is always structurally
/// valid.
///
/// # Examples
/// ```
/// use locus_core::Coordinate;
///
/// # fn main() -> Result<(), locus_core::CoordinateError> {
/// let origin = Coordinate::new(28.0, -82.0)?;
/// assert_eq!(origin.latitude(), 28.0);
/// assert_eq!(origin.longitude(), -82.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

/// Errors returned by [`Coordinate::new`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordinateError {
    /// Latitude was not finite or fell outside `[-90, 90]`.
    #[error("latitude {value} is outside [-90, 90]")]
    Latitude {
        /// Offending latitude value.
        value: f64,
    },
    /// Longitude was not finite or fell outside `[-180, 180]`.
    #[error("longitude {value} is outside [-180, 180]")]
    Longitude {
        /// Offending longitude value.
        value: f64,
    },
}

impl Coordinate {
    /// Validates and constructs a [`Coordinate`].
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] when either component is non-finite or
    /// out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude { value: latitude });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude { value: longitude });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// The position as a [`geo::Coord`] with `x = longitude`, `y = latitude`.
    #[must_use]
    pub const fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}
