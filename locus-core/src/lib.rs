//! Core domain types and geometry for the Locus engine.
//!
//! Responsibilities:
//! - Validated coordinate and geometry models.
//! - Great-circle distance and point-in-polygon primitives.
//! - Radius clamping and unit conversion policy.
//! - Feature, dataset descriptor and resolver event vocabulary.
//!
//! Boundaries:
//! - No I/O and no async; remote access lives in `locus-data`.
//! - Attributes returned by remote services are carried verbatim and never
//!   interpreted here.
//!
//! Invariants:
//! - Constructors return `Result` so invalid input surfaces before any
//!   network activity.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod containment;
mod coordinate;
mod dataset;
pub mod events;
mod feature;
pub mod geodesy;
mod geometry;
pub mod radius;

pub use coordinate::{Coordinate, CoordinateError};
pub use dataset::{DatasetDescriptor, DatasetError, GeometryKind, QueryRequest};
pub use events::{EventSink, NullSink, PassKind, ResolverEvent};
pub use feature::{AttributeMap, Feature, FeatureId, first_attribute, resolve_identity};
pub use geometry::{Geometry, Path, Ring, centroid};
