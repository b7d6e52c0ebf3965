//! Facade crate for the Locus proximity and containment engine.
//!
//! This crate re-exports the core geometry and domain types together with the
//! remote-access layer, so most callers only need a single dependency.

#![forbid(unsafe_code)]

pub use locus_core::{
    Coordinate, CoordinateError, DatasetDescriptor, DatasetError, EventSink, Feature, FeatureId,
    Geometry, GeometryKind, NullSink, QueryRequest, ResolverEvent, first_attribute,
};

pub use locus_data::{
    BackoffPolicy, BlockingResolver, FeatureSource, FetchSettings, HttpFeatureSource,
    HttpFeatureSourceConfig, LogSink, PageQuery, Resolution, ResolveError, Resolver, SourceError,
    SpatialFilter,
};
