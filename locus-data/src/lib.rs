//! Remote access and orchestration for the Locus engine.
//!
//! Responsibilities:
//! - Define the [`FeatureSource`] trait over remote feature services and
//!   provide the HTTP implementation.
//! - Drive offset-based pagination with backoff and a hard safety ceiling.
//! - Resolve containment and proximity passes into one ranked feature list.
//!
//! Boundaries:
//! - Geometry math and domain rules live in `locus-core`.
//! - Remote failures degrade to partial results; they never abort a
//!   resolution.
//!
//! Invariants:
//! - No global mutable state; every resolution is a self-contained unit of
//!   work and resolutions may run concurrently.

#![forbid(unsafe_code)]

mod blocking;
mod fetcher;
mod resolver;
pub mod service;
pub mod test_support;

pub use blocking::{BlockingResolver, BlockingResolverError};
pub use fetcher::{BackoffPolicy, FetchSettings, PassOutcome, fetch_all};
pub use resolver::{LogSink, Resolution, ResolveError, Resolver};
pub use service::{
    FeaturePage, FeatureSource, HttpFeatureSource, HttpFeatureSourceConfig, HttpSourceBuildError,
    PageQuery, SourceError, SpatialFilter,
};
