//! Synchronous facade over the async resolver.
//!
//! The resolver is async so its two passes can run concurrently and so
//! inter-batch waits suspend only the calling task. Callers embedded in
//! synchronous code use [`BlockingResolver`], which owns a current-thread
//! Tokio runtime and bridges each call onto it.
//!
//! # Runtime behaviour
//!
//! When called from outside any Tokio runtime, the facade uses its own
//! stored runtime. When called from within an existing multi-threaded
//! runtime (detected via [`Handle::try_current`]), it uses that runtime's
//! handle with [`tokio::task::block_in_place`] to avoid nested-runtime
//! panics. When called from within a `current_thread` runtime, it falls
//! back to its own runtime, which may deadlock if the caller's runtime is
//! driving IO this request depends on.

use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use locus_core::{DatasetDescriptor, QueryRequest};

use crate::resolver::{Resolution, ResolveError, Resolver};
use crate::service::FeatureSource;

/// Errors from [`BlockingResolver`] construction.
#[derive(Debug, Error)]
pub enum BlockingResolverError {
    /// The Tokio runtime failed to build.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Blocking wrapper around [`Resolver`].
#[derive(Debug)]
pub struct BlockingResolver<S> {
    inner: Resolver<S>,
    runtime: Runtime,
}

impl<S: FeatureSource> BlockingResolver<S> {
    /// Wrap an async resolver.
    ///
    /// # Errors
    ///
    /// Returns [`BlockingResolverError`] when the internal runtime fails
    /// to build.
    pub fn new(inner: Resolver<S>) -> Result<Self, BlockingResolverError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { inner, runtime })
    }

    /// Resolve one request, blocking the calling thread until completion.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] only for contradictory dataset
    /// configuration, exactly as [`Resolver::resolve`].
    pub fn resolve(
        &self,
        request: &QueryRequest,
        dataset: &DatasetDescriptor,
    ) -> Result<Resolution, ResolveError> {
        let future = self.inner.resolve(request, dataset);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            // No runtime detected, or current_thread runtime: use our own.
            _ => self.runtime.block_on(future),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locus_core::{Coordinate, GeometryKind};

    use crate::fetcher::{BackoffPolicy, FetchSettings};
    use crate::test_support::{ScriptedSource, point_feature};
    use crate::service::{FeaturePage, SourceError};

    fn point_dataset() -> DatasetDescriptor {
        DatasetDescriptor {
            endpoint: "https://gis.example.com/FeatureServer".to_owned(),
            layer_id: 0,
            geometry_kind: GeometryKind::Point,
            supports_containment: false,
            max_radius_miles: 50.0,
            identity_fields: vec!["OBJECTID".to_owned()],
        }
    }

    fn quick_settings() -> FetchSettings {
        FetchSettings {
            backoff: BackoffPolicy::none(),
            ..FetchSettings::default()
        }
    }

    #[test]
    fn resolves_outside_any_runtime() {
        let source = ScriptedSource::new().proximity_page(Ok(FeaturePage {
            features: vec![point_feature("OBJECTID", 1, -82.0, 28.0)],
            more: false,
        }));
        let resolver = BlockingResolver::new(
            Resolver::new(source).with_settings(quick_settings()),
        )
        .expect("runtime should build");

        let origin = Coordinate::new(28.0, -82.0).expect("valid origin");
        let resolution = resolver
            .resolve(&QueryRequest::new(origin, Some(10.0)), &point_dataset())
            .expect("resolution should succeed");

        assert_eq!(resolution.features.len(), 1);
        assert!(!resolution.truncated);
    }

    #[test]
    fn degraded_source_still_yields_empty_result() {
        let source = ScriptedSource::new().proximity_page(Err(SourceError::Unavailable {
            url: "https://gis.example.com".to_owned(),
            message: "connection refused".to_owned(),
        }));
        let resolver = BlockingResolver::new(
            Resolver::new(source).with_settings(quick_settings()),
        )
        .expect("runtime should build");

        let origin = Coordinate::new(28.0, -82.0).expect("valid origin");
        let resolution = resolver
            .resolve(&QueryRequest::new(origin, Some(10.0)), &point_dataset())
            .expect("remote failure must not surface as an error");

        assert!(resolution.features.is_empty());
        assert!(resolution.truncated);
    }
}
