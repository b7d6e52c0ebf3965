//! Remote feature-service contract.
//!
//! A [`FeatureSource`] answers one batch request at a time; pagination and
//! error recovery sit above it in the fetcher. The HTTP implementation
//! speaks the Esri-style query protocol; tests substitute a scripted
//! source.

mod http;
mod response;

use async_trait::async_trait;
use locus_core::Coordinate;
use thiserror::Error;

pub use http::{
    DEFAULT_USER_AGENT, HttpFeatureSource, HttpFeatureSourceConfig, HttpSourceBuildError,
};
pub use response::{FeaturePage, QueryResponse, RawFeature, RawGeometry, ServiceErrorBody};

/// The spatial predicate applied to one batch request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpatialFilter {
    /// Point-geometry intersection, no distance buffer. Used by the
    /// containment pass; the remote predicate is a pre-filter only and the
    /// resolver re-verifies containment locally.
    Intersects,
    /// Distance buffer around the origin. Used by the proximity pass; the
    /// buffer is likewise a pre-filter and computed distances are
    /// authoritative.
    WithinDistance {
        /// Buffer radius in meters.
        meters: f64,
    },
}

/// One batch request against a feature service.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    /// Feature-service base URL.
    pub endpoint: String,
    /// Layer identifier under the endpoint.
    pub layer_id: u32,
    /// Query origin.
    pub origin: Coordinate,
    /// Spatial predicate for this batch.
    pub filter: SpatialFilter,
    /// Offset of the batch within the result window.
    pub offset: usize,
    /// Maximum number of records requested for the batch.
    pub page_size: usize,
}

impl PageQuery {
    /// The same query repositioned at `offset`.
    #[must_use]
    pub fn at_offset(&self, offset: usize) -> Self {
        Self {
            offset,
            ..self.clone()
        }
    }
}

/// Errors from a single batch request.
///
/// All three variants are recovered inside a pass: the fetcher keeps its
/// partial accumulation and reports degradation through the event sink,
/// never as an error to the resolver's caller.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceError {
    /// The service could not be reached, or the request timed out.
    #[error("feature service unavailable at {url}: {message}")]
    Unavailable {
        /// Fully qualified request URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The service answered with an error payload.
    #[error("feature service reported error {code}: {message}")]
    ServiceReported {
        /// Service-specific error code.
        code: i64,
        /// Error description supplied by the service.
        message: String,
    },
    /// The response body did not match the expected shape.
    #[error("malformed feature service response: {message}")]
    Malformed {
        /// Description of the decoding failure.
        message: String,
    },
}

/// Fetch one batch of features from a remote service.
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Issue one batch request.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the batch fails; the caller decides how
    /// to degrade.
    async fn fetch_page(&self, query: &PageQuery) -> Result<FeaturePage, SourceError>;
}

#[async_trait]
impl<S: FeatureSource + ?Sized> FeatureSource for std::sync::Arc<S> {
    async fn fetch_page(&self, query: &PageQuery) -> Result<FeaturePage, SourceError> {
        self.as_ref().fetch_page(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_query() -> PageQuery {
        PageQuery {
            endpoint: "https://gis.example.com/FeatureServer".to_owned(),
            layer_id: 2,
            origin: Coordinate::new(28.0, -82.0).expect("valid origin"),
            filter: SpatialFilter::Intersects,
            offset: 0,
            page_size: 2000,
        }
    }

    #[test]
    fn at_offset_repositions_without_other_changes() {
        let query = sample_query();
        let moved = query.at_offset(4000);
        assert_eq!(moved.offset, 4000);
        assert_eq!(moved.endpoint, query.endpoint);
        assert_eq!(moved.filter, query.filter);
        assert_eq!(moved.page_size, query.page_size);
    }

    #[test]
    fn source_error_messages_are_descriptive() {
        let error = SourceError::ServiceReported {
            code: 400,
            message: "Invalid query".to_owned(),
        };
        assert_eq!(
            error.to_string(),
            "feature service reported error 400: Invalid query"
        );
    }
}
