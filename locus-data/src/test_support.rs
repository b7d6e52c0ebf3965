//! Test doubles for the remote layer.
//!
//! [`ScriptedSource`] plays back pre-programmed page results without any
//! network activity, keeping separate scripts for the containment and
//! proximity passes so concurrent passes stay deterministic.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use locus_core::events::{EventSink, ResolverEvent};
use serde_json::json;

use crate::service::{
    FeaturePage, FeatureSource, PageQuery, RawFeature, RawGeometry, SourceError, SpatialFilter,
};

type Script = Mutex<VecDeque<Result<FeaturePage, SourceError>>>;

/// A [`FeatureSource`] that returns scripted page results.
///
/// Pages are queued per pass (chosen by the query's spatial filter) and
/// consumed in order; an exhausted queue yields empty, exhausted pages.
/// Every received query is recorded for assertion.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    containment: Script,
    proximity: Script,
    recorded: Mutex<Vec<PageQuery>>,
}

impl ScriptedSource {
    /// An empty script: every request returns an empty, exhausted page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next containment-pass page result.
    #[must_use]
    pub fn containment_page(self, result: Result<FeaturePage, SourceError>) -> Self {
        lock(&self.containment).push_back(result);
        self
    }

    /// Queue the next proximity-pass page result.
    #[must_use]
    pub fn proximity_page(self, result: Result<FeaturePage, SourceError>) -> Self {
        lock(&self.proximity).push_back(result);
        self
    }

    /// Every query received so far, in arrival order.
    #[must_use]
    pub fn recorded_queries(&self) -> Vec<PageQuery> {
        lock(&self.recorded).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl FeatureSource for ScriptedSource {
    async fn fetch_page(&self, query: &PageQuery) -> Result<FeaturePage, SourceError> {
        lock(&self.recorded).push(query.clone());
        let script = match query.filter {
            SpatialFilter::Intersects => &self.containment,
            SpatialFilter::WithinDistance { .. } => &self.proximity,
        };
        lock(script)
            .pop_front()
            .unwrap_or_else(|| Ok(FeaturePage::default()))
    }
}

/// An [`EventSink`] that stores every event for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ResolverEvent>>,
}

impl CollectingSink {
    /// Every event recorded so far, in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<ResolverEvent> {
        lock(&self.events).clone()
    }
}

impl EventSink for CollectingSink {
    fn record(&self, event: &ResolverEvent) {
        lock(&self.events).push(event.clone());
    }
}

/// A raw point feature with a single identity attribute.
#[must_use]
pub fn point_feature(id_field: &str, id: i64, x: f64, y: f64) -> RawFeature {
    RawFeature {
        attributes: attributes(id_field, id),
        geometry: Some(RawGeometry::point(x, y)),
    }
}

/// A raw polyline feature with a single identity attribute.
#[must_use]
pub fn polyline_feature(id_field: &str, id: i64, paths: Vec<Vec<(f64, f64)>>) -> RawFeature {
    RawFeature {
        attributes: attributes(id_field, id),
        geometry: Some(RawGeometry::polyline(paths)),
    }
}

/// A raw polygon feature with a single identity attribute.
#[must_use]
pub fn polygon_feature(id_field: &str, id: i64, rings: Vec<Vec<(f64, f64)>>) -> RawFeature {
    RawFeature {
        attributes: attributes(id_field, id),
        geometry: Some(RawGeometry::polygon(rings)),
    }
}

fn attributes(id_field: &str, id: i64) -> locus_core::AttributeMap {
    let mut map = locus_core::AttributeMap::new();
    map.insert(id_field.to_owned(), json!(id));
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use locus_core::Coordinate;

    fn query(filter: SpatialFilter) -> PageQuery {
        PageQuery {
            endpoint: "https://gis.example.com/FeatureServer".to_owned(),
            layer_id: 0,
            origin: Coordinate::new(0.0, 0.0).expect("valid origin"),
            filter,
            offset: 0,
            page_size: 2000,
        }
    }

    #[tokio::test]
    async fn scripts_are_keyed_by_filter() {
        let source = ScriptedSource::new()
            .containment_page(Ok(FeaturePage {
                features: vec![point_feature("OBJECTID", 1, 0.0, 0.0)],
                more: false,
            }))
            .proximity_page(Err(SourceError::Malformed {
                message: "truncated body".to_owned(),
            }));

        let containment = source
            .fetch_page(&query(SpatialFilter::Intersects))
            .await
            .expect("containment page should succeed");
        assert_eq!(containment.features.len(), 1);

        let proximity = source
            .fetch_page(&query(SpatialFilter::WithinDistance { meters: 100.0 }))
            .await;
        assert!(matches!(proximity, Err(SourceError::Malformed { .. })));

        assert_eq!(source.recorded_queries().len(), 2);
    }

    #[tokio::test]
    async fn exhausted_script_returns_empty_pages() {
        let source = ScriptedSource::new();
        let page = source
            .fetch_page(&query(SpatialFilter::Intersects))
            .await
            .expect("should succeed");
        assert!(page.features.is_empty());
        assert!(!page.more);
    }
}
