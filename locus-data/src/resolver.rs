//! Containment-and-proximity resolution against one dataset.
//!
//! One call runs up to two paginated passes (containment and proximity,
//! concurrently), re-verifies containment locally, annotates every feature
//! with its distance, de-duplicates across passes by stable identity,
//! filters to the clamped radius and ranks the result. Remote failures
//! degrade to partial results; only contradictory caller input is an
//! error.

use std::collections::HashSet;
use std::sync::Arc;

use locus_core::containment::point_in_polygon;
use locus_core::events::{EventSink, PassKind, ResolverEvent};
use locus_core::geodesy::{haversine_miles, polygon_distance_miles, polyline_distance_miles};
use locus_core::radius::{clamp_radius, miles_to_meters};
use locus_core::{
    DatasetDescriptor, DatasetError, Feature, FeatureId, Geometry, GeometryKind, QueryRequest,
    centroid, resolve_identity,
};
use geo::Coord;
use thiserror::Error;

use crate::fetcher::{FetchSettings, PassOutcome, fetch_all};
use crate::service::{FeatureSource, PageQuery, RawFeature, RawGeometry, SpatialFilter};

/// The ranked outcome of one resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Containing features first (discovery order), then nearby features
    /// ascending by distance.
    pub features: Vec<Feature>,
    /// Whether either pass stopped before its remote window was exhausted.
    /// Not an error: the features present are still valid.
    pub truncated: bool,
}

/// Errors for structurally invalid resolver input.
///
/// Remote failures never surface here; they degrade the affected pass
/// instead.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolveError {
    /// The dataset descriptor carried contradictory configuration.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// An [`EventSink`] forwarding resolver events to the `log` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&self, event: &ResolverEvent) {
        match event {
            ResolverEvent::PassStarted { pass } => log::debug!("{pass} pass started"),
            ResolverEvent::PageFetched {
                pass,
                offset,
                count,
                more,
            } => log::debug!("{pass} pass fetched {count} features at offset {offset} (more: {more})"),
            ResolverEvent::PassDegraded { pass, message } => {
                log::warn!("{pass} pass degraded, keeping partial results: {message}");
            }
            ResolverEvent::PassTruncated { pass, offset } => {
                log::warn!("{pass} pass truncated at offset ceiling {offset}");
            }
            ResolverEvent::Resolved { count, truncated } => {
                log::debug!("resolved {count} features (truncated: {truncated})");
            }
        }
    }
}

/// Resolves containment and proximity queries against a feature source.
///
/// Each call is a self-contained unit of work: the resolver holds no
/// per-call state, so one instance can serve many concurrent resolutions.
pub struct Resolver<S> {
    source: S,
    sink: Arc<dyn EventSink>,
    settings: FetchSettings,
}

impl<S: std::fmt::Debug> std::fmt::Debug for Resolver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("source", &self.source)
            .field("sink", &"<dyn EventSink>")
            .field("settings", &self.settings)
            .finish()
    }
}

impl<S: FeatureSource> Resolver<S> {
    /// Create a resolver that logs events through [`LogSink`].
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            sink: Arc::new(LogSink),
            settings: FetchSettings::default(),
        }
    }

    /// Replace the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the pagination settings.
    #[must_use]
    pub fn with_settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Resolve one request against one dataset.
    ///
    /// The containment pass runs when the dataset supports it; the
    /// proximity pass runs when the clamped radius is positive. The two
    /// passes are independent and run concurrently. An empty feature list
    /// is a valid, non-error result.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] only for contradictory dataset
    /// configuration, before any network activity.
    pub async fn resolve(
        &self,
        request: &QueryRequest,
        dataset: &DatasetDescriptor,
    ) -> Result<Resolution, ResolveError> {
        dataset.validate()?;
        let clamped_radius = clamp_radius(request.radius_miles, dataset.max_radius_miles);
        let origin = request.origin.to_coord();

        let containment_template = dataset
            .supports_containment
            .then(|| self.page_template(request, dataset, SpatialFilter::Intersects));
        let proximity_template = (clamped_radius > 0.0).then(|| {
            self.page_template(
                request,
                dataset,
                SpatialFilter::WithinDistance {
                    meters: miles_to_meters(clamped_radius),
                },
            )
        });

        let (containment_outcome, proximity_outcome) = tokio::join!(
            self.run_pass(containment_template, PassKind::Containment),
            self.run_pass(proximity_template, PassKind::Proximity),
        );
        let truncated = containment_outcome.truncated || proximity_outcome.truncated;

        let mut seen = HashSet::new();
        let mut features =
            confirm_containment(origin, dataset, containment_outcome.features, &mut seen);
        let nearby = annotate_proximity(
            origin,
            dataset,
            clamped_radius,
            proximity_outcome.features,
            &mut seen,
        );
        features.extend(nearby);

        self.sink.record(&ResolverEvent::Resolved {
            count: features.len(),
            truncated,
        });
        Ok(Resolution {
            features,
            truncated,
        })
    }

    fn page_template(
        &self,
        request: &QueryRequest,
        dataset: &DatasetDescriptor,
        filter: SpatialFilter,
    ) -> PageQuery {
        PageQuery {
            endpoint: dataset.endpoint.clone(),
            layer_id: dataset.layer_id,
            origin: request.origin,
            filter,
            offset: 0,
            page_size: self.settings.page_size,
        }
    }

    async fn run_pass(&self, template: Option<PageQuery>, pass: PassKind) -> PassOutcome {
        let Some(template) = template else {
            return PassOutcome::default();
        };
        self.sink.record(&ResolverEvent::PassStarted { pass });
        fetch_all(
            &self.source,
            &template,
            &self.settings,
            self.sink.as_ref(),
            pass,
        )
        .await
    }
}

/// Keep only containment-pass features whose polygon really contains the
/// origin.
///
/// The remote `intersects` predicate is a pre-filter, not authoritative:
/// every feature is re-verified with the local ray caster before it is
/// classified as containing.
fn confirm_containment(
    origin: Coord<f64>,
    dataset: &DatasetDescriptor,
    raw_features: Vec<RawFeature>,
    seen: &mut HashSet<FeatureId>,
) -> Vec<Feature> {
    let mut containing = Vec::new();
    for (position, raw) in raw_features.into_iter().enumerate() {
        let geometry = raw.geometry.as_ref().and_then(RawGeometry::to_geometry);
        let confirmed = geometry
            .as_ref()
            .and_then(Geometry::rings)
            .is_some_and(|rings| point_in_polygon(origin, rings));
        if !confirmed {
            continue;
        }
        let id = resolve_identity(&raw.attributes, &dataset.identity_fields, position);
        if !seen.insert(id.clone()) {
            continue;
        }
        containing.push(Feature {
            id,
            geometry,
            attributes: raw.attributes,
            distance_miles: Some(0.0),
            containing: true,
        });
    }
    containing
}

/// Annotate proximity-pass features with distances, drop duplicates of
/// containing features and anything beyond the clamped radius, and sort
/// ascending by distance.
///
/// The remote buffer filter is also a pre-filter: buffer queries can
/// return edge cases beyond the true distance, so the computed distance is
/// what decides inclusion.
fn annotate_proximity(
    origin: Coord<f64>,
    dataset: &DatasetDescriptor,
    clamped_radius: f64,
    raw_features: Vec<RawFeature>,
    seen: &mut HashSet<FeatureId>,
) -> Vec<Feature> {
    let mut nearby = Vec::new();
    for (position, raw) in raw_features.into_iter().enumerate() {
        let id = resolve_identity(&raw.attributes, &dataset.identity_fields, position);
        if seen.contains(&id) {
            // Already classified as containing; that classification wins.
            continue;
        }
        let geometry = raw.geometry.as_ref().and_then(RawGeometry::to_geometry);
        let (distance, contains) = annotate(origin, dataset.geometry_kind, geometry.as_ref());
        if !contains && distance > clamped_radius {
            continue;
        }
        seen.insert(id.clone());
        nearby.push(Feature {
            id,
            geometry,
            attributes: raw.attributes,
            distance_miles: Some(if contains { 0.0 } else { distance }),
            containing: contains,
        });
    }
    // Containing features re-confirmed in this pass rank with the
    // containment results; the rest sort ascending by distance.
    nearby.sort_by(|a, b| {
        b.containing.cmp(&a.containing).then_with(|| {
            let left = a.distance_miles.unwrap_or(f64::INFINITY);
            let right = b.distance_miles.unwrap_or(f64::INFINITY);
            left.total_cmp(&right)
        })
    });
    nearby
}

/// Distance from the origin via the geometry-appropriate function, plus
/// whether the geometry contains the origin.
fn annotate(
    origin: Coord<f64>,
    kind: GeometryKind,
    geometry: Option<&Geometry>,
) -> (f64, bool) {
    match geometry {
        None => (f64::INFINITY, false),
        Some(Geometry::Polygon(rings)) => {
            if point_in_polygon(origin, rings) {
                (0.0, true)
            } else {
                (polygon_distance_miles(origin, rings), false)
            }
        }
        Some(Geometry::Polyline(paths)) => match kind {
            // Line datasets queried "as points" measure to the centroid.
            GeometryKind::PolylineAsPoint => centroid(paths)
                .map_or((f64::INFINITY, false), |c| {
                    (haversine_miles(origin, c), false)
                }),
            _ => (polyline_distance_miles(origin, paths), false),
        },
        Some(Geometry::Point(point)) => (haversine_miles(origin, *point), false),
    }
}
