//! Behavioural tests for the resolver over a scripted feature source.
//!
//! These cover the end-to-end contracts: radius clamping, local
//! containment re-verification, distance annotation, cross-pass
//! de-duplication, radius filtering, ranking and failure isolation.

use geo::Coord;
use locus_core::geodesy::{haversine_miles, polygon_distance_miles};
use locus_core::{Coordinate, DatasetDescriptor, FeatureId, GeometryKind, QueryRequest};
use locus_data::test_support::{CollectingSink, ScriptedSource, point_feature, polygon_feature};
use locus_data::{FeaturePage, Resolver, SourceError, SpatialFilter};
use std::sync::Arc;

fn polygon_dataset(max_radius_miles: f64) -> DatasetDescriptor {
    DatasetDescriptor {
        endpoint: "https://gis.example.com/arcgis/rest/services/Zones/FeatureServer".to_owned(),
        layer_id: 0,
        geometry_kind: GeometryKind::Polygon,
        supports_containment: true,
        max_radius_miles,
        identity_fields: vec!["OBJECTID".to_owned()],
    }
}

fn point_dataset(max_radius_miles: f64) -> DatasetDescriptor {
    DatasetDescriptor {
        endpoint: "https://gis.example.com/arcgis/rest/services/Sites/FeatureServer".to_owned(),
        layer_id: 1,
        geometry_kind: GeometryKind::Point,
        supports_containment: false,
        max_radius_miles,
        identity_fields: vec!["OBJECTID".to_owned()],
    }
}

fn origin(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).expect("valid origin")
}

fn triangle_rings() -> Vec<Vec<(f64, f64)>> {
    vec![vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (0.0, 0.0)]]
}

fn page(features: Vec<locus_data::service::RawFeature>) -> FeaturePage {
    FeaturePage {
        features,
        more: false,
    }
}

#[tokio::test]
async fn requested_radius_is_clamped_and_sent_in_meters() {
    let source = Arc::new(ScriptedSource::new());
    let resolver = Resolver::new(Arc::clone(&source));

    let request = QueryRequest::new(origin(28.0, -82.0), Some(1000.0));
    resolver
        .resolve(&request, &point_dataset(50.0))
        .await
        .expect("resolution should succeed");

    let queries = source.recorded_queries();
    assert_eq!(queries.len(), 1, "expected a single proximity batch");
    match queries[0].filter {
        SpatialFilter::WithinDistance { meters } => assert_eq!(meters, 50.0 * 1609.34),
        SpatialFilter::Intersects => panic!("expected a distance-buffer filter"),
    }
}

#[tokio::test]
async fn triangle_containing_origin_resolves_with_zero_distance() {
    let source = ScriptedSource::new().containment_page(Ok(page(vec![polygon_feature(
        "OBJECTID",
        7,
        triangle_rings(),
    )])));
    let resolver = Resolver::new(source);

    let request = QueryRequest::new(origin(5.0, 5.0), None);
    let resolution = resolver
        .resolve(&request, &polygon_dataset(50.0))
        .await
        .expect("resolution should succeed");

    assert_eq!(resolution.features.len(), 1);
    let feature = &resolution.features[0];
    assert_eq!(feature.id, FeatureId::Number(7));
    assert!(feature.containing);
    assert_eq!(feature.distance_miles, Some(0.0));
}

#[tokio::test]
async fn triangle_beyond_origin_gets_nearest_edge_distance() {
    let source = ScriptedSource::new().proximity_page(Ok(page(vec![polygon_feature(
        "OBJECTID",
        7,
        triangle_rings(),
    )])));
    let resolver = Resolver::new(source);

    let request = QueryRequest::new(origin(20.0, 20.0), Some(2000.0));
    let resolution = resolver
        .resolve(&request, &polygon_dataset(5000.0))
        .await
        .expect("resolution should succeed");

    assert_eq!(resolution.features.len(), 1);
    let feature = &resolution.features[0];
    assert!(!feature.containing);
    let probe = Coord { x: 20.0, y: 20.0 };
    let rings = vec![vec![
        Coord { x: 0.0, y: 0.0 },
        Coord { x: 0.0, y: 10.0 },
        Coord { x: 10.0, y: 10.0 },
        Coord { x: 0.0, y: 0.0 },
    ]];
    let expected = polygon_distance_miles(probe, &rings);
    assert!(expected.is_finite());
    assert!(expected > 0.0);
    assert_eq!(feature.distance_miles, Some(expected));
}

#[tokio::test]
async fn feature_seen_in_both_passes_resolves_once_as_containing() {
    let source = ScriptedSource::new()
        .containment_page(Ok(page(vec![polygon_feature(
            "OBJECTID",
            7,
            triangle_rings(),
        )])))
        .proximity_page(Ok(page(vec![polygon_feature(
            "OBJECTID",
            7,
            triangle_rings(),
        )])));
    let resolver = Resolver::new(source);

    let request = QueryRequest::new(origin(5.0, 2.0), Some(10.0));
    let resolution = resolver
        .resolve(&request, &polygon_dataset(50.0))
        .await
        .expect("resolution should succeed");

    assert_eq!(resolution.features.len(), 1);
    assert_eq!(resolution.features[0].id, FeatureId::Number(7));
    assert!(resolution.features[0].containing);
}

#[tokio::test]
async fn results_rank_containing_first_then_ascending_distance() {
    // Two containing polygons, then two nearby points scripted farthest
    // first to prove the sort.
    let source = ScriptedSource::new()
        .containment_page(Ok(page(vec![
            polygon_feature("OBJECTID", 1, triangle_rings()),
            polygon_feature("OBJECTID", 2, triangle_rings()),
        ])))
        .proximity_page(Ok(page(vec![
            point_feature("OBJECTID", 3, 2.3, 5.0),
            point_feature("OBJECTID", 4, 2.1, 5.0),
        ])));
    let resolver = Resolver::new(source);

    let request = QueryRequest::new(origin(5.0, 2.0), Some(40.0));
    let resolution = resolver
        .resolve(&request, &polygon_dataset(50.0))
        .await
        .expect("resolution should succeed");

    let ids: Vec<&FeatureId> = resolution.features.iter().map(|f| &f.id).collect();
    assert_eq!(
        ids,
        vec![
            &FeatureId::Number(1),
            &FeatureId::Number(2),
            &FeatureId::Number(4),
            &FeatureId::Number(3),
        ]
    );

    for pair in resolution.features.windows(2) {
        let [first, second] = pair else { continue };
        let ordered = (first.containing && !second.containing)
            || (first.containing == second.containing
                && first.distance_miles <= second.distance_miles);
        assert!(ordered, "ranking invariant violated: {first:?} before {second:?}");
    }
}

#[tokio::test]
async fn proximity_features_beyond_clamped_radius_are_dropped() {
    // The remote buffer is a pre-filter; the computed distance decides.
    // One point ~3.5 miles out, one ~61 miles out, clamped radius 50.
    let near = point_feature("OBJECTID", 1, -82.0, 28.05);
    let far = point_feature("OBJECTID", 2, -81.0, 28.0);
    let source = ScriptedSource::new().proximity_page(Ok(page(vec![far, near])));
    let resolver = Resolver::new(source);

    let request = QueryRequest::new(origin(28.0, -82.0), Some(1000.0));
    let resolution = resolver
        .resolve(&request, &point_dataset(50.0))
        .await
        .expect("resolution should succeed");

    assert_eq!(resolution.features.len(), 1);
    let feature = &resolution.features[0];
    assert_eq!(feature.id, FeatureId::Number(1));
    let expected = haversine_miles(Coord { x: -82.0, y: 28.0 }, Coord { x: -82.0, y: 28.05 });
    assert_eq!(feature.distance_miles, Some(expected));
    assert!(expected <= 50.0);
}

#[tokio::test]
async fn failed_proximity_pass_leaves_containment_pass_intact() {
    let source = ScriptedSource::new()
        .containment_page(Ok(page(vec![polygon_feature(
            "OBJECTID",
            7,
            triangle_rings(),
        )])))
        .proximity_page(Err(SourceError::ServiceReported {
            code: 500,
            message: "Unable to complete operation".to_owned(),
        }));
    let sink = Arc::new(CollectingSink::default());
    let resolver = Resolver::new(source).with_sink(sink.clone());

    let request = QueryRequest::new(origin(5.0, 2.0), Some(10.0));
    let resolution = resolver
        .resolve(&request, &polygon_dataset(50.0))
        .await
        .expect("remote failure must not surface as an error");

    assert_eq!(resolution.features.len(), 1);
    assert!(resolution.features[0].containing);
    assert!(resolution.truncated);
    assert!(sink.events().iter().any(|event| matches!(
        event,
        locus_core::ResolverEvent::PassDegraded { .. }
    )));
}

#[tokio::test]
async fn unconfirmed_intersections_are_not_containing() {
    // The remote intersects pre-filter returned a polygon that does not
    // actually contain the origin; the local re-check drops it.
    let source = ScriptedSource::new().containment_page(Ok(page(vec![polygon_feature(
        "OBJECTID",
        7,
        triangle_rings(),
    )])));
    let resolver = Resolver::new(source);

    let request = QueryRequest::new(origin(20.0, 20.0), None);
    let resolution = resolver
        .resolve(&request, &polygon_dataset(50.0))
        .await
        .expect("resolution should succeed");

    assert!(resolution.features.is_empty());
    assert!(!resolution.truncated);
}

#[tokio::test]
async fn no_radius_and_no_containment_is_a_valid_empty_result() {
    let source = ScriptedSource::new();
    let resolver = Resolver::new(source);

    let request = QueryRequest::new(origin(28.0, -82.0), None);
    let resolution = resolver
        .resolve(&request, &polygon_dataset(50.0))
        .await
        .expect("resolution should succeed");

    assert!(resolution.features.is_empty());
    assert!(!resolution.truncated);
}

#[tokio::test]
async fn invalid_dataset_configuration_fails_before_any_request() {
    let source = ScriptedSource::new();
    let resolver = Resolver::new(source);

    let mut dataset = polygon_dataset(50.0);
    dataset.max_radius_miles = -1.0;
    let request = QueryRequest::new(origin(28.0, -82.0), Some(10.0));
    let error = resolver
        .resolve(&request, &dataset)
        .await
        .expect_err("contradictory configuration must fail fast");

    assert!(matches!(error, locus_data::ResolveError::Dataset(_)));
}
