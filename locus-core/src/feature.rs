//! Resolved features and attribute identity helpers.

use serde_json::{Map, Value};

use crate::geometry::Geometry;

/// A remote feature's raw attribute dictionary, carried verbatim.
pub type AttributeMap = Map<String, Value>;

/// Stable identity of a feature across query passes.
///
/// Identity is drawn from a dataset's ordered identity-field candidates;
/// [`FeatureId::Index`] is the positional last resort when no candidate
/// yields a usable value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureId {
    /// A string-valued identity attribute.
    Text(String),
    /// An integer-valued identity attribute.
    Number(i64),
    /// Positional fallback within one pass's raw output.
    Index(usize),
}

/// A feature annotated with distance and containment, ready for ranking.
///
/// Created once per raw record returned by a remote pass and never mutated
/// afterwards; each resolver call owns its features exclusively.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Stable identity used for de-duplication across passes.
    pub id: FeatureId,
    /// Parsed geometry, when the provider supplied a usable shape.
    pub geometry: Option<Geometry>,
    /// Raw attributes, kept verbatim and never interpreted by the engine.
    pub attributes: AttributeMap,
    /// Great-circle distance from the query origin in miles; zero for
    /// containing features, absent when no proximity pass ran.
    pub distance_miles: Option<f64>,
    /// Whether the feature's polygon contains the query origin.
    pub containing: bool,
}

/// Return the first present, non-null value among `candidates`.
///
/// The declarative replacement for per-dataset
/// `attrs.FIELD || attrs.field || attrs.ALT_FIELD` fallback chains:
/// candidates are tried in declared priority order.
#[must_use]
pub fn first_attribute<'a>(attributes: &'a AttributeMap, candidates: &[String]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|name| attributes.get(name))
        .find(|value| !value.is_null())
}

/// Resolve a feature's stable identity.
///
/// Candidates are tried in declared order; string and integer attribute
/// values are accepted. When no candidate matches, the feature's position
/// within its pass is used as a last resort.
#[must_use]
pub fn resolve_identity(
    attributes: &AttributeMap,
    candidates: &[String],
    position: usize,
) -> FeatureId {
    for name in candidates {
        match attributes.get(name) {
            Some(Value::String(text)) if !text.is_empty() => {
                return FeatureId::Text(text.clone());
            }
            Some(Value::Number(number)) => {
                if let Some(value) = number.as_i64() {
                    return FeatureId::Number(value);
                }
            }
            _ => {}
        }
    }
    FeatureId::Index(position)
}
