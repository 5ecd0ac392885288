//! Conversion of Overpass JSON output into context features.
//!
//! Tagged ways become features: closed ways carrying an area-like tag turn
//! into polygons, every other way into a line-string. Untagged ways only
//! appear as relation members and are never emitted on their own. For
//! multipolygon relations each closed `outer` member way becomes a separate
//! polygon carrying the relation's tags.

use std::collections::HashMap;

use fieldmark_core::{Feature, FeatureCollection, FeatureGeometry, FeatureProperties};
use geo::{Coord, LineString, Polygon};
use log::debug;
use serde::Deserialize;

/// Tag keys whose values are used as the feature `type`, in priority order.
const TYPE_KEYS: [&str; 6] = ["leisure", "landuse", "natural", "waterway", "amenity", "highway"];

/// Tag keys that make a closed way an area.
const AREA_KEYS: [&str; 7] = [
    "leisure", "landuse", "natural", "amenity", "building", "place", "water",
];

/// Top-level Overpass JSON response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsmResponse {
    /// Elements in response order.
    #[serde(default)]
    pub elements: Vec<OsmElement>,
}

/// A node, way or relation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OsmElement {
    /// A positioned node.
    Node {
        /// OSM identifier.
        id: i64,
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lon: f64,
    },
    /// An ordered list of node references.
    Way {
        /// OSM identifier.
        id: i64,
        /// Referenced node identifiers.
        #[serde(default)]
        nodes: Vec<i64>,
        /// Key/value tags.
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    /// A grouping of members.
    Relation {
        /// OSM identifier.
        id: i64,
        /// Relation members.
        #[serde(default)]
        members: Vec<OsmMember>,
        /// Key/value tags.
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    /// Any other element type, such as Overpass `area` results.
    #[serde(other)]
    Other,
}

/// Member of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OsmMember {
    /// Member element type: `node`, `way` or `relation`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Referenced element identifier.
    #[serde(rename = "ref")]
    pub reference: i64,
    /// Member role, e.g. `outer`.
    #[serde(default)]
    pub role: String,
}

/// Convert an Overpass response into features.
///
/// # Examples
/// ```
/// use fieldmark_data::overpass::{OsmResponse, osm_to_features};
///
/// let response: OsmResponse = serde_json::from_str(r#"{"elements": [
///     {"type": "node", "id": 1, "lat": 52.23, "lon": 6.85},
///     {"type": "node", "id": 2, "lat": 52.23, "lon": 6.86},
///     {"type": "way", "id": 10, "nodes": [1, 2], "tags": {"highway": "cycleway"}}
/// ]}"#)?;
/// let features = osm_to_features(&response);
/// assert_eq!(features.len(), 1);
/// assert_eq!(features.features[0].properties.kind.as_deref(), Some("cycleway"));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[must_use]
pub fn osm_to_features(response: &OsmResponse) -> FeatureCollection {
    let mut nodes = HashMap::new();
    let mut ways = HashMap::new();
    for element in &response.elements {
        match element {
            OsmElement::Node { id, lat, lon } => {
                nodes.insert(*id, Coord { x: *lon, y: *lat });
            }
            OsmElement::Way { id, nodes: refs, .. } => {
                ways.insert(*id, refs.as_slice());
            }
            OsmElement::Relation { .. } | OsmElement::Other => {}
        }
    }

    let mut features = Vec::new();
    for element in &response.elements {
        match element {
            OsmElement::Way { id, nodes: refs, tags } if !tags.is_empty() => {
                match way_feature(&nodes, refs, tags) {
                    Some(feature) => features.push(feature),
                    None => debug!("skipping way {id}: unresolved geometry"),
                }
            }
            OsmElement::Relation { id, members, tags } if is_multipolygon(tags) => {
                let before = features.len();
                features.extend(
                    members
                        .iter()
                        .filter(|member| member.kind == "way" && member.role == "outer")
                        .filter_map(|member| ways.get(&member.reference))
                        .filter_map(|refs| closed_ring(&nodes, refs))
                        .map(|ring| polygon_feature(ring, tags)),
                );
                if features.len() == before {
                    debug!("skipping relation {id}: no resolvable outer ways");
                }
            }
            _ => {}
        }
    }
    FeatureCollection::new(features)
}

fn is_multipolygon(tags: &HashMap<String, String>) -> bool {
    tags.get("type").is_some_and(|kind| kind == "multipolygon")
}

fn is_area(tags: &HashMap<String, String>) -> bool {
    match tags.get("area").map(String::as_str) {
        Some("yes") => return true,
        Some("no") => return false,
        _ => {}
    }
    AREA_KEYS.iter().any(|key| tags.contains_key(*key))
        || tags
            .get("waterway")
            .is_some_and(|value| matches!(value.as_str(), "riverbank" | "dock"))
}

fn properties(tags: &HashMap<String, String>) -> FeatureProperties {
    FeatureProperties {
        kind: TYPE_KEYS
            .iter()
            .find_map(|key| tags.get(*key))
            .or_else(|| tags.get("cycleway"))
            .cloned(),
        name: tags.get("name").cloned(),
    }
}

fn resolve(nodes: &HashMap<i64, Coord<f64>>, refs: &[i64]) -> Option<Vec<Coord<f64>>> {
    refs.iter().map(|id| nodes.get(id).copied()).collect()
}

fn closed_ring(nodes: &HashMap<i64, Coord<f64>>, refs: &[i64]) -> Option<LineString<f64>> {
    let is_closed = refs.len() >= 4 && refs.first() == refs.last();
    if !is_closed {
        return None;
    }
    resolve(nodes, refs).map(LineString::from)
}

fn polygon_feature(ring: LineString<f64>, tags: &HashMap<String, String>) -> Feature {
    Feature::new(FeatureGeometry::Polygon(Polygon::new(ring, Vec::new())))
        .with_properties(properties(tags))
}

fn way_feature(
    nodes: &HashMap<i64, Coord<f64>>,
    refs: &[i64],
    tags: &HashMap<String, String>,
) -> Option<Feature> {
    if is_area(tags) {
        if let Some(ring) = closed_ring(nodes, refs) {
            return Some(polygon_feature(ring, tags));
        }
    }
    let coords = resolve(nodes, refs)?;
    if coords.len() < 2 {
        return None;
    }
    Some(
        Feature::new(FeatureGeometry::LineString(LineString::from(coords)))
            .with_properties(properties(tags)),
    )
}
