//! GeoJSON `FeatureCollection` reading and writing.
//!
//! Only the geometry kinds the context engine understands are kept: points,
//! line-strings, multi-line-strings, polygons and multi-polygons. Features
//! with any other geometry, a missing geometry or malformed positions are
//! skipped with a debug log rather than failing the whole collection. Of the
//! properties, only `type` and `name` are retained.

use camino::{Utf8Path, Utf8PathBuf};
use fieldmark_core::{Feature, FeatureCollection, FeatureGeometry, FeatureProperties};
use geo::{Coord, LineString, MultiLineString, MultiPolygon, Point, Polygon};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while reading or writing GeoJSON.
#[derive(Debug, Error)]
pub enum GeoJsonError {
    /// The file could not be read.
    #[error("failed to read GeoJSON from {path}: {source}")]
    Read {
        /// File being read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file could not be written.
    #[error("failed to write GeoJSON to {path}: {source}")]
    Write {
        /// File being written.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON or has the wrong shape.
    #[error("invalid GeoJSON document: {source}")]
    Decode {
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The document is valid JSON but not a `FeatureCollection`.
    #[error("expected a GeoJSON FeatureCollection, found '{found}'")]
    NotFeatureCollection {
        /// The `type` member that was found.
        found: String,
    },
    /// Encoding the collection failed.
    #[error("failed to encode GeoJSON: {source}")]
    Encode {
        /// Encoder failure.
        #[source]
        source: serde_json::Error,
    },
}

type Position = Vec<f64>;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    geometry: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
struct OutCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<OutFeature<'a>>,
}

#[derive(Debug, Serialize)]
struct OutFeature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: Geometry,
    properties: OutProperties<'a>,
}

#[derive(Debug, Serialize)]
struct OutProperties<'a> {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

/// Parse a GeoJSON `FeatureCollection`.
///
/// # Errors
/// Returns [`GeoJsonError::Decode`] for malformed JSON and
/// [`GeoJsonError::NotFeatureCollection`] for other GeoJSON objects.
///
/// # Examples
/// ```
/// use fieldmark_data::geojson::parse_feature_collection;
///
/// let json = r#"{
///     "type": "FeatureCollection",
///     "features": [{
///         "type": "Feature",
///         "properties": { "type": "park", "name": "Volkspark" },
///         "geometry": { "type": "Polygon", "coordinates": [[[6.85, 52.23], [6.86, 52.23], [6.86, 52.24], [6.85, 52.23]]] }
///     }]
/// }"#;
/// let collection = parse_feature_collection(json)?;
/// assert_eq!(collection.len(), 1);
/// # Ok::<(), fieldmark_data::geojson::GeoJsonError>(())
/// ```
pub fn parse_feature_collection(json: &str) -> Result<FeatureCollection, GeoJsonError> {
    let raw: RawCollection =
        serde_json::from_str(json).map_err(|source| GeoJsonError::Decode { source })?;
    if raw.kind != "FeatureCollection" {
        return Err(GeoJsonError::NotFeatureCollection { found: raw.kind });
    }
    Ok(raw
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(index, feature)| convert_feature(index, feature))
        .collect())
}

/// Serialise a collection as a GeoJSON `FeatureCollection`.
///
/// # Errors
/// Returns [`GeoJsonError::Encode`] if serialisation fails.
pub fn feature_collection_to_string(collection: &FeatureCollection) -> Result<String, GeoJsonError> {
    let document = OutCollection {
        kind: "FeatureCollection",
        features: collection
            .features
            .iter()
            .map(|feature| OutFeature {
                kind: "Feature",
                geometry: to_geometry(&feature.geometry),
                properties: OutProperties {
                    kind: feature.properties.kind.as_deref(),
                    name: feature.properties.name.as_deref(),
                },
            })
            .collect(),
    };
    serde_json::to_string(&document).map_err(|source| GeoJsonError::Encode { source })
}

/// Read a `FeatureCollection` from a file.
///
/// # Errors
/// Returns [`GeoJsonError::Read`] when the file cannot be read, or a decode
/// error as for [`parse_feature_collection`].
pub fn read_feature_collection(path: &Utf8Path) -> Result<FeatureCollection, GeoJsonError> {
    let json = fieldmark_fs::read_utf8_to_string(path).map_err(|source| GeoJsonError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_feature_collection(&json)
}

/// Write a `FeatureCollection` to a file, creating parent directories.
///
/// # Errors
/// Returns [`GeoJsonError::Write`] when the file cannot be written.
pub fn write_feature_collection(
    path: &Utf8Path,
    collection: &FeatureCollection,
) -> Result<(), GeoJsonError> {
    let json = feature_collection_to_string(collection)?;
    fieldmark_fs::write_utf8_file(path, json).map_err(|source| GeoJsonError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn convert_feature(index: usize, raw: RawFeature) -> Option<Feature> {
    let Some(value) = raw.geometry else {
        debug!("skipping feature {index}: no geometry");
        return None;
    };
    let geometry = match serde_json::from_value::<Geometry>(value) {
        Ok(geometry) => geometry,
        Err(err) => {
            debug!("skipping feature {index}: unsupported geometry ({err})");
            return None;
        }
    };
    let Some(geometry) = from_geometry(geometry) else {
        debug!("skipping feature {index}: malformed positions");
        return None;
    };
    let properties = raw.properties.unwrap_or_default();
    Some(Feature::new(geometry).with_properties(FeatureProperties {
        kind: string_property(&properties, "type"),
        name: string_property(&properties, "name"),
    }))
}

fn string_property(properties: &Map<String, Value>, key: &str) -> Option<String> {
    properties
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn coord(position: &[f64]) -> Option<Coord<f64>> {
    match position {
        [x, y, ..] if x.is_finite() && y.is_finite() => Some(Coord { x: *x, y: *y }),
        _ => None,
    }
}

fn line(positions: &[Position]) -> Option<LineString<f64>> {
    positions
        .iter()
        .map(|position| coord(position))
        .collect::<Option<Vec<_>>>()
        .map(LineString::from)
}

fn polygon(rings: &[Vec<Position>]) -> Option<Polygon<f64>> {
    let (exterior, interiors) = rings.split_first()?;
    let interiors = interiors
        .iter()
        .map(|ring| line(ring))
        .collect::<Option<Vec<_>>>()?;
    Some(Polygon::new(line(exterior)?, interiors))
}

fn from_geometry(geometry: Geometry) -> Option<FeatureGeometry> {
    Some(match geometry {
        Geometry::Point(position) => FeatureGeometry::Point(Point::from(coord(&position)?)),
        Geometry::LineString(positions) => FeatureGeometry::LineString(line(&positions)?),
        Geometry::MultiLineString(lines) => FeatureGeometry::MultiLineString(MultiLineString::new(
            lines
                .iter()
                .map(|positions| line(positions))
                .collect::<Option<_>>()?,
        )),
        Geometry::Polygon(rings) => FeatureGeometry::Polygon(polygon(&rings)?),
        Geometry::MultiPolygon(polygons) => FeatureGeometry::MultiPolygon(MultiPolygon::new(
            polygons
                .iter()
                .map(|rings| polygon(rings))
                .collect::<Option<_>>()?,
        )),
    })
}

fn positions(line: &LineString<f64>) -> Vec<Position> {
    line.coords().map(|c| vec![c.x, c.y]).collect()
}

fn rings(polygon: &Polygon<f64>) -> Vec<Vec<Position>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(positions)
        .collect()
}

fn to_geometry(geometry: &FeatureGeometry) -> Geometry {
    match geometry {
        FeatureGeometry::Point(point) => Geometry::Point(vec![point.x(), point.y()]),
        FeatureGeometry::LineString(line) => Geometry::LineString(positions(line)),
        FeatureGeometry::MultiLineString(multi) => {
            Geometry::MultiLineString(multi.0.iter().map(positions).collect())
        }
        FeatureGeometry::Polygon(polygon) => Geometry::Polygon(rings(polygon)),
        FeatureGeometry::MultiPolygon(multi) => {
            Geometry::MultiPolygon(multi.0.iter().map(rings).collect())
        }
    }
}
