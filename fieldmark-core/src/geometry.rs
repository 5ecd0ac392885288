//! Thematic geometry layers consulted by the context engine.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`, the same
//! axis order GeoJSON uses.

use geo::{LineString, MultiLineString, MultiPolygon, Point, Polygon};

/// The four thematic layers a snapshot is computed against.
///
/// # Examples
/// ```
/// use fieldmark_core::LayerKind;
///
/// assert_eq!(LayerKind::Cycling.as_str(), "cycling");
/// assert_eq!(LayerKind::Green.near_threshold_m(), 120);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Parks, meadows, woods and other green areas.
    Green,
    /// Water bodies.
    Water,
    /// Cycleways and bicycle-permitted paths.
    Cycling,
    /// Motorised road network.
    Roads,
}

/// Geometry family measured for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    /// Areal features: polygons and multi-polygons.
    Polygon,
    /// Linear features: line-strings and multi-line-strings.
    LineString,
}

impl LayerKind {
    /// Every layer in loading order.
    pub const ALL: [Self; 4] = [Self::Green, Self::Water, Self::Cycling, Self::Roads];

    /// Return the layer name used for files and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Water => "water",
            Self::Cycling => "cycling",
            Self::Roads => "roads",
        }
    }

    /// Distance, in meters, at or below which a POI counts as near the layer.
    #[must_use]
    pub const fn near_threshold_m(self) -> u32 {
        match self {
            Self::Green | Self::Water => 120,
            Self::Cycling | Self::Roads => 80,
        }
    }

    /// Geometry family whose features are measured for this layer.
    #[must_use]
    pub const fn measured_geometry(self) -> GeometryKind {
        match self {
            Self::Green | Self::Water => GeometryKind::Polygon,
            Self::Cycling | Self::Roads => GeometryKind::LineString,
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry carried by a feature.
///
/// Points are kept so collections round-trip, but the context engine never
/// measures them.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    /// A single position.
    Point(Point<f64>),
    /// A path.
    LineString(LineString<f64>),
    /// Several paths.
    MultiLineString(MultiLineString<f64>),
    /// An area with optional holes.
    Polygon(Polygon<f64>),
    /// Several areas.
    MultiPolygon(MultiPolygon<f64>),
}

impl FeatureGeometry {
    /// Return the geometry family, or `None` for points.
    #[must_use]
    pub const fn kind(&self) -> Option<GeometryKind> {
        match self {
            Self::Point(_) => None,
            Self::LineString(_) | Self::MultiLineString(_) => Some(GeometryKind::LineString),
            Self::Polygon(_) | Self::MultiPolygon(_) => Some(GeometryKind::Polygon),
        }
    }

    /// Iterate over the polygons of an areal geometry.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon<f64>> {
        let parts: &[Polygon<f64>] = match self {
            Self::Polygon(polygon) => std::slice::from_ref(polygon),
            Self::MultiPolygon(multi) => &multi.0,
            _ => &[],
        };
        parts.iter()
    }

    /// Iterate over the line-strings of a linear geometry.
    pub fn line_strings(&self) -> impl Iterator<Item = &LineString<f64>> {
        let parts: &[LineString<f64>] = match self {
            Self::LineString(line) => std::slice::from_ref(line),
            Self::MultiLineString(multi) => &multi.0,
            _ => &[],
        };
        parts.iter()
    }
}

/// Descriptive properties of a feature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureProperties {
    /// Feature type, e.g. `park` or `cycleway`.
    pub kind: Option<String>,
    /// Feature name.
    pub name: Option<String>,
}

/// A geometry plus its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// The feature geometry.
    pub geometry: FeatureGeometry,
    /// Optional descriptive properties.
    pub properties: FeatureProperties,
}

impl Feature {
    /// Construct a feature without properties.
    #[must_use]
    pub fn new(geometry: FeatureGeometry) -> Self {
        Self {
            geometry,
            properties: FeatureProperties::default(),
        }
    }

    /// Attach properties while returning `self` for chaining.
    #[must_use]
    pub fn with_properties(mut self, properties: FeatureProperties) -> Self {
        self.properties = properties;
        self
    }
}

impl From<Polygon<f64>> for Feature {
    fn from(polygon: Polygon<f64>) -> Self {
        Self::new(FeatureGeometry::Polygon(polygon))
    }
}

impl From<LineString<f64>> for Feature {
    fn from(line: LineString<f64>) -> Self {
        Self::new(FeatureGeometry::LineString(line))
    }
}

/// Ordered collection of features of one layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    /// Features in source order.
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Build a collection from features.
    #[must_use]
    pub const fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Return `true` when the collection holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// The four layers loaded for a session. Any of them may be absent.
///
/// # Examples
/// ```
/// use fieldmark_core::{ContextLayers, FeatureCollection, LayerKind};
///
/// let layers = ContextLayers::default().with_layer(LayerKind::Roads, FeatureCollection::default());
/// assert!(layers.layer(LayerKind::Roads).is_some());
/// assert!(layers.layer(LayerKind::Green).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextLayers {
    green: Option<FeatureCollection>,
    water: Option<FeatureCollection>,
    cycling: Option<FeatureCollection>,
    roads: Option<FeatureCollection>,
}

impl ContextLayers {
    /// Return the collection loaded for `kind`, if any.
    #[must_use]
    pub const fn layer(&self, kind: LayerKind) -> Option<&FeatureCollection> {
        match kind {
            LayerKind::Green => self.green.as_ref(),
            LayerKind::Water => self.water.as_ref(),
            LayerKind::Cycling => self.cycling.as_ref(),
            LayerKind::Roads => self.roads.as_ref(),
        }
    }

    /// Store or clear the collection for `kind`.
    pub fn set_layer(&mut self, kind: LayerKind, collection: Option<FeatureCollection>) {
        let slot = match kind {
            LayerKind::Green => &mut self.green,
            LayerKind::Water => &mut self.water,
            LayerKind::Cycling => &mut self.cycling,
            LayerKind::Roads => &mut self.roads,
        };
        *slot = collection;
    }

    /// Store a collection while returning `self` for chaining.
    #[must_use]
    pub fn with_layer(mut self, kind: LayerKind, collection: FeatureCollection) -> Self {
        self.set_layer(kind, Some(collection));
        self
    }

    /// Iterate over the features of `kind`, empty when the layer is absent.
    pub fn features(&self, kind: LayerKind) -> impl Iterator<Item = &Feature> {
        self.layer(kind)
            .map(|collection| collection.features.as_slice())
            .unwrap_or_default()
            .iter()
    }
}
