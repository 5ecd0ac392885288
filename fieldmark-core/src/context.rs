//! Spatial context of a point of interest.
//!
//! A [`ContextSnapshot`] records which land class a POI falls in and how far
//! it is from the nearest green area, water body, cycling route and road. The
//! snapshot is derived data: it is recomputed from the POI coordinate and the
//! loaded [`ContextLayers`] whenever a POI is opened or saved, and any cached
//! copy is only a convenience.
//!
//! Distances are geodesic (haversine) and measured to the nearest point of a
//! feature, so a POI beside the middle of a long road segment is measured to
//! the segment rather than to its end vertices. A POI inside a polygon is at
//! distance zero from it.

use geo::{
    Closest, ClosestPoint, Coord, Distance, Haversine, Intersects, LineString, MapCoords, Point,
    Polygon,
};
use serde::{Deserialize, Serialize};

use crate::{ContextLayers, GeometryKind, LayerKind, PointOfInterest};

/// Land classification of a POI location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LandType {
    /// Inside a polygon of the green layer.
    #[serde(rename = "green_area")]
    GreenArea,
    /// Inside a polygon of the water layer and no green polygon.
    #[serde(rename = "water")]
    Water,
    /// Outside every green and water polygon.
    #[default]
    #[serde(rename = "built/unknown")]
    BuiltUnknown,
}

impl LandType {
    /// Return the persisted identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GreenArea => "green_area",
            Self::Water => "water",
            Self::BuiltUnknown => "built/unknown",
        }
    }
}

impl std::fmt::Display for LandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived proximity and classification data for a POI.
///
/// Distances are whole meters; `None` means the layer had no measurable
/// feature. A `None` distance never counts as near.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    /// Land classification.
    pub land_type: LandType,
    /// Distance to the nearest green polygon.
    pub dist_green_m: Option<u32>,
    /// Distance to the nearest water polygon.
    pub dist_water_m: Option<u32>,
    /// Distance to the nearest cycling line.
    pub dist_cycle_m: Option<u32>,
    /// Distance to the nearest road line.
    pub dist_road_m: Option<u32>,
    /// Green area within 120 m.
    pub near_green: bool,
    /// Water within 120 m.
    pub near_water: bool,
    /// Cycling route within 80 m.
    pub near_cycle: bool,
    /// Road within 80 m.
    pub near_road: bool,
}

impl ContextSnapshot {
    /// Compute the snapshot for a WGS84 location (`x = longitude`).
    ///
    /// Non-finite coordinates produce the empty snapshot: unknown land type,
    /// no distances and no proximity flags.
    #[must_use]
    pub fn at(location: Coord<f64>, layers: &ContextLayers) -> Self {
        if !(location.x.is_finite() && location.y.is_finite()) {
            return Self::default();
        }
        let origin = Point::from(location);
        let dist_green_m = nearest_distance_m(origin, layers, LayerKind::Green);
        let dist_water_m = nearest_distance_m(origin, layers, LayerKind::Water);
        let dist_cycle_m = nearest_distance_m(origin, layers, LayerKind::Cycling);
        let dist_road_m = nearest_distance_m(origin, layers, LayerKind::Roads);
        Self {
            land_type: classify_land(origin, layers),
            dist_green_m,
            dist_water_m,
            dist_cycle_m,
            dist_road_m,
            near_green: is_near(dist_green_m, LayerKind::Green),
            near_water: is_near(dist_water_m, LayerKind::Water),
            near_cycle: is_near(dist_cycle_m, LayerKind::Cycling),
            near_road: is_near(dist_road_m, LayerKind::Roads),
        }
    }

    /// Distance recorded for `kind`.
    #[must_use]
    pub const fn distance_m(&self, kind: LayerKind) -> Option<u32> {
        match kind {
            LayerKind::Green => self.dist_green_m,
            LayerKind::Water => self.dist_water_m,
            LayerKind::Cycling => self.dist_cycle_m,
            LayerKind::Roads => self.dist_road_m,
        }
    }

    /// Proximity flag recorded for `kind`.
    #[must_use]
    pub const fn is_near(&self, kind: LayerKind) -> bool {
        match kind {
            LayerKind::Green => self.near_green,
            LayerKind::Water => self.near_water,
            LayerKind::Cycling => self.near_cycle,
            LayerKind::Roads => self.near_road,
        }
    }
}

/// Compute the spatial context of `poi` against the loaded layers.
///
/// Missing or empty layers are treated as "no data". The function is pure:
/// equal inputs always yield equal snapshots and nothing is cached.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use fieldmark_core::{compute_context_snapshot, ContextLayers, LandType, PointOfInterest};
///
/// let poi = PointOfInterest::new_at(52.23, 6.86, Utc::now());
/// let snapshot = compute_context_snapshot(&poi, &ContextLayers::default());
/// assert_eq!(snapshot.land_type, LandType::BuiltUnknown);
/// assert_eq!(snapshot.dist_road_m, None);
/// assert!(!snapshot.near_road);
/// ```
#[must_use]
pub fn compute_context_snapshot(poi: &PointOfInterest, layers: &ContextLayers) -> ContextSnapshot {
    ContextSnapshot::at(poi.location(), layers)
}

fn is_near(distance_m: Option<u32>, kind: LayerKind) -> bool {
    distance_m.is_some_and(|d| d <= kind.near_threshold_m())
}

/// Green is checked before water; the first containing polygon wins.
fn classify_land(origin: Point<f64>, layers: &ContextLayers) -> LandType {
    if layer_contains(layers, LayerKind::Green, origin) {
        LandType::GreenArea
    } else if layer_contains(layers, LayerKind::Water, origin) {
        LandType::Water
    } else {
        LandType::BuiltUnknown
    }
}

fn layer_contains(layers: &ContextLayers, kind: LayerKind, origin: Point<f64>) -> bool {
    layers
        .features(kind)
        .flat_map(|feature| feature.geometry.polygons())
        // `Intersects` treats boundary points as inside the polygon.
        .any(|polygon| polygon.intersects(&origin))
}

fn nearest_distance_m(origin: Point<f64>, layers: &ContextLayers, kind: LayerKind) -> Option<u32> {
    let frame = LocalFrame::new(origin);
    let nearest = layers
        .features(kind)
        .filter_map(|feature| match kind.measured_geometry() {
            GeometryKind::Polygon => feature
                .geometry
                .polygons()
                .filter_map(|polygon| frame.distance_to_polygon_m(polygon))
                .reduce(f64::min),
            GeometryKind::LineString => feature
                .geometry
                .line_strings()
                .filter_map(|line| frame.distance_to_line_m(line))
                .reduce(f64::min),
        })
        .filter(|d| d.is_finite())
        .reduce(f64::min)?;
    round_meters(nearest)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "input is finite and non-negative; surface distances fit in u32 meters"
)]
fn round_meters(meters: f64) -> Option<u32> {
    (meters.is_finite() && meters >= 0.0).then(|| meters.round() as u32)
}

/// Equirectangular frame centred on the POI.
///
/// Closest points are located in this frame, where longitude is scaled by
/// the cosine of the origin latitude, then measured geodesically. At
/// neighbourhood scale the projection error is far below one meter.
struct LocalFrame {
    origin: Point<f64>,
    lon_scale: f64,
}

impl LocalFrame {
    fn new(origin: Point<f64>) -> Self {
        Self {
            origin,
            lon_scale: origin.y().to_radians().cos().max(f64::EPSILON),
        }
    }

    #[expect(clippy::float_arithmetic, reason = "projection into the local frame")]
    fn project(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (coord.x - self.origin.x()) * self.lon_scale,
            y: coord.y - self.origin.y(),
        }
    }

    #[expect(clippy::float_arithmetic, reason = "projection out of the local frame")]
    fn unproject(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: coord.x / self.lon_scale + self.origin.x(),
            y: coord.y + self.origin.y(),
        }
    }

    fn distance_to_polygon_m(&self, polygon: &Polygon<f64>) -> Option<f64> {
        if polygon.intersects(&self.origin) {
            return Some(0.0);
        }
        std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .filter_map(|ring| self.distance_to_line_m(ring))
            .reduce(f64::min)
    }

    fn distance_to_line_m(&self, line: &LineString<f64>) -> Option<f64> {
        let projected = line.map_coords(|coord| self.project(coord));
        match projected.closest_point(&Point::new(0.0, 0.0)) {
            Closest::Intersection(point) | Closest::SinglePoint(point) => {
                let nearest = Point::from(self.unproject(point.0));
                Some(Haversine.distance(self.origin, nearest))
            }
            Closest::Indeterminate => match line.0.as_slice() {
                [only] => Some(Haversine.distance(self.origin, Point::from(*only))),
                _ => None,
            },
        }
    }
}
