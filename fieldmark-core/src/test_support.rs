//! Helpers for tests: an in-memory store and metric geometry builders.
//!
//! The geometry helpers offset WGS84 coordinates by meters using a spherical
//! earth, which is accurate well below a meter at neighbourhood scale.

use geo::{Coord, LineString, Polygon};

use crate::{ImageBankEntry, PoiStore, PoiStoreError, PointOfInterest};

const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// [`PoiStore`] kept entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pois: Vec<PointOfInterest>,
}

impl MemoryStore {
    /// Seed the store with `pois` in order.
    #[must_use]
    pub const fn with_pois(pois: Vec<PointOfInterest>) -> Self {
        Self { pois }
    }
}

impl PoiStore for MemoryStore {
    fn all(&self) -> Vec<PointOfInterest> {
        self.pois.clone()
    }

    fn replace_all(&mut self, pois: Vec<PointOfInterest>) -> Result<(), PoiStoreError> {
        self.pois = pois;
        Ok(())
    }
}

/// Move `origin` `meters` north (negative moves south).
#[must_use]
#[expect(clippy::float_arithmetic, reason = "metric offset on a sphere")]
pub fn offset_north(origin: Coord<f64>, meters: f64) -> Coord<f64> {
    Coord {
        x: origin.x,
        y: origin.y + (meters / EARTH_RADIUS_M).to_degrees(),
    }
}

/// Move `origin` `meters` east along its parallel (negative moves west).
#[must_use]
#[expect(clippy::float_arithmetic, reason = "metric offset on a sphere")]
pub fn offset_east(origin: Coord<f64>, meters: f64) -> Coord<f64> {
    let parallel_radius = EARTH_RADIUS_M * origin.y.to_radians().cos();
    Coord {
        x: origin.x + (meters / parallel_radius).to_degrees(),
        y: origin.y,
    }
}

/// Axis-aligned square centred on `centre` with the given half side.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "negating offsets")]
pub fn square_around(centre: Coord<f64>, half_size_m: f64) -> Polygon<f64> {
    let corner = |east: f64, north: f64| offset_north(offset_east(centre, east), north);
    Polygon::new(
        LineString::from(vec![
            corner(-half_size_m, -half_size_m),
            corner(half_size_m, -half_size_m),
            corner(half_size_m, half_size_m),
            corner(-half_size_m, half_size_m),
            corner(-half_size_m, -half_size_m),
        ]),
        Vec::new(),
    )
}

/// Square of side `size_m` whose west edge lies `gap_m` east of `origin`.
///
/// The square is centred on the origin's latitude, so the nearest boundary
/// point is due east at exactly `gap_m`.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "edge offsets")]
pub fn square_east_of(origin: Coord<f64>, gap_m: f64, size_m: f64) -> Polygon<f64> {
    let half = size_m / 2.0;
    let west = gap_m;
    let east = gap_m + size_m;
    let corner = |e: f64, n: f64| offset_north(offset_east(origin, e), n);
    Polygon::new(
        LineString::from(vec![
            corner(west, -half),
            corner(east, -half),
            corner(east, half),
            corner(west, half),
            corner(west, -half),
        ]),
        Vec::new(),
    )
}

/// North-south line 1 km long, `gap_m` east of `origin`.
#[must_use]
pub fn line_east_of(origin: Coord<f64>, gap_m: f64) -> LineString<f64> {
    let base = offset_east(origin, gap_m);
    LineString::from(vec![offset_north(base, -500.0), offset_north(base, 500.0)])
}

/// Image bank entry with a derived URL and title.
#[must_use]
pub fn image(id: &str, tags: &[&str]) -> ImageBankEntry {
    ImageBankEntry {
        id: id.to_owned(),
        url: format!("img/{id}.jpg"),
        title: id.to_owned(),
        tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
    }
}
