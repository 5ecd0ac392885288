//! Overpass QL queries for the four context layers.

use fieldmark_core::LayerKind;
use serde::{Deserialize, Serialize};

/// Study area in WGS84 degrees.
///
/// The default covers Twekkelerveld in Enschede.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern latitude.
    pub south: f64,
    /// Western longitude.
    pub west: f64,
    /// Northern latitude.
    pub north: f64,
    /// Eastern longitude.
    pub east: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            south: 52.2186,
            west: 6.8420,
            north: 52.2426,
            east: 6.8780,
        }
    }
}

impl BoundingBox {
    /// Format as the `south,west,north,east` filter Overpass expects.
    #[must_use]
    pub fn to_overpass(&self) -> String {
        format!("{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

/// Build the Overpass QL query fetching `kind` inside `bbox`.
///
/// Each query requests JSON output with the matching ways (and relations for
/// areal layers) followed by the nodes and member ways needed to resolve
/// their geometry.
///
/// # Examples
/// ```
/// use fieldmark_core::LayerKind;
/// use fieldmark_data::overpass::{BoundingBox, layer_query};
///
/// let query = layer_query(LayerKind::Cycling, &BoundingBox::default());
/// assert!(query.starts_with("[out:json][timeout:25];"));
/// assert!(query.contains(r#"way["highway"="cycleway"](52.2186,6.842,52.2426,6.878);"#));
/// ```
#[must_use]
pub fn layer_query(kind: LayerKind, bbox: &BoundingBox) -> String {
    let b = bbox.to_overpass();
    let body = match kind {
        LayerKind::Green => format!(
            concat!(
                r#"way["leisure"="park"]({b}); relation["leisure"="park"]({b});"#,
                r#"way["landuse"~"grass|meadow|recreation_ground|village_green"]({b}); "#,
                r#"relation["landuse"~"grass|meadow|recreation_ground|village_green"]({b});"#,
                r#"way["natural"~"wood|scrub"]({b}); relation["natural"~"wood|scrub"]({b});"#,
            ),
            b = b
        ),
        LayerKind::Water => format!(
            concat!(
                r#"way["natural"="water"]({b}); relation["natural"="water"]({b});"#,
                r#"way["waterway"="riverbank"]({b}); relation["waterway"="riverbank"]({b});"#,
                r#"way["amenity"="fountain"]({b});"#,
            ),
            b = b
        ),
        LayerKind::Cycling => format!(
            concat!(
                r#"way["highway"="cycleway"]({b});"#,
                r#"way["cycleway"]({b});"#,
                r#"way["highway"="path"]["bicycle"!="no"]({b});"#,
            ),
            b = b
        ),
        LayerKind::Roads => format!(
            concat!(
                r#"way["highway"~"motorway|trunk|primary|secondary|tertiary|residential|"#,
                r#"living_street|unclassified|service"]({b});"#,
            ),
            b = b
        ),
    };
    format!("[out:json][timeout:25];({body});out body;>;out skel qt;")
}
