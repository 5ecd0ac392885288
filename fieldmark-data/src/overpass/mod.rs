//! Live context layers from the OpenStreetMap Overpass API.
//!
//! [`layer_query`] builds the per-layer Overpass QL query, [`OverpassClient`]
//! sends it with endpoint fallback and [`osm_to_features`] turns the raw
//! response into context features.

mod client;
mod osm;
mod query;

pub use client::{
    DEFAULT_ENDPOINTS, DEFAULT_USER_AGENT, OverpassBuildError, OverpassClient, OverpassConfig,
    OverpassError,
};
pub use osm::{OsmElement, OsmMember, OsmResponse, osm_to_features};
pub use query::{BoundingBox, layer_query};
