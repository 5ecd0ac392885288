//! Data access for the Fieldmark annotation tool.
//!
//! Responsibilities:
//! - Read and write GeoJSON context layers.
//! - Fetch live layers from the Overpass API and convert OSM elements into
//!   features.
//! - Load layers with a bundled-file fallback, load the image bank and embed
//!   image files as `data:` URLs.
//!
//! Boundaries:
//! - Domain rules live in `fieldmark-core`; nothing here computes context or
//!   rankings.
//! - Network calls are blocking at the API surface and bridged onto Tokio
//!   internally.

pub mod embed;
pub mod geojson;
pub mod image_bank;
pub mod layers;
pub mod overpass;

#[doc(hidden)]
pub mod test_support;

pub use embed::{EmbedError, embed_file};
pub use geojson::{GeoJsonError, read_feature_collection, write_feature_collection};
pub use image_bank::{ImageBankError, load_image_bank};
pub use layers::{LayerLoadError, LayerOrigin, LayerSource, LoadedLayers, load_context_layers};
pub use overpass::{OverpassClient, OverpassConfig, OverpassError};
