//! Test doubles for layer loading.
//!
//! [`StubLayerSource`] answers from pre-configured collections without any
//! network access. Layers that were not configured fail with a network error,
//! which exercises the bundled fallback.

use std::collections::HashMap;

use fieldmark_core::{FeatureCollection, LayerKind};

use crate::layers::LayerSource;
use crate::overpass::OverpassError;

/// Stub [`LayerSource`] for tests.
///
/// # Examples
/// ```
/// use fieldmark_core::{FeatureCollection, LayerKind};
/// use fieldmark_data::layers::LayerSource;
/// use fieldmark_data::test_support::StubLayerSource;
///
/// let source = StubLayerSource::default().with_layer(LayerKind::Green, FeatureCollection::default());
/// assert!(source.fetch_layer(LayerKind::Green).is_ok());
/// assert!(source.fetch_layer(LayerKind::Roads).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StubLayerSource {
    layers: HashMap<LayerKind, FeatureCollection>,
}

impl StubLayerSource {
    /// Answer requests for `kind` with `collection`.
    #[must_use]
    pub fn with_layer(mut self, kind: LayerKind, collection: FeatureCollection) -> Self {
        self.layers.insert(kind, collection);
        self
    }
}

impl LayerSource for StubLayerSource {
    type Error = OverpassError;

    fn fetch_layer(&self, kind: LayerKind) -> Result<FeatureCollection, Self::Error> {
        self.layers
            .get(&kind)
            .cloned()
            .ok_or_else(|| OverpassError::Network {
                url: format!("stub://{kind}"),
                message: "layer not configured".to_owned(),
            })
    }
}
