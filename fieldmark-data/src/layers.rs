//! Loading the four context layers with a bundled fallback.
//!
//! Each layer is first requested from a live [`LayerSource`]. When that fails,
//! or no source is configured, `<bundled_dir>/<layer>.geojson` is read
//! instead. A layer neither source can provide is left absent; the load as a
//! whole never fails.

use camino::{Utf8Path, Utf8PathBuf};
use fieldmark_core::{ContextLayers, FeatureCollection, LayerKind};
use log::{info, warn};
use thiserror::Error;

use crate::geojson::{GeoJsonError, read_feature_collection};
use crate::overpass::{OverpassClient, OverpassError};

/// Supplier of live layer data.
pub trait LayerSource {
    /// Error raised when a layer cannot be fetched.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the features of `kind`.
    ///
    /// # Errors
    /// Returns the source-specific failure.
    fn fetch_layer(&self, kind: LayerKind) -> Result<FeatureCollection, Self::Error>;
}

impl LayerSource for OverpassClient {
    type Error = OverpassError;

    fn fetch_layer(&self, kind: LayerKind) -> Result<FeatureCollection, Self::Error> {
        Self::fetch_layer(self, kind)
    }
}

/// Errors recorded while loading a single layer.
#[derive(Debug, Error)]
pub enum LayerLoadError {
    /// The live source failed.
    #[error("live {layer} layer unavailable: {source}")]
    Live {
        /// Layer being loaded.
        layer: LayerKind,
        /// Source failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The bundled file could not be loaded.
    #[error("bundled {layer} layer unavailable: {source}")]
    Bundled {
        /// Layer being loaded.
        layer: LayerKind,
        /// Read or decode failure.
        #[source]
        source: GeoJsonError,
    },
}

/// Where a loaded layer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerOrigin {
    /// Fetched from the live source.
    Live,
    /// Read from the bundled GeoJSON file.
    Bundled,
    /// Not available from either source.
    Absent,
}

/// Outcome of [`load_context_layers`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadedLayers {
    /// The layers, ready for the context engine.
    pub layers: ContextLayers,
    origins: Vec<(LayerKind, LayerOrigin)>,
}

impl LoadedLayers {
    /// Origin of `kind`.
    #[must_use]
    pub fn origin(&self, kind: LayerKind) -> LayerOrigin {
        self.origins
            .iter()
            .find_map(|(loaded, origin)| (*loaded == kind).then_some(*origin))
            .unwrap_or(LayerOrigin::Absent)
    }
}

/// Path of the bundled file for `kind` inside `dir`.
#[must_use]
pub fn bundled_layer_path(dir: &Utf8Path, kind: LayerKind) -> Utf8PathBuf {
    dir.join(format!("{}.geojson", kind.as_str()))
}

/// Load every layer, preferring `source` and falling back to `bundled_dir`.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use fieldmark_data::layers::load_context_layers;
/// use fieldmark_data::overpass::OverpassClient;
///
/// let loaded = load_context_layers(None::<&OverpassClient>, Utf8Path::new("data"));
/// let _layers = loaded.layers;
/// ```
pub fn load_context_layers<S: LayerSource>(
    source: Option<&S>,
    bundled_dir: &Utf8Path,
) -> LoadedLayers {
    let mut loaded = LoadedLayers::default();
    for kind in LayerKind::ALL {
        let (collection, origin) = load_layer(source, bundled_dir, kind);
        loaded.layers.set_layer(kind, collection);
        loaded.origins.push((kind, origin));
    }
    loaded
}

fn load_layer<S: LayerSource>(
    source: Option<&S>,
    bundled_dir: &Utf8Path,
    kind: LayerKind,
) -> (Option<FeatureCollection>, LayerOrigin) {
    if let Some(source) = source {
        match source.fetch_layer(kind) {
            Ok(collection) => return (Some(collection), LayerOrigin::Live),
            Err(err) => warn!(
                "{}",
                LayerLoadError::Live {
                    layer: kind,
                    source: Box::new(err),
                }
            ),
        }
    }
    match read_feature_collection(&bundled_layer_path(bundled_dir, kind)) {
        Ok(collection) => {
            info!("loaded {} bundled {kind} features", collection.len());
            (Some(collection), LayerOrigin::Bundled)
        }
        Err(source) => {
            warn!(
                "{}",
                LayerLoadError::Bundled {
                    layer: kind,
                    source,
                }
            );
            (None, LayerOrigin::Absent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::write_feature_collection;
    use crate::test_support::StubLayerSource;
    use fieldmark_core::test_support::line_east_of;
    use geo::Coord;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn bundled_dir() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 path");
        (dir, root)
    }

    fn roads() -> FeatureCollection {
        FeatureCollection::new(vec![line_east_of(Coord { x: 6.86, y: 52.23 }, 40.0).into()])
    }

    #[rstest]
    fn live_layers_win(#[from(bundled_dir)] (_dir, root): (TempDir, Utf8PathBuf)) {
        let source = StubLayerSource::default().with_layer(LayerKind::Roads, roads());
        let loaded = load_context_layers(Some(&source), &root);
        assert_eq!(loaded.origin(LayerKind::Roads), LayerOrigin::Live);
        assert_eq!(loaded.layers.layer(LayerKind::Roads), Some(&roads()));
        assert_eq!(loaded.origin(LayerKind::Green), LayerOrigin::Absent);
        assert!(loaded.layers.layer(LayerKind::Green).is_none());
    }

    #[rstest]
    fn failed_live_layers_fall_back_to_bundled_files(
        #[from(bundled_dir)] (_dir, root): (TempDir, Utf8PathBuf),
    ) {
        write_feature_collection(&bundled_layer_path(&root, LayerKind::Roads), &roads())
            .expect("write bundled roads");
        let source = StubLayerSource::default();
        let loaded = load_context_layers(Some(&source), &root);
        assert_eq!(loaded.origin(LayerKind::Roads), LayerOrigin::Bundled);
        assert_eq!(loaded.layers.layer(LayerKind::Roads), Some(&roads()));
    }

    #[rstest]
    fn no_source_reads_bundled_files_only(
        #[from(bundled_dir)] (_dir, root): (TempDir, Utf8PathBuf),
    ) {
        fieldmark_fs::write_utf8_file(&bundled_layer_path(&root, LayerKind::Water), "not json")
            .expect("write corrupt file");
        let loaded = load_context_layers(None::<&StubLayerSource>, &root);
        for kind in LayerKind::ALL {
            assert_eq!(loaded.origin(kind), LayerOrigin::Absent, "{kind}");
        }
        assert_eq!(loaded.layers, ContextLayers::default());
    }

    #[rstest]
    fn bundled_paths_use_layer_names() {
        assert_eq!(
            bundled_layer_path(Utf8Path::new("data"), LayerKind::Cycling),
            Utf8PathBuf::from("data/cycling.geojson")
        );
    }
}
