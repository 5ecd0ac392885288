//! Test helpers for building a temporary workspace with bundled data.

use super::*;
use camino::Utf8Path;
use fieldmark_core::test_support::{image, line_east_of, square_around};
use fieldmark_core::{FeatureCollection, LayerKind};
use fieldmark_data::layers::bundled_layer_path;
use fieldmark_data::write_feature_collection;
use geo::Coord;
use tempfile::TempDir;

/// Centre of the bundled park; roads run 50 m east of it.
pub(super) const PARK_CENTRE: Coord<f64> = Coord { x: 6.86, y: 52.23 };

/// Context layers with a 200 m park around [`PARK_CENTRE`] and a road 50 m
/// east of it.
pub(super) fn park_layers() -> ContextLayers {
    ContextLayers::default()
        .with_layer(
            LayerKind::Green,
            FeatureCollection::new(vec![square_around(PARK_CENTRE, 100.0).into()]),
        )
        .with_layer(
            LayerKind::Roads,
            FeatureCollection::new(vec![line_east_of(PARK_CENTRE, 50.0).into()]),
        )
}

/// Bank where `c` matches shade trees best, `a` second and `b` not at all.
pub(super) fn shade_bank() -> ImageBank {
    ImageBank::new(vec![
        image("a", &["no_shade"]),
        image("b", &["no_seating"]),
        image("c", &["no_shade", "comfort"]),
    ])
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fieldmark_fs::write_utf8_file(path, contents).expect("write file");
}

/// Temporary store file and data directory.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    /// Workspace whose data directory holds the park layers and shade bank.
    pub(super) fn with_bundled_data() -> Self {
        let workspace = Self::new();
        let layers = park_layers();
        for kind in [LayerKind::Green, LayerKind::Roads] {
            let collection = layers.layer(kind).expect("layer configured");
            write_feature_collection(&bundled_layer_path(&workspace.data_dir(), kind), collection)
                .expect("write bundled layer");
        }
        let bank = serde_json::to_string(&shade_bank()).expect("encode image bank");
        write_utf8(&workspace.data_dir().join("image_bank.json"), bank.as_bytes());
        workspace
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn store_path(&self) -> Utf8PathBuf {
        self.root.join("pois.json")
    }

    pub(super) fn data_dir(&self) -> Utf8PathBuf {
        self.root.join("data")
    }

    /// Full argument vector for `command` pointed at this workspace.
    pub(super) fn argv(&self, command: &[&str]) -> Vec<String> {
        let mut argv = vec![
            "fieldmark".to_owned(),
            format!("--{ARG_STORE}"),
            self.store_path().into_string(),
            format!("--{ARG_DATA_DIR}"),
            self.data_dir().into_string(),
        ];
        argv.extend(command.iter().map(|arg| (*arg).to_owned()));
        argv
    }

    /// Parse and run `command`, returning the outcome and captured stdout.
    pub(super) fn run(&self, command: &[&str]) -> (Result<(), CliError>, String) {
        let mut stdout = Vec::new();
        let outcome = Cli::try_parse_from(self.argv(command))
            .map_err(CliError::ArgumentParsing)
            .and_then(|cli| run_cli(cli, &mut stdout));
        let text = String::from_utf8(stdout).expect("utf-8 output");
        (outcome, text)
    }

    pub(super) fn stored_pois(&self) -> Vec<fieldmark_core::PointOfInterest> {
        use fieldmark_core::PoiStore;
        JsonPoiStore::open(self.store_path()).all()
    }
}
