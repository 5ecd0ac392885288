//! Error types emitted by the Fieldmark CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use fieldmark_core::{LayerKind, PoiStoreError};
use fieldmark_data::overpass::OverpassBuildError;
use fieldmark_data::{EmbedError, GeoJsonError, ImageBankError};
use thiserror::Error;

/// Errors emitted by the Fieldmark CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A configured Overpass endpoint is not a valid URL.
    #[error("invalid Overpass endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        /// The endpoint string that failed to parse.
        endpoint: String,
        /// The underlying URL parse error.
        #[source]
        source: url::ParseError,
    },
    /// The Overpass timeout was set to zero.
    #[error("--{field} must be greater than zero")]
    ZeroTimeout {
        /// The name of the offending option.
        field: &'static str,
    },
    /// Constructing the Overpass client failed.
    #[error(transparent)]
    BuildOverpassClient(#[from] OverpassBuildError),
    /// Downloading a layer failed.
    #[error("failed to fetch the {layer} layer: {source}")]
    FetchLayer {
        /// The layer being fetched.
        layer: LayerKind,
        /// The underlying fetch error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Writing a downloaded layer failed.
    #[error("failed to save the {layer} layer: {source}")]
    WriteLayer {
        /// The layer being written.
        layer: LayerKind,
        /// The underlying write error.
        #[source]
        source: GeoJsonError,
    },
    /// The image bank is required but could not be loaded.
    #[error(transparent)]
    LoadImageBank(#[from] ImageBankError),
    /// No POI has the requested id.
    #[error("no point of interest with id {id:?}")]
    UnknownPoi {
        /// The requested POI id.
        id: String,
    },
    /// No image bank entry has the requested id.
    #[error("no image bank entry with id {id:?}")]
    UnknownImage {
        /// The requested image id.
        id: String,
    },
    /// `clear` was invoked without confirmation.
    #[error("refusing to clear all points of interest without --yes")]
    ClearNotConfirmed,
    /// The POI store rejected an operation.
    #[error(transparent)]
    Store(#[from] PoiStoreError),
    /// Reading a before image file failed.
    #[error(transparent)]
    EmbedBefore(#[from] EmbedError),
    /// Serialising the store for export failed.
    #[error("failed to serialise points of interest: {0}")]
    SerialiseExport(#[source] serde_json::Error),
    /// Writing the export file failed.
    #[error("failed to write export to {path:?}: {source}")]
    WriteExport {
        /// The export destination path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
