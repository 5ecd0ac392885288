//! Workspace settings shared by every subcommand.

use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use fieldmark_data::overpass::{OverpassClient, OverpassConfig};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_DATA_DIR, ARG_ENDPOINT, ARG_LIVE, ARG_STORE, ARG_TIMEOUT_SECS, CliError};

/// Store file used when none is configured.
pub(crate) const DEFAULT_STORE: &str = "fieldmark.json";
/// Data directory used when none is configured.
pub(crate) const DEFAULT_DATA_DIR: &str = "data";

/// Settings layered from CLI flags, `FIELDMARK_*` environment variables and
/// configuration files.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "workspace")]
#[ortho_config(prefix = "FIELDMARK")]
pub(crate) struct SettingsArgs {
    /// Path to the JSON POI store.
    #[arg(long = ARG_STORE, value_name = "path", global = true)]
    #[serde(default)]
    pub(crate) store: Option<Utf8PathBuf>,
    /// Directory holding the bundled layers and `image_bank.json`.
    #[arg(long = ARG_DATA_DIR, value_name = "dir", global = true)]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
    /// Query Overpass for context layers first; by default only the bundled
    /// layers in the data directory are read.
    #[arg(long = ARG_LIVE, global = true)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) live: bool,
    /// Overpass interpreter URL; repeat to set a fallback order.
    #[arg(long = ARG_ENDPOINT, value_name = "url", global = true)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) endpoints: Vec<String>,
    /// Per-request Overpass timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds", global = true)]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl SettingsArgs {
    pub(crate) fn into_config(self) -> Result<Settings, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Settings::try_from(merged)
    }
}

/// Resolved workspace settings.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Settings {
    /// Path to the JSON POI store.
    pub(crate) store: Utf8PathBuf,
    /// Directory holding bundled layers and the image bank.
    pub(crate) data_dir: Utf8PathBuf,
    /// Whether context layers are fetched live first.
    pub(crate) live: bool,
    /// Overpass client configuration.
    pub(crate) overpass: OverpassConfig,
}

impl Settings {
    /// Build an Overpass client when live layers are requested.
    pub(crate) fn live_source(&self) -> Result<Option<OverpassClient>, CliError> {
        if self.live {
            Ok(Some(self.overpass_client()?))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn overpass_client(&self) -> Result<OverpassClient, CliError> {
        OverpassClient::new(self.overpass.clone()).map_err(CliError::from)
    }
}

impl TryFrom<SettingsArgs> for Settings {
    type Error = CliError;

    fn try_from(args: SettingsArgs) -> Result<Self, Self::Error> {
        for endpoint in &args.endpoints {
            url::Url::parse(endpoint).map_err(|source| CliError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                source,
            })?;
        }

        let mut overpass = OverpassConfig::default();
        if !args.endpoints.is_empty() {
            overpass = overpass.with_endpoints(args.endpoints);
        }
        match args.timeout_secs {
            Some(0) => {
                return Err(CliError::ZeroTimeout {
                    field: ARG_TIMEOUT_SECS,
                });
            }
            Some(secs) => overpass = overpass.with_timeout(Duration::from_secs(secs)),
            None => {}
        }

        Ok(Self {
            store: args
                .store
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_STORE)),
            data_dir: args
                .data_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATA_DIR)),
            live: args.live,
            overpass,
        })
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<Settings, CliError> {
    let merged = SettingsArgs::merge_from_layers(layers).map_err(CliError::from)?;
    Settings::try_from(merged)
}
