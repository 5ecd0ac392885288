//! Command-line interface for the Fieldmark annotation tool.
//!
//! Every command works on a JSON POI store. Commands that compute context
//! read the four layers from the data directory (or from Overpass with
//! `--live`) and rank after-image suggestions from `image_bank.json`.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::Utc;
use clap::{Parser, Subcommand};
use fieldmark_core::{ContextLayers, ImageBank, JsonPoiStore, SolutionCatalog};
use fieldmark_data::{load_context_layers, load_image_bank};
use log::warn;

mod commands;
mod error;
mod render;
mod settings;

use commands::{AddArgs, Context, EditArgs};
pub use error::CliError;
use settings::{Settings, SettingsArgs};

pub(crate) const ARG_STORE: &str = "store";
pub(crate) const ARG_DATA_DIR: &str = "data-dir";
pub(crate) const ARG_LIVE: &str = "live";
pub(crate) const ARG_ENDPOINT: &str = "endpoint";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";

/// Run the Fieldmark CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments, configuration or the command fail.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_cli(cli, &mut stdout)
}

#[derive(Debug, Parser)]
#[command(
    name = "fieldmark",
    about = "Annotate urban field observations with spatial context",
    version
)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Drop a new point of interest and compute its context.
    Add(AddArgs),
    /// Refresh and print a point of interest with after-image suggestions.
    Show {
        /// Identifier of the POI.
        #[arg(value_name = "id")]
        id: String,
    },
    /// Edit the annotations of a point of interest.
    Edit(EditArgs),
    /// Delete a point of interest.
    Delete {
        /// Identifier of the POI.
        #[arg(value_name = "id")]
        id: String,
    },
    /// List stored points of interest.
    List,
    /// Export the store as pretty JSON.
    Export {
        /// Destination file; stdout when omitted.
        #[arg(value_name = "path")]
        path: Option<Utf8PathBuf>,
    },
    /// Delete every point of interest.
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Download the context layers from Overpass into the data directory.
    FetchLayers,
}

fn run_cli(cli: Cli, writer: &mut dyn Write) -> Result<(), CliError> {
    let settings = cli.settings.into_config()?;
    run_command(&settings, &cli.command, writer)
}

fn run_command(
    settings: &Settings,
    command: &Command,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let catalog = SolutionCatalog::builtin();
    match command {
        Command::Add(args) => {
            let layers = load_layers(settings)?;
            let mut store = open_store(settings);
            commands::add(&mut store, &layers, args, Utc::now(), writer).map(drop)
        }
        Command::Show { id } => {
            let layers = load_layers(settings)?;
            let bank = load_bank_or_empty(settings);
            let context = Context {
                layers: &layers,
                bank: &bank,
                catalog: &catalog,
            };
            commands::show(&mut open_store(settings), context, id, writer)
        }
        Command::Edit(args) => {
            let layers = load_layers(settings)?;
            let bank = if args.after_image.is_some() {
                load_image_bank(&settings.data_dir)?
            } else {
                load_bank_or_empty(settings)
            };
            let context = Context {
                layers: &layers,
                bank: &bank,
                catalog: &catalog,
            };
            commands::edit(&mut open_store(settings), context, args, writer).map(drop)
        }
        Command::Delete { id } => commands::delete(&mut open_store(settings), id, writer),
        Command::List => commands::list(&open_store(settings), writer),
        Command::Export { path } => {
            commands::export(&open_store(settings), path.as_deref(), writer)
        }
        Command::Clear { yes } => commands::clear(&mut open_store(settings), *yes, writer),
        Command::FetchLayers => {
            let client = settings.overpass_client()?;
            commands::fetch_layers(&client, &settings.data_dir, writer)
        }
    }
}

fn open_store(settings: &Settings) -> JsonPoiStore {
    JsonPoiStore::open(&settings.store)
}

fn load_layers(settings: &Settings) -> Result<ContextLayers, CliError> {
    let live = settings.live_source()?;
    Ok(load_context_layers(live.as_ref(), &settings.data_dir).layers)
}

fn load_bank_or_empty(settings: &Settings) -> ImageBank {
    load_image_bank(&settings.data_dir).unwrap_or_else(|err| {
        warn!("{err}; continuing without after-image suggestions");
        ImageBank::default()
    })
}

#[cfg(test)]
mod tests;
