//! POI lifecycle commands.
//!
//! Each command receives its collaborators explicitly so tests can drive it
//! with an in-memory store and hand-built layers. Output goes to the supplied
//! writer.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use clap::Args;
use fieldmark_core::{
    Category, ContextLayers, ImageBank, IssueTag, JsonPoiStore, LayerKind, PoiEdit, PoiStore,
    PointOfInterest, SolutionCatalog, SolutionId, Urgency, rank_images,
};
use fieldmark_data::LayerSource;
use fieldmark_data::layers::bundled_layer_path;
use fieldmark_data::{embed_file, write_feature_collection};
use log::info;

use crate::CliError;
use crate::render::{write_context, write_poi, write_suggestions, write_summary};

/// Arguments of the `add` command.
#[derive(Debug, Clone, Args)]
pub(crate) struct AddArgs {
    /// Latitude in WGS84 degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) lat: f64,
    /// Longitude in WGS84 degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) lng: f64,
}

/// Arguments of the `edit` command.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct EditArgs {
    /// Identifier of the POI to edit.
    #[arg(value_name = "id")]
    pub(crate) id: String,
    /// New title.
    #[arg(long)]
    pub(crate) title: Option<String>,
    /// New category, e.g. `green_comfort`.
    #[arg(long)]
    pub(crate) category: Option<Category>,
    /// New urgency: `low`, `medium` or `high`.
    #[arg(long)]
    pub(crate) urgency: Option<Urgency>,
    /// New comment.
    #[arg(long)]
    pub(crate) comment: Option<String>,
    /// Remote before image; an empty value clears a previous URL.
    #[arg(long = "before-url", value_name = "url", conflicts_with = "before_file")]
    pub(crate) before_url: Option<String>,
    /// Local before image, embedded as a `data:` URL.
    #[arg(long = "before-file", value_name = "path")]
    pub(crate) before_file: Option<Utf8PathBuf>,
    /// Proposed solution, e.g. `add_shade_trees`.
    #[arg(long, conflicts_with = "clear_solution")]
    pub(crate) solution: Option<SolutionId>,
    /// Remove the proposed solution.
    #[arg(long = "clear-solution")]
    pub(crate) clear_solution: bool,
    /// New solution note.
    #[arg(long = "solution-note", value_name = "text")]
    pub(crate) solution_note: Option<String>,
    /// Image bank entry illustrating the solution.
    #[arg(long = "after-image", value_name = "id")]
    pub(crate) after_image: Option<String>,
    /// Issue tag to switch on or off; repeatable.
    #[arg(long = "toggle-tag", value_name = "tag")]
    pub(crate) toggle_tags: Vec<IssueTag>,
}

impl EditArgs {
    fn form_edit(&self) -> PoiEdit {
        let solution = if self.clear_solution {
            Some(None)
        } else {
            self.solution.map(Some)
        };
        PoiEdit {
            title: self.title.clone(),
            category: self.category,
            urgency: self.urgency,
            comment: self.comment.clone(),
            before_url: self.before_url.clone(),
            solution,
            solution_note: self.solution_note.clone(),
        }
    }
}

/// Read-only inputs for computing context and suggestions.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Context<'a> {
    pub(crate) layers: &'a ContextLayers,
    pub(crate) bank: &'a ImageBank,
    pub(crate) catalog: &'a SolutionCatalog,
}

fn write_report(
    writer: &mut dyn Write,
    poi: &PointOfInterest,
    context: Context<'_>,
) -> Result<(), CliError> {
    write_poi(writer, poi, context.bank).map_err(CliError::WriteOutput)?;
    let suggestions = rank_images(poi, context.catalog, context.bank);
    write_suggestions(writer, &suggestions, poi.after_image_id.as_deref())
        .map_err(CliError::WriteOutput)
}

fn find_poi(store: &dyn PoiStore, id: &str) -> Result<PointOfInterest, CliError> {
    store.get(id).ok_or_else(|| CliError::UnknownPoi { id: id.to_owned() })
}

/// Create a POI, compute its context and persist it.
pub(crate) fn add(
    store: &mut dyn PoiStore,
    layers: &ContextLayers,
    args: &AddArgs,
    now: DateTime<Utc>,
    writer: &mut dyn Write,
) -> Result<PointOfInterest, CliError> {
    let mut poi = PointOfInterest::new_at(args.lat, args.lng, now);
    let snapshot = poi.refresh_context(layers);
    store.insert(poi.clone())?;
    info!("added {} at {}, {}", poi.id, poi.lat, poi.lng);
    writeln!(writer, "{}", poi.id).map_err(CliError::WriteOutput)?;
    write_context(writer, &snapshot).map_err(CliError::WriteOutput)?;
    Ok(poi)
}

/// Recompute and persist the context of a POI, then print it with
/// suggestions.
pub(crate) fn show(
    store: &mut dyn PoiStore,
    context: Context<'_>,
    id: &str,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let mut poi = find_poi(store, id)?;
    poi.refresh_context(context.layers);
    store.update(poi.clone())?;
    write_report(writer, &poi, context)
}

/// Apply an edit, recompute the context and persist the result.
pub(crate) fn edit(
    store: &mut dyn PoiStore,
    context: Context<'_>,
    args: &EditArgs,
    writer: &mut dyn Write,
) -> Result<PointOfInterest, CliError> {
    let mut poi = find_poi(store, &args.id)?;
    poi.apply_edit(args.form_edit());
    if let Some(path) = &args.before_file {
        poi.set_before_embedded(embed_file(path)?);
    }
    for tag in &args.toggle_tags {
        poi.toggle_tag(*tag);
    }
    if let Some(image_id) = &args.after_image {
        if context.bank.get(image_id).is_none() {
            return Err(CliError::UnknownImage {
                id: image_id.clone(),
            });
        }
        poi.choose_after_image(image_id.as_str());
    }
    poi.refresh_context(context.layers);
    store.update(poi.clone())?;
    info!("saved {}", poi.id);
    write_report(writer, &poi, context)?;
    Ok(poi)
}

/// Remove a POI.
pub(crate) fn delete(
    store: &mut dyn PoiStore,
    id: &str,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let removed = store.remove(id)?;
    writeln!(writer, "deleted {}", removed.id).map_err(CliError::WriteOutput)
}

/// Print one line per POI followed by the count.
pub(crate) fn list(store: &dyn PoiStore, writer: &mut dyn Write) -> Result<(), CliError> {
    let pois = store.all();
    for poi in &pois {
        write_summary(writer, poi).map_err(CliError::WriteOutput)?;
    }
    writeln!(writer, "{} POIs", pois.len()).map_err(CliError::WriteOutput)
}

/// Export the whole store as pretty JSON to `path`, or to `writer` when no
/// path is given.
pub(crate) fn export(
    store: &JsonPoiStore,
    path: Option<&Utf8Path>,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let payload = store.export_pretty().map_err(CliError::SerialiseExport)?;
    match path {
        Some(target) => {
            fieldmark_fs::write_utf8_file(target, format!("{payload}\n")).map_err(|source| {
                CliError::WriteExport {
                    path: target.to_path_buf(),
                    source,
                }
            })?;
            writeln!(writer, "exported {} POIs to {target}", store.all().len())
                .map_err(CliError::WriteOutput)
        }
        None => writeln!(writer, "{payload}").map_err(CliError::WriteOutput),
    }
}

/// Remove every POI once confirmed.
pub(crate) fn clear(
    store: &mut dyn PoiStore,
    confirmed: bool,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    if !confirmed {
        return Err(CliError::ClearNotConfirmed);
    }
    let count = store.all().len();
    store.clear()?;
    writeln!(writer, "cleared {count} POIs").map_err(CliError::WriteOutput)
}

/// Download every layer from `source` into `data_dir` as GeoJSON.
///
/// Stops at the first layer that cannot be fetched or written; layers saved
/// before the failure are kept.
pub(crate) fn fetch_layers<S: LayerSource>(
    source: &S,
    data_dir: &Utf8Path,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    for layer in LayerKind::ALL {
        let collection = source
            .fetch_layer(layer)
            .map_err(|err| CliError::FetchLayer {
                layer,
                source: Box::new(err),
            })?;
        let path = bundled_layer_path(data_dir, layer);
        write_feature_collection(&path, &collection)
            .map_err(|err| CliError::WriteLayer { layer, source: err })?;
        writeln!(writer, "{layer}: {} features -> {path}", collection.len())
            .map_err(CliError::WriteOutput)?;
    }
    Ok(())
}
