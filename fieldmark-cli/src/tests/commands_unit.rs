//! Unit tests for the POI lifecycle commands.

use super::helpers::{PARK_CENTRE, Workspace, park_layers, shade_bank, write_utf8};
use super::*;
use crate::commands::{self, AddArgs};
use fieldmark_core::test_support::MemoryStore;
use fieldmark_core::{
    BeforeImage, FeatureCollection, IssueTag, LandType, LayerKind, PoiStore, PointOfInterest,
    SolutionId,
};
use fieldmark_data::test_support::StubLayerSource;
use fieldmark_data::{layers::bundled_layer_path, read_feature_collection};
use rstest::{fixture, rstest};

struct Harness {
    store: MemoryStore,
    layers: ContextLayers,
    bank: ImageBank,
    catalog: SolutionCatalog,
}

impl Harness {
    fn show(&mut self, id: &str) -> Result<String, CliError> {
        let mut out = Vec::new();
        let context = Context {
            layers: &self.layers,
            bank: &self.bank,
            catalog: &self.catalog,
        };
        commands::show(&mut self.store, context, id, &mut out)?;
        Ok(String::from_utf8(out).expect("utf-8 output"))
    }

    fn add_at_park(&mut self) -> PointOfInterest {
        let args = AddArgs {
            lat: PARK_CENTRE.y,
            lng: PARK_CENTRE.x,
        };
        commands::add(&mut self.store, &self.layers, &args, Utc::now(), &mut Vec::new())
            .expect("add succeeds")
    }

    fn edit(&mut self, args: &EditArgs) -> Result<(PointOfInterest, String), CliError> {
        let mut out = Vec::new();
        let context = Context {
            layers: &self.layers,
            bank: &self.bank,
            catalog: &self.catalog,
        };
        let poi = commands::edit(&mut self.store, context, args, &mut out)?;
        Ok((poi, String::from_utf8(out).expect("utf-8 output")))
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        store: MemoryStore::default(),
        layers: park_layers(),
        bank: shade_bank(),
        catalog: SolutionCatalog::builtin(),
    }
}

#[rstest]
fn add_persists_poi_with_context(mut harness: Harness) {
    let args = AddArgs {
        lat: PARK_CENTRE.y,
        lng: PARK_CENTRE.x,
    };
    let mut out = Vec::new();
    let poi = commands::add(&mut harness.store, &harness.layers, &args, Utc::now(), &mut out)
        .expect("add succeeds");

    let text = String::from_utf8(out).expect("utf-8 output");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(poi.id.as_str()));
    assert_eq!(lines.next(), Some("Land-use/type: green_area"));
    assert_eq!(lines.next(), Some("Near green: yes (0 m)"));

    let stored = harness.store.all();
    assert_eq!(stored, [poi.clone()]);
    let snapshot = poi.context.expect("context cached");
    assert_eq!(snapshot.land_type, LandType::GreenArea);
    assert_eq!(snapshot.dist_road_m, Some(50));
    assert!(snapshot.near_road);
    assert_eq!(snapshot.dist_water_m, None);
}

#[rstest]
fn show_refreshes_stale_context(mut harness: Harness) {
    let mut poi = harness.add_at_park();
    poi.context = None;
    harness.store.update(poi.clone()).expect("clear cached context");

    let text = harness.show(&poi.id).expect("show succeeds");
    assert!(text.starts_with(&format!("{}\nTitle: \n", poi.id)), "{text}");
    assert!(text.contains("Near road: yes (50 m)\n"), "{text}");
    assert!(text.contains("Suggested after images:\n"), "{text}");
    let stored = harness.store.get(&poi.id).expect("poi stored");
    assert!(stored.context.is_some());
}

#[rstest]
fn show_unknown_poi_fails(mut harness: Harness) {
    match harness.show("poi_missing").expect_err("unknown id should fail") {
        CliError::UnknownPoi { id } => assert_eq!(id, "poi_missing"),
        other => panic!("expected UnknownPoi, found {other:?}"),
    }
}

#[rstest]
fn edit_applies_form_fields_and_ranks_suggestions(mut harness: Harness) {
    let poi = harness.add_at_park();
    let args = EditArgs {
        id: poi.id.clone(),
        title: Some("  Bare square  ".to_owned()),
        comment: Some(" No trees at all ".to_owned()),
        solution: Some(SolutionId::AddShadeTrees),
        toggle_tags: vec![IssueTag::NoShade],
        ..EditArgs::default()
    };
    let (edited, text) = harness.edit(&args).expect("edit succeeds");

    assert_eq!(edited.title, "Bare square");
    assert_eq!(edited.comment, "No trees at all");
    assert_eq!(edited.solution, Some(SolutionId::AddShadeTrees));
    assert!(edited.tags.contains(&IssueTag::NoShade));
    assert_eq!(harness.store.get(&poi.id), Some(edited));

    let c = text.find("  c  c  img/c.jpg").expect("c suggested");
    let a = text.find("  a  a  img/a.jpg").expect("a suggested");
    assert!(c < a, "shade trees image should rank first:\n{text}");
    assert!(!text.contains("img/b.jpg"), "{text}");
}

#[rstest]
fn toggling_a_tag_twice_removes_it(mut harness: Harness) {
    let poi = harness.add_at_park();
    let args = EditArgs {
        id: poi.id.clone(),
        toggle_tags: vec![IssueTag::HeatStress, IssueTag::HeatStress],
        ..EditArgs::default()
    };
    let (edited, _) = harness.edit(&args).expect("edit succeeds");
    assert!(edited.tags.is_empty());
}

#[rstest]
fn clearing_the_solution_removes_it(mut harness: Harness) {
    let poi = harness.add_at_park();
    let choose = EditArgs {
        id: poi.id.clone(),
        solution: Some(SolutionId::AddSeating),
        ..EditArgs::default()
    };
    harness.edit(&choose).expect("choose solution");
    let clear = EditArgs {
        id: poi.id,
        clear_solution: true,
        ..EditArgs::default()
    };
    let (edited, _) = harness.edit(&clear).expect("clear solution");
    assert_eq!(edited.solution, None);
}

#[rstest]
fn before_file_then_url_keeps_one_reference(mut harness: Harness) {
    let workspace = Workspace::new();
    let photo = workspace.root().join("corner.png");
    write_utf8(&photo, b"\x89PNG");
    let poi = harness.add_at_park();

    let embed = EditArgs {
        id: poi.id.clone(),
        before_file: Some(photo),
        ..EditArgs::default()
    };
    let (embedded, _) = harness.edit(&embed).expect("embed before image");
    match embedded.before {
        Some(BeforeImage::Embedded(data_url)) => {
            assert!(data_url.starts_with("data:image/png;base64,"), "{data_url}");
        }
        other => panic!("expected embedded image, found {other:?}"),
    }

    let link = EditArgs {
        id: poi.id,
        before_url: Some("https://example.org/corner.jpg".to_owned()),
        ..EditArgs::default()
    };
    let (linked, text) = harness.edit(&link).expect("link before image");
    assert_eq!(
        linked.before,
        Some(BeforeImage::Remote("https://example.org/corner.jpg".to_owned()))
    );
    assert!(text.contains("Before: https://example.org/corner.jpg\n"), "{text}");
}

#[rstest]
fn unknown_after_image_is_rejected(mut harness: Harness) {
    let poi = harness.add_at_park();
    let args = EditArgs {
        id: poi.id.clone(),
        title: Some("Never saved".to_owned()),
        after_image: Some("zzz".to_owned()),
        ..EditArgs::default()
    };
    match harness.edit(&args).expect_err("unknown image should fail") {
        CliError::UnknownImage { id } => assert_eq!(id, "zzz"),
        other => panic!("expected UnknownImage, found {other:?}"),
    }
    assert_eq!(harness.store.get(&poi.id).map(|p| p.title), Some(String::new()));
}

#[rstest]
fn chosen_after_image_is_marked(mut harness: Harness) {
    let poi = harness.add_at_park();
    let args = EditArgs {
        id: poi.id,
        after_image: Some("a".to_owned()),
        ..EditArgs::default()
    };
    let (edited, text) = harness.edit(&args).expect("edit succeeds");
    assert_eq!(edited.after_image_id.as_deref(), Some("a"));
    assert!(text.contains("After image: a (a)\n"), "{text}");
    assert!(text.contains("* a  a  img/a.jpg\n"), "{text}");
}

#[rstest]
fn delete_and_list_report_the_store(mut harness: Harness) {
    let first = harness.add_at_park();
    let second = harness.add_at_park();

    let mut out = Vec::new();
    commands::delete(&mut harness.store, &first.id, &mut out).expect("delete succeeds");
    commands::list(&harness.store, &mut out).expect("list succeeds");

    let text = String::from_utf8(out).expect("utf-8 output");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3, "{text}");
    assert_eq!(lines[0], format!("deleted {}", first.id));
    assert!(lines[1].starts_with(&second.id), "{text}");
    assert!(lines[1].ends_with("public_space  medium  (untitled)"), "{text}");
    assert_eq!(lines[2], "1 POIs");
}

#[rstest]
fn delete_unknown_poi_fails(mut harness: Harness) {
    let err = commands::delete(&mut harness.store, "poi_missing", &mut Vec::new())
        .expect_err("unknown id should fail");
    assert!(matches!(err, CliError::Store(_)), "{err:?}");
}

#[rstest]
#[case::unconfirmed(false, 2)]
#[case::confirmed(true, 0)]
fn clear_requires_confirmation(mut harness: Harness, #[case] yes: bool, #[case] remaining: usize) {
    harness.add_at_park();
    harness.add_at_park();
    let outcome = commands::clear(&mut harness.store, yes, &mut Vec::new());
    assert_eq!(outcome.is_ok(), yes);
    if !yes {
        assert!(matches!(outcome, Err(CliError::ClearNotConfirmed)));
    }
    assert_eq!(harness.store.all().len(), remaining);
}

#[rstest]
fn export_writes_pretty_json(mut harness: Harness) {
    let workspace = Workspace::new();
    let mut store = JsonPoiStore::open(workspace.store_path());
    let poi = harness.add_at_park();
    store.insert(poi.clone()).expect("insert");

    let target = workspace.root().join("exports/poi_export.json");
    let mut out = Vec::new();
    commands::export(&store, Some(target.as_path()), &mut out).expect("export succeeds");
    assert_eq!(
        String::from_utf8(out).expect("utf-8 output"),
        format!("exported 1 POIs to {target}\n")
    );

    let json = fieldmark_fs::read_utf8_to_string(&target).expect("read export");
    assert!(json.starts_with("{\n  \"pois\": ["), "{json}");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["pois"][0]["id"], poi.id.as_str());
}

#[rstest]
fn fetch_layers_writes_every_layer() {
    let workspace = Workspace::new();
    let layers = park_layers();
    let mut source = StubLayerSource::default();
    for kind in LayerKind::ALL {
        let collection = layers.layer(kind).cloned().unwrap_or_default();
        source = source.with_layer(kind, collection);
    }

    let mut out = Vec::new();
    commands::fetch_layers(&source, &workspace.data_dir(), &mut out).expect("fetch succeeds");

    let text = String::from_utf8(out).expect("utf-8 output");
    assert_eq!(text.lines().count(), 4, "{text}");
    assert!(text.starts_with("green: 1 features -> "), "{text}");
    let roads = read_feature_collection(&bundled_layer_path(&workspace.data_dir(), LayerKind::Roads))
        .expect("roads written");
    assert_eq!(roads.len(), 1);
    let water = read_feature_collection(&bundled_layer_path(&workspace.data_dir(), LayerKind::Water))
        .expect("water written");
    assert_eq!(water, FeatureCollection::default());
}

#[rstest]
fn fetch_layers_stops_at_the_first_failure() {
    let workspace = Workspace::new();
    let source = StubLayerSource::default().with_layer(LayerKind::Green, FeatureCollection::default());

    let err = commands::fetch_layers(&source, &workspace.data_dir(), &mut Vec::new())
        .expect_err("water is not configured");
    match err {
        CliError::FetchLayer { layer, .. } => assert_eq!(layer, LayerKind::Water),
        other => panic!("expected FetchLayer, found {other:?}"),
    }
    assert!(
        fieldmark_fs::file_is_file(&bundled_layer_path(&workspace.data_dir(), LayerKind::Green))
            .expect("inspect green layer")
    );
}
