//! Behavioural tests for `JsonPoiStore` using rstest-bdd.

use std::{cell::RefCell, path::PathBuf};

use chrono::Utc;
use fieldmark_core::{JsonPoiStore, PoiStore, PointOfInterest};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

struct StoreWorld {
    temp_dir: TempDir,
    store: RefCell<Option<JsonPoiStore>>,
    saved: RefCell<Vec<PointOfInterest>>,
}

impl StoreWorld {
    fn path(&self) -> PathBuf {
        self.temp_dir.path().join("pois.json")
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut JsonPoiStore) -> T) -> T {
        let mut borrowed = self.store.borrow_mut();
        let store = borrowed.get_or_insert_with(|| JsonPoiStore::open(self.path()));
        f(store)
    }
}

#[fixture]
fn world() -> StoreWorld {
    StoreWorld {
        temp_dir: TempDir::new().expect("create temp dir"),
        store: RefCell::new(None),
        saved: RefCell::new(Vec::new()),
    }
}

#[given("an empty JSON store in a temporary directory")]
fn given_empty(world: &StoreWorld) {
    world.store.replace(Some(JsonPoiStore::open(world.path())));
}

#[given("a JSON store file containing garbage")]
fn given_garbage(world: &StoreWorld) {
    std::fs::write(world.path(), "{\"pois\": [oops").expect("write garbage");
}

#[when("two points of interest are saved")]
fn save_two(world: &StoreWorld) {
    let now = Utc::now();
    let pois = vec![
        PointOfInterest::new_at(52.2301, 6.8601, now),
        PointOfInterest::new_at(52.2302, 6.8602, now),
    ];
    world.with_store(|store| {
        for poi in &pois {
            store.insert(poi.clone()).expect("insert poi");
        }
    });
    world.saved.replace(pois);
}

#[when("the first point of interest is deleted")]
fn delete_first(world: &StoreWorld) {
    let first = world.saved.borrow().first().cloned().expect("saved poi");
    world.with_store(|store| store.remove(&first.id).expect("remove poi"));
}

#[when("the store is reopened")]
fn reopen(world: &StoreWorld) {
    world.store.replace(Some(JsonPoiStore::open(world.path())));
}

#[then("both points of interest are listed in creation order")]
fn then_both(world: &StoreWorld) {
    let listed = world.with_store(|store| store.all());
    assert_eq!(listed, *world.saved.borrow());
}

#[then("no points of interest are listed")]
fn then_none(world: &StoreWorld) {
    assert!(world.with_store(|store| store.all()).is_empty());
}

#[then("only the second point of interest is listed")]
fn then_second(world: &StoreWorld) {
    let listed = world.with_store(|store| store.all());
    let saved = world.saved.borrow();
    assert_eq!(listed.as_slice(), saved.get(1..).expect("two saved POIs"));
}

#[scenario(path = "tests/features/json_poi_store.feature", index = 0)]
fn survives_reopen(world: StoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/json_poi_store.feature", index = 1)]
fn corrupt_file(world: StoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/json_poi_store.feature", index = 2)]
fn delete_persists(world: StoreWorld) {
    let _ = world;
}
