//! JSON-file backed store for points of interest.
//!
//! The file holds a single document, `{ "pois": [...] }`, in insertion order.
//! Loading is tolerant: a missing file is an empty store, and a file that
//! cannot be read or parsed is logged and treated as empty rather than
//! blocking the user. Records are decoded one by one; a record that does not
//! decode is skipped with a warning and the file is copied to `<file>.bak`
//! before anything can overwrite it. Writes go to a sibling temporary file that is then
//! renamed over the original.

use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::PointOfInterest;

use super::{PoiStore, PoiStoreError};

/// Error raised while writing the store file.
#[derive(Debug, Error)]
pub enum JsonPoiStoreError {
    /// Creating or writing the temporary file failed.
    #[error("failed to write POI store to {path}: {source}")]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Encoding the collection failed.
    #[error("failed to encode POI store for {path}: {source}")]
    Encode {
        /// Destination file.
        path: PathBuf,
        /// Encoder failure from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Moving the temporary file into place failed.
    #[error("failed to replace POI store at {path}: {source}")]
    Rename {
        /// Destination file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl From<JsonPoiStoreError> for PoiStoreError {
    fn from(error: JsonPoiStoreError) -> Self {
        Self::Backend(Box::new(error))
    }
}

/// Store document decoded record by record so one bad entry cannot hide the
/// rest.
#[derive(Debug, Default, Deserialize)]
struct RawStoreDocument {
    #[serde(default)]
    pois: Vec<serde_json::Value>,
}

/// [`PoiStore`] persisted as a JSON document on disk.
///
/// # Examples
/// ```no_run
/// use chrono::Utc;
/// use fieldmark_core::{JsonPoiStore, PointOfInterest, PoiStore};
///
/// let mut store = JsonPoiStore::open("pois.json");
/// store.insert(PointOfInterest::new_at(52.23, 6.86, Utc::now()))?;
/// assert_eq!(store.all().len(), 1);
/// # Ok::<(), fieldmark_core::PoiStoreError>(())
/// ```
#[derive(Debug)]
pub struct JsonPoiStore {
    path: PathBuf,
    pois: Vec<PointOfInterest>,
}

impl JsonPoiStore {
    /// Open the store at `path`, loading whatever valid state it holds.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let store_path = path.as_ref().to_path_buf();
        let pois = load_document(&store_path);
        Self {
            path: store_path,
            pois,
        }
    }

    /// Location of the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialise the whole store as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns the `serde_json` error if encoding fails.
    pub fn export_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&StoreDocumentRef { pois: &self.pois })
    }

    fn persist(&self, pois: &[PointOfInterest]) -> Result<(), JsonPoiStoreError> {
        let temp_path = temp_path_for(&self.path);
        let file = fs::File::create(&temp_path).map_err(|source| JsonPoiStoreError::Write {
            path: temp_path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &StoreDocumentRef { pois }).map_err(|source| {
            JsonPoiStoreError::Encode {
                path: self.path.clone(),
                source,
            }
        })?;
        writer
            .flush()
            .and_then(|()| writer.get_ref().sync_all())
            .map_err(|source| JsonPoiStoreError::Write {
                path: temp_path.clone(),
                source,
            })?;
        drop(writer);
        fs::rename(&temp_path, &self.path).map_err(|source| JsonPoiStoreError::Rename {
            path: self.path.clone(),
            source,
        })
    }
}

#[derive(Serialize)]
struct StoreDocumentRef<'a> {
    pois: &'a [PointOfInterest],
}

impl PoiStore for JsonPoiStore {
    fn all(&self) -> Vec<PointOfInterest> {
        self.pois.clone()
    }

    fn replace_all(&mut self, pois: Vec<PointOfInterest>) -> Result<(), PoiStoreError> {
        self.persist(&pois)?;
        self.pois = pois;
        Ok(())
    }
}

fn load_document(path: &Path) -> Vec<PointOfInterest> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            warn!("ignoring unreadable POI store {}: {err}", path.display());
            return Vec::new();
        }
    };
    let document: RawStoreDocument = match serde_json::from_str(&raw) {
        Ok(document) => document,
        Err(err) => {
            warn!("ignoring malformed POI store {}: {err}", path.display());
            return Vec::new();
        }
    };
    let total = document.pois.len();
    let pois: Vec<PointOfInterest> = document
        .pois
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            serde_json::from_value(record)
                .inspect_err(|err| {
                    warn!(
                        "skipping POI record {index} in {}: {err}",
                        path.display()
                    );
                })
                .ok()
        })
        .collect();
    if pois.len() < total {
        back_up_store(path);
    }
    pois
}

/// Copy the store aside before a lossy load can be overwritten by the next
/// write.
fn back_up_store(path: &Path) {
    let backup = sibling_with_suffix(path, ".bak");
    match fs::copy(path, &backup) {
        Ok(_) => warn!(
            "kept a copy of {} with unreadable records at {}",
            path.display(),
            backup.display()
        ),
        Err(err) => warn!("failed to back up POI store {}: {err}", path.display()),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    sibling_with_suffix(path, ".tmp")
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContextLayers, IssueTag};
    use chrono::Utc;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_store_path() -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("pois.json");
        (dir, path)
    }

    #[rstest]
    fn missing_file_opens_empty(#[from(temp_store_path)] (_dir, path): (TempDir, PathBuf)) {
        let store = JsonPoiStore::open(&path);
        assert!(store.all().is_empty());
        assert!(!path.exists());
    }

    #[rstest]
    fn persisted_pois_round_trip_in_order(
        #[from(temp_store_path)] (_dir, path): (TempDir, PathBuf),
    ) {
        let mut store = JsonPoiStore::open(&path);
        let mut first = PointOfInterest::new_at(52.23, 6.86, Utc::now());
        first.toggle_tag(IssueTag::NoShade);
        first.refresh_context(&ContextLayers::default());
        let second = PointOfInterest::new_at(52.24, 6.87, Utc::now());
        store.insert(first.clone()).expect("insert first");
        store.insert(second.clone()).expect("insert second");

        let reopened = JsonPoiStore::open(&path);
        assert_eq!(reopened.all(), vec![first, second]);
    }

    #[rstest]
    #[case(b"not json".as_slice())]
    #[case(b"{\"pois\": 3}".as_slice())]
    #[case(b"[]".as_slice())]
    fn malformed_file_opens_empty(
        #[from(temp_store_path)] (_dir, path): (TempDir, PathBuf),
        #[case] contents: &[u8],
    ) {
        fs::write(&path, contents).expect("write corrupt store");
        assert!(JsonPoiStore::open(&path).all().is_empty());
    }

    #[rstest]
    fn document_without_pois_key_opens_empty(
        #[from(temp_store_path)] (_dir, path): (TempDir, PathBuf),
    ) {
        fs::write(&path, b"{}").expect("write store");
        assert!(JsonPoiStore::open(&path).all().is_empty());
    }

    #[rstest]
    fn undecodable_record_keeps_its_valid_siblings(
        #[from(temp_store_path)] (_dir, path): (TempDir, PathBuf),
    ) {
        let keep = PointOfInterest::new_at(52.23, 6.86, Utc::now());
        let mut bad = serde_json::to_value(&keep).expect("encode poi");
        bad["id"] = serde_json::json!("poi_bad");
        bad["tags"] = serde_json::json!(["bogus"]);
        let document = serde_json::json!({ "pois": [keep, bad] });
        fs::write(&path, document.to_string()).expect("write store");

        let mut store = JsonPoiStore::open(&path);
        assert_eq!(store.all(), vec![keep.clone()]);

        let added = PointOfInterest::new_at(52.24, 6.87, Utc::now());
        store.insert(added.clone()).expect("insert");
        assert_eq!(JsonPoiStore::open(&path).all(), vec![keep, added]);

        let backup = fs::read_to_string(sibling_with_suffix(&path, ".bak")).expect("backup kept");
        assert!(backup.contains("poi_bad"), "{backup}");
    }

    #[rstest]
    fn write_failure_leaves_memory_untouched() {
        let mut store = JsonPoiStore::open("/non-existent/dir/pois.json");
        let err = store
            .insert(PointOfInterest::new_at(0.0, 0.0, Utc::now()))
            .expect_err("write should fail");
        assert!(matches!(err, PoiStoreError::Backend(_)));
        assert!(store.all().is_empty());
    }

    #[rstest]
    fn export_wraps_pois_in_document(#[from(temp_store_path)] (_dir, path): (TempDir, PathBuf)) {
        let mut store = JsonPoiStore::open(&path);
        store
            .insert(PointOfInterest::new_at(52.23, 6.86, Utc::now()))
            .expect("insert");
        let exported: serde_json::Value =
            serde_json::from_str(&store.export_pretty().expect("export")).expect("valid json");
        assert_eq!(exported["pois"].as_array().map(Vec::len), Some(1));
    }

    #[rstest]
    fn temp_path_is_sibling() {
        assert_eq!(
            temp_path_for(Path::new("/data/pois.json")),
            PathBuf::from("/data/pois.json.tmp")
        );
    }
}
