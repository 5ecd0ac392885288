//! Persistence of points of interest.
//!
//! The `PoiStore` trait models the flat, insertion-ordered collection the
//! annotation tool keeps. Consumers read and replace whole records; derived
//! data such as the cached context snapshot is stored but never trusted.

use thiserror::Error;

use crate::PointOfInterest;

#[cfg(feature = "store-json")]
mod json;

#[cfg(feature = "store-json")]
pub use json::{JsonPoiStore, JsonPoiStoreError};

/// Errors returned by [`PoiStore`] implementations.
#[derive(Debug, Error)]
pub enum PoiStoreError {
    /// A POI with the same id is already stored.
    #[error("point of interest {id} already exists")]
    Duplicate {
        /// Conflicting identifier.
        id: String,
    },
    /// No POI with the requested id is stored.
    #[error("point of interest {id} not found")]
    NotFound {
        /// Requested identifier.
        id: String,
    },
    /// The backing medium failed.
    #[error("failed to persist points of interest: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Read and write access to persisted points of interest.
///
/// Implementations keep POIs in insertion order and reject duplicate ids.
///
/// # Examples
///
/// ```rust
/// use chrono::Utc;
/// use fieldmark_core::{PointOfInterest, PoiStore, PoiStoreError};
///
/// #[derive(Default)]
/// struct VecStore(Vec<PointOfInterest>);
///
/// impl PoiStore for VecStore {
///     fn all(&self) -> Vec<PointOfInterest> {
///         self.0.clone()
///     }
///
///     fn replace_all(&mut self, pois: Vec<PointOfInterest>) -> Result<(), PoiStoreError> {
///         self.0 = pois;
///         Ok(())
///     }
/// }
///
/// let mut store = VecStore::default();
/// let poi = PointOfInterest::new_at(52.2, 6.8, Utc::now());
/// store.insert(poi.clone())?;
/// assert_eq!(store.get(&poi.id), Some(poi));
/// # Ok::<(), PoiStoreError>(())
/// ```
pub trait PoiStore {
    /// Return every stored POI in insertion order.
    fn all(&self) -> Vec<PointOfInterest>;

    /// Replace the stored collection wholesale.
    ///
    /// # Errors
    /// Returns [`PoiStoreError::Backend`] when the collection cannot be
    /// persisted.
    fn replace_all(&mut self, pois: Vec<PointOfInterest>) -> Result<(), PoiStoreError>;

    /// Look up a POI by id.
    fn get(&self, id: &str) -> Option<PointOfInterest> {
        self.all().into_iter().find(|poi| poi.id == id)
    }

    /// Append a new POI.
    ///
    /// # Errors
    /// Returns [`PoiStoreError::Duplicate`] when the id is taken, or a backend
    /// error.
    fn insert(&mut self, poi: PointOfInterest) -> Result<(), PoiStoreError> {
        let mut pois = self.all();
        if pois.iter().any(|existing| existing.id == poi.id) {
            return Err(PoiStoreError::Duplicate { id: poi.id });
        }
        pois.push(poi);
        self.replace_all(pois)
    }

    /// Replace the stored POI sharing `poi.id`, keeping its position.
    ///
    /// # Errors
    /// Returns [`PoiStoreError::NotFound`] when no POI has that id, or a
    /// backend error.
    fn update(&mut self, poi: PointOfInterest) -> Result<(), PoiStoreError> {
        let mut pois = self.all();
        let slot = pois
            .iter_mut()
            .find(|existing| existing.id == poi.id)
            .ok_or_else(|| PoiStoreError::NotFound { id: poi.id.clone() })?;
        *slot = poi;
        self.replace_all(pois)
    }

    /// Remove a POI, returning it.
    ///
    /// # Errors
    /// Returns [`PoiStoreError::NotFound`] when no POI has that id, or a
    /// backend error.
    fn remove(&mut self, id: &str) -> Result<PointOfInterest, PoiStoreError> {
        let mut pois = self.all();
        let position = pois
            .iter()
            .position(|existing| existing.id == id)
            .ok_or_else(|| PoiStoreError::NotFound { id: id.to_owned() })?;
        let removed = pois.remove(position);
        self.replace_all(pois)?;
        Ok(removed)
    }

    /// Remove every POI.
    ///
    /// # Errors
    /// Returns a backend error when the empty collection cannot be persisted.
    fn clear(&mut self) -> Result<(), PoiStoreError> {
        self.replace_all(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::{PoiStore, PoiStoreError};
    use crate::{PointOfInterest, test_support::MemoryStore};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    #[fixture]
    fn pois() -> Vec<PointOfInterest> {
        let now = Utc::now();
        (0..3)
            .map(|i| {
                let mut poi = PointOfInterest::new_at(52.0, 6.0, now);
                poi.id = format!("poi_{i}");
                poi
            })
            .collect()
    }

    #[rstest]
    fn insert_preserves_order(pois: Vec<PointOfInterest>) {
        let mut store = MemoryStore::default();
        for poi in pois.iter().cloned() {
            store.insert(poi).unwrap();
        }
        assert_eq!(store.all(), pois);
    }

    #[rstest]
    fn insert_rejects_duplicate_ids(pois: Vec<PointOfInterest>) {
        let mut store = MemoryStore::with_pois(pois.clone());
        let duplicate = pois.first().cloned().unwrap();
        let err = store.insert(duplicate).unwrap_err();
        assert!(matches!(err, PoiStoreError::Duplicate { id } if id == "poi_0"));
    }

    #[rstest]
    fn update_keeps_position(pois: Vec<PointOfInterest>) {
        let mut store = MemoryStore::with_pois(pois);
        let mut middle = store.get("poi_1").unwrap();
        middle.title = "Updated".into();
        store.update(middle).unwrap();
        let titles: Vec<_> = store.all().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, ["", "Updated", ""]);
    }

    #[rstest]
    fn update_unknown_id_fails(pois: Vec<PointOfInterest>) {
        let mut store = MemoryStore::default();
        let poi = pois.first().cloned().unwrap();
        assert!(matches!(
            store.update(poi),
            Err(PoiStoreError::NotFound { .. })
        ));
    }

    #[rstest]
    fn remove_returns_removed_poi(pois: Vec<PointOfInterest>) {
        let mut store = MemoryStore::with_pois(pois);
        let removed = store.remove("poi_2").unwrap();
        assert_eq!(removed.id, "poi_2");
        assert_eq!(store.all().len(), 2);
        assert!(matches!(
            store.remove("poi_2"),
            Err(PoiStoreError::NotFound { .. })
        ));
    }

    #[rstest]
    fn clear_empties_store(pois: Vec<PointOfInterest>) {
        let mut store = MemoryStore::with_pois(pois);
        store.clear().unwrap();
        assert!(store.all().is_empty());
    }
}
