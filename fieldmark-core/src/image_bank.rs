//! Candidate "after" images for proposed interventions.

use serde::{Deserialize, Serialize};

/// An illustrative image with descriptive match tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBankEntry {
    /// Identifier referenced by [`crate::PointOfInterest::after_image_id`].
    pub id: String,
    /// Display URL.
    pub url: String,
    /// Caption.
    #[serde(default)]
    pub title: String,
    /// Descriptive tags matched against a POI's wanted tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Ordered, read-only collection of image entries.
///
/// Bank order matters: ranking ties are broken by it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageBank {
    entries: Vec<ImageBankEntry>,
}

impl ImageBank {
    /// Build a bank from entries in display order.
    #[must_use]
    pub const fn new(entries: Vec<ImageBankEntry>) -> Self {
        Self { entries }
    }

    /// Find an entry by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ImageBankEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Entries in bank order.
    #[must_use]
    pub fn entries(&self) -> &[ImageBankEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when the bank is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ImageBankEntry> for ImageBank {
    fn from_iter<I: IntoIterator<Item = ImageBankEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
