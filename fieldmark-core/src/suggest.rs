//! Rank image bank entries as "after" suggestions for a POI.
//!
//! An entry's overlap score is the number of its tags found in the POI's
//! wanted tag set: the POI's own issue tags plus the match vocabulary of its
//! chosen solution. Entries are ordered by descending score with bank order
//! preserved among equal scores.

use std::collections::HashSet;

use crate::{ImageBank, ImageBankEntry, PointOfInterest, SolutionCatalog};

/// Maximum number of suggestions returned by [`rank_images`].
pub const MAX_SUGGESTIONS: usize = 6;

/// Union of a POI's tags and its solution's tags.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use fieldmark_core::{IssueTag, PointOfInterest, SolutionCatalog, SolutionId, WantedTags};
///
/// let mut poi = PointOfInterest::new_at(0.0, 0.0, Utc::now());
/// poi.toggle_tag(IssueTag::NoShade);
/// poi.solution = Some(SolutionId::AddShadeTrees);
///
/// let wanted = WantedTags::for_poi(&poi, &SolutionCatalog::builtin());
/// assert!(wanted.contains("no_shade"));
/// assert!(wanted.contains("comfort"));
/// assert_eq!(wanted.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WantedTags {
    tags: HashSet<String>,
}

impl WantedTags {
    /// Collect the wanted tags of `poi`.
    ///
    /// A solution the catalog does not carry contributes nothing.
    #[must_use]
    pub fn for_poi(poi: &PointOfInterest, catalog: &SolutionCatalog) -> Self {
        let own = poi.tags.iter().map(|tag| tag.as_str().to_owned());
        let from_solution = poi
            .solution
            .and_then(|id| catalog.get(id))
            .into_iter()
            .flat_map(|entry| entry.tags.iter().cloned());
        Self {
            tags: own.chain(from_solution).collect(),
        }
    }

    /// Return `true` when `tag` is wanted.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Number of distinct wanted tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Return `true` when nothing is wanted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Count the entry tags that are wanted.
    #[must_use]
    pub fn overlap(&self, entry: &ImageBankEntry) -> usize {
        entry.tags.iter().filter(|tag| self.contains(tag)).count()
    }
}

/// An image bank entry paired with its overlap score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredImage<'a> {
    /// The scored entry.
    pub entry: &'a ImageBankEntry,
    /// Number of wanted tags the entry carries.
    pub score: usize,
}

/// Score every entry and sort by descending score, stable in bank order.
#[must_use]
pub fn score_images<'a>(wanted: &WantedTags, bank: &'a ImageBank) -> Vec<ScoredImage<'a>> {
    let mut scored: Vec<ScoredImage<'a>> = bank
        .entries()
        .iter()
        .map(|entry| ScoredImage {
            entry,
            score: wanted.overlap(entry),
        })
        .collect();
    // `sort_by` is stable, which keeps bank order among equal scores.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Rank image bank entries as after-image suggestions for `poi`.
///
/// Returns at most [`MAX_SUGGESTIONS`] entries with a positive score. When no
/// entry overlaps the wanted tags, the first entries of the bank are returned
/// instead so there is always something to pick from.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use fieldmark_core::{
///     rank_images, ImageBank, ImageBankEntry, IssueTag, PointOfInterest, SolutionCatalog,
/// };
///
/// let entry = |id: &str, tags: &[&str]| ImageBankEntry {
///     id: id.into(),
///     url: format!("img/{id}.jpg"),
///     title: id.into(),
///     tags: tags.iter().map(|t| (*t).to_owned()).collect(),
/// };
/// let bank = ImageBank::new(vec![
///     entry("a", &["no_shade"]),
///     entry("b", &["no_seating"]),
///     entry("c", &["no_shade", "comfort"]),
/// ]);
/// let mut poi = PointOfInterest::new_at(0.0, 0.0, Utc::now());
/// poi.toggle_tag(IssueTag::NoShade);
///
/// let ids: Vec<_> = rank_images(&poi, &SolutionCatalog::builtin(), &bank)
///     .iter()
///     .map(|e| e.id.as_str())
///     .collect();
/// assert_eq!(ids, ["a", "c"]);
/// ```
#[must_use]
pub fn rank_images<'a>(
    poi: &PointOfInterest,
    catalog: &SolutionCatalog,
    bank: &'a ImageBank,
) -> Vec<&'a ImageBankEntry> {
    let wanted = WantedTags::for_poi(poi, catalog);
    let scored = score_images(&wanted, bank);
    let top: Vec<&ImageBankEntry> = scored
        .iter()
        .filter(|candidate| candidate.score > 0)
        .take(MAX_SUGGESTIONS)
        .map(|candidate| candidate.entry)
        .collect();
    if top.is_empty() {
        scored
            .iter()
            .take(MAX_SUGGESTIONS)
            .map(|candidate| candidate.entry)
            .collect()
    } else {
        top
    }
}
