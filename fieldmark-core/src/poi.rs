//! Points of interest and their lifecycle edits.
//!
//! The cached context on a POI is never authoritative: every save recomputes
//! it from the coordinate and the current layers.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::{Category, ContextLayers, ContextSnapshot, IssueTag, SolutionId, Urgency};

/// Reference to the "before" image of an observation.
///
/// A POI carries at most one: pasting a URL replaces an uploaded image and
/// uploading replaces a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BeforeImage {
    /// Remote image URL.
    Remote(String),
    /// Inline `data:` URL holding the image bytes.
    Embedded(String),
}

impl BeforeImage {
    /// Return the value usable as an image source.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Remote(url) | Self::Embedded(url) => url,
        }
    }
}

/// A user-created, annotated location.
///
/// Coordinates are WGS84 degrees.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use fieldmark_core::{Category, IssueTag, PointOfInterest, Urgency};
///
/// let mut poi = PointOfInterest::new_at(52.23, 6.86, Utc::now());
/// assert!(poi.id.starts_with("poi_"));
/// assert_eq!(poi.category, Category::PublicSpace);
/// assert_eq!(poi.urgency, Urgency::Medium);
///
/// poi.toggle_tag(IssueTag::NoShade);
/// assert!(poi.tags.contains(&IssueTag::NoShade));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterest {
    /// Opaque unique identifier.
    pub id: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Short title.
    #[serde(default)]
    pub title: String,
    /// Category the observation is filed under.
    #[serde(default)]
    pub category: Category,
    /// Observed issues.
    #[serde(default)]
    pub tags: BTreeSet<IssueTag>,
    /// Urgency level.
    #[serde(default)]
    pub urgency: Urgency,
    /// Free-text comment.
    #[serde(default)]
    pub comment: String,
    /// Image of the current situation.
    #[serde(default)]
    pub before: Option<BeforeImage>,
    /// Proposed intervention.
    #[serde(default)]
    pub solution: Option<SolutionId>,
    /// Free-text note on the intervention.
    #[serde(default)]
    pub solution_note: String,
    /// Chosen image bank entry illustrating the intervention.
    #[serde(default)]
    pub after_image_id: Option<String>,
    /// Last computed spatial context.
    #[serde(default)]
    pub context: Option<ContextSnapshot>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Form-style update applied to a POI.
///
/// `None` leaves a field untouched. Text fields are trimmed before they are
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoiEdit {
    /// New title.
    pub title: Option<String>,
    /// New category.
    pub category: Option<Category>,
    /// New urgency.
    pub urgency: Option<Urgency>,
    /// New comment.
    pub comment: Option<String>,
    /// New before URL; an empty string clears a remote reference.
    pub before_url: Option<String>,
    /// New solution; `Some(None)` clears it.
    pub solution: Option<Option<SolutionId>>,
    /// New solution note.
    pub solution_note: Option<String>,
}

impl PointOfInterest {
    /// Create a POI at the given coordinate with default annotations.
    #[must_use]
    pub fn new_at(lat: f64, lng: f64, created_at: DateTime<Utc>) -> Self {
        Self {
            id: generate_id(),
            lat,
            lng,
            title: String::new(),
            category: Category::default(),
            tags: BTreeSet::new(),
            urgency: Urgency::default(),
            comment: String::new(),
            before: None,
            solution: None,
            solution_note: String::new(),
            after_image_id: None,
            context: None,
            created_at,
        }
    }

    /// Return the location as a coordinate with `x = longitude`.
    #[must_use]
    pub const fn location(&self) -> Coord<f64> {
        Coord {
            x: self.lng,
            y: self.lat,
        }
    }

    /// Add `tag` when absent, remove it when present.
    ///
    /// Returns `true` when the tag is set after the call.
    pub fn toggle_tag(&mut self, tag: IssueTag) -> bool {
        if self.tags.remove(&tag) {
            false
        } else {
            self.tags.insert(tag)
        }
    }

    /// Point the before image at a remote URL.
    ///
    /// A blank URL leaves an embedded image in place but clears a previous
    /// remote reference.
    pub fn set_before_url(&mut self, url: &str) {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            if matches!(self.before, Some(BeforeImage::Remote(_))) {
                self.before = None;
            }
        } else {
            self.before = Some(BeforeImage::Remote(trimmed.to_owned()));
        }
    }

    /// Replace the before image with an embedded `data:` URL.
    pub fn set_before_embedded(&mut self, data_url: String) {
        self.before = Some(BeforeImage::Embedded(data_url));
    }

    /// Select the after image by image bank id.
    pub fn choose_after_image(&mut self, image_id: impl Into<String>) {
        self.after_image_id = Some(image_id.into());
    }

    /// Apply a form-style edit.
    pub fn apply_edit(&mut self, edit: PoiEdit) {
        if let Some(title) = edit.title {
            self.title = title.trim().to_owned();
        }
        if let Some(category) = edit.category {
            self.category = category;
        }
        if let Some(urgency) = edit.urgency {
            self.urgency = urgency;
        }
        if let Some(comment) = edit.comment {
            self.comment = comment.trim().to_owned();
        }
        if let Some(url) = edit.before_url {
            self.set_before_url(&url);
        }
        if let Some(solution) = edit.solution {
            self.solution = solution;
        }
        if let Some(note) = edit.solution_note {
            self.solution_note = note.trim().to_owned();
        }
    }

    /// Recompute and cache the spatial context, returning the new snapshot.
    pub fn refresh_context(&mut self, layers: &ContextLayers) -> ContextSnapshot {
        let snapshot = crate::compute_context_snapshot(self, layers);
        self.context = Some(snapshot);
        snapshot
    }
}

fn generate_id() -> String {
    format!("poi_{}", uuid::Uuid::new_v4().simple())
}
