//! Core domain types for the Fieldmark annotation tool.
//!
//! A [`PointOfInterest`] records a field observation: where it was made,
//! which issues were seen and which intervention is proposed. Two pure
//! engines operate on it:
//!
//! - [`compute_context_snapshot`] classifies the location against green and
//!   water polygons and measures distances to the nearest green area, water
//!   body, cycling route and road.
//! - [`rank_images`] orders an [`ImageBank`] by how many of its tags overlap
//!   the POI's issues and solution.
//!
//! Persistence goes through the [`PoiStore`] trait. The `store-json` feature
//! enables [`JsonPoiStore`].

#![forbid(unsafe_code)]

mod catalog;
mod context;
mod geometry;
mod image_bank;
mod poi;
mod store;
mod suggest;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use catalog::{
    CatalogParseError, Category, IssueTag, SolutionCatalog, SolutionEntry, SolutionId, Urgency,
};
pub use context::{ContextSnapshot, LandType, compute_context_snapshot};
pub use geometry::{
    ContextLayers, Feature, FeatureCollection, FeatureGeometry, FeatureProperties, GeometryKind,
    LayerKind,
};
pub use image_bank::{ImageBank, ImageBankEntry};
pub use poi::{BeforeImage, PoiEdit, PointOfInterest};
#[cfg(feature = "store-json")]
pub use store::{JsonPoiStore, JsonPoiStoreError};
pub use store::{PoiStore, PoiStoreError};
pub use suggest::{MAX_SUGGESTIONS, ScoredImage, WantedTags, rank_images, score_images};
