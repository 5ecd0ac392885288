//! Facade crate for the Fieldmark annotation tool.
//!
//! This crate re-exports the core domain types and exposes the JSON store
//! and the layer and image-bank loaders behind feature flags.

#![forbid(unsafe_code)]

pub use fieldmark_core::{
    BeforeImage, Category, ContextLayers, ContextSnapshot, FeatureCollection, ImageBank,
    ImageBankEntry, IssueTag, LandType, LayerKind, PoiEdit, PoiStore, PoiStoreError,
    PointOfInterest, SolutionCatalog, SolutionId, Urgency, compute_context_snapshot, rank_images,
};

#[cfg(feature = "store-json")]
pub use fieldmark_core::{JsonPoiStore, JsonPoiStoreError};

#[cfg(feature = "data")]
pub use fieldmark_data::{
    LayerSource, OverpassClient, OverpassConfig, load_context_layers, load_image_bank,
};
