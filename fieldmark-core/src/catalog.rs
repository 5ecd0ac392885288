//! Fixed vocabularies used to annotate points of interest.
//!
//! Categories, issue tags, urgency levels and intervention solutions are
//! closed sets. Each enum round-trips through its snake_case identifier so
//! persisted records and CLI input are validated instead of silently failing
//! to match.
//!
//! # Examples
//! ```
//! use fieldmark_core::{Category, IssueTag, SolutionId};
//!
//! assert_eq!(Category::GreenComfort.as_str(), "green_comfort");
//! assert_eq!("no_shade".parse::<IssueTag>(), Ok(IssueTag::NoShade));
//! assert!(SolutionId::AddShadeTrees.tags().contains(&"comfort"));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when an identifier is not part of a fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {vocabulary} '{value}'")]
pub struct CatalogParseError {
    /// Name of the vocabulary that rejected the value.
    pub vocabulary: &'static str,
    /// The rejected identifier.
    pub value: String,
}

impl CatalogParseError {
    fn new(vocabulary: &'static str, value: &str) -> Self {
        Self {
            vocabulary,
            value: value.to_owned(),
        }
    }
}

/// Implements `Display` and `FromStr` over the `ALL`/`as_str` pair of a
/// vocabulary enum.
macro_rules! vocabulary_conversions {
    ($ty:ident, $name:literal) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = CatalogParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str() == s)
                    .ok_or_else(|| CatalogParseError::new($name, s))
            }
        }
    };
}

/// Broad category a point of interest is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Squares, streets and other shared public space.
    #[default]
    PublicSpace,
    /// Mobility and access.
    Mobility,
    /// Greenery and comfort.
    GreenComfort,
    /// Safety and usability.
    Safety,
}

impl Category {
    /// Every category in presentation order.
    pub const ALL: [Self; 4] = [
        Self::PublicSpace,
        Self::Mobility,
        Self::GreenComfort,
        Self::Safety,
    ];

    /// Return the persisted identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PublicSpace => "public_space",
            Self::Mobility => "mobility",
            Self::GreenComfort => "green_comfort",
            Self::Safety => "safety",
        }
    }

    /// Return the human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PublicSpace => "Public space",
            Self::Mobility => "Mobility & access",
            Self::GreenComfort => "Green & comfort",
            Self::Safety => "Safety / usability",
        }
    }
}

vocabulary_conversions!(Category, "category");

/// Observed issue attached to a point of interest.
///
/// The identifiers double as match vocabulary for the image bank.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IssueTag {
    /// No shade.
    NoShade,
    /// Unsafe crossing.
    UnsafeCrossing,
    /// Parking pressure.
    ParkingPressure,
    /// Unused space.
    UnusedSpace,
    /// No seating.
    NoSeating,
    /// Poor play provision.
    PoorPlay,
    /// Heat stress.
    HeatStress,
    /// Poor lighting.
    PoorLighting,
    /// Pedestrian/cycle conflict.
    Conflict,
    /// Water-edge constraint.
    WaterConstraint,
}

impl IssueTag {
    /// Every tag in presentation order.
    pub const ALL: [Self; 10] = [
        Self::NoShade,
        Self::UnsafeCrossing,
        Self::ParkingPressure,
        Self::UnusedSpace,
        Self::NoSeating,
        Self::PoorPlay,
        Self::HeatStress,
        Self::PoorLighting,
        Self::Conflict,
        Self::WaterConstraint,
    ];

    /// Return the persisted identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoShade => "no_shade",
            Self::UnsafeCrossing => "unsafe_crossing",
            Self::ParkingPressure => "parking_pressure",
            Self::UnusedSpace => "unused_space",
            Self::NoSeating => "no_seating",
            Self::PoorPlay => "poor_play",
            Self::HeatStress => "heat_stress",
            Self::PoorLighting => "poor_lighting",
            Self::Conflict => "conflict",
            Self::WaterConstraint => "water_constraint",
        }
    }

    /// Return the human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoShade => "No shade",
            Self::UnsafeCrossing => "Unsafe crossing",
            Self::ParkingPressure => "Parking pressure",
            Self::UnusedSpace => "Unused space",
            Self::NoSeating => "No seating",
            Self::PoorPlay => "Poor play",
            Self::HeatStress => "Heat stress",
            Self::PoorLighting => "Poor lighting",
            Self::Conflict => "Ped/cycle conflict",
            Self::WaterConstraint => "Water-edge constraint",
        }
    }
}

vocabulary_conversions!(IssueTag, "tag");

/// How pressing an observation is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Can wait.
    Low,
    /// Default urgency for new observations.
    #[default]
    Medium,
    /// Needs attention soon.
    High,
}

impl Urgency {
    /// Every urgency level from lowest to highest.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Return the persisted identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

vocabulary_conversions!(Urgency, "urgency");

/// Intervention proposed for a point of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionId {
    /// Add shade or trees.
    AddShadeTrees,
    /// Add seating or a meeting place.
    AddSeating,
    /// Add a play element.
    AddPlay,
    /// Make a crossing safer.
    SaferCrossing,
    /// Reduce parking or create shared space.
    ReduceParkingShared,
    /// Add a water or cooling element.
    WaterCooling,
}

impl SolutionId {
    /// Every solution in presentation order.
    pub const ALL: [Self; 6] = [
        Self::AddShadeTrees,
        Self::AddSeating,
        Self::AddPlay,
        Self::SaferCrossing,
        Self::ReduceParkingShared,
        Self::WaterCooling,
    ];

    /// Return the persisted identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddShadeTrees => "add_shade_trees",
            Self::AddSeating => "add_seating",
            Self::AddPlay => "add_play",
            Self::SaferCrossing => "safer_crossing",
            Self::ReduceParkingShared => "reduce_parking_shared",
            Self::WaterCooling => "water_cooling",
        }
    }

    /// Return the human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AddShadeTrees => "Add shade / trees",
            Self::AddSeating => "Add seating / meeting place",
            Self::AddPlay => "Add play element",
            Self::SaferCrossing => "Safer crossing",
            Self::ReduceParkingShared => "Reduce parking / shared space",
            Self::WaterCooling => "Water / cooling element",
        }
    }

    /// Return the match vocabulary associated with the solution.
    ///
    /// Entries mix issue tags with broader descriptors such as `comfort`
    /// or `mobility` that only occur in image bank tags.
    #[must_use]
    pub const fn tags(self) -> &'static [&'static str] {
        match self {
            Self::AddShadeTrees => &["no_shade", "heat_stress", "comfort", "green"],
            Self::AddSeating => &["no_seating", "unused_space", "social", "comfort"],
            Self::AddPlay => &["poor_play", "unused_space", "social"],
            Self::SaferCrossing => &["unsafe_crossing", "mobility", "safety"],
            Self::ReduceParkingShared => &["parking_pressure", "conflict", "mobility"],
            Self::WaterCooling => &["heat_stress", "water", "comfort"],
        }
    }
}

vocabulary_conversions!(SolutionId, "solution");

/// An entry of the solution catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionEntry {
    /// Solution identifier.
    pub id: SolutionId,
    /// Display label.
    pub label: String,
    /// Tags added to the wanted set when this solution is chosen.
    pub tags: Vec<String>,
}

impl From<SolutionId> for SolutionEntry {
    fn from(id: SolutionId) -> Self {
        Self {
            id,
            label: id.label().to_owned(),
            tags: id.tags().iter().map(|&tag| tag.to_owned()).collect(),
        }
    }
}

/// Lookup table from solution identifiers to their match vocabulary.
///
/// # Examples
/// ```
/// use fieldmark_core::{SolutionCatalog, SolutionId};
///
/// let catalog = SolutionCatalog::builtin();
/// let entry = catalog.get(SolutionId::AddPlay).expect("built-in entry");
/// assert_eq!(entry.label, "Add play element");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SolutionCatalog {
    entries: Vec<SolutionEntry>,
}

impl SolutionCatalog {
    /// Build a catalog from explicit entries.
    #[must_use]
    pub const fn new(entries: Vec<SolutionEntry>) -> Self {
        Self { entries }
    }

    /// Return the catalog shipped with the tool.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(SolutionId::ALL.into_iter().map(SolutionEntry::from).collect())
    }

    /// Find the entry for `id`, if the catalog carries one.
    #[must_use]
    pub fn get(&self, id: SolutionId) -> Option<&SolutionEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Iterate over entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &SolutionEntry> {
        self.entries.iter()
    }
}
