//! Identification data model
//!
//! Every image yields an [`ImageResult`] holding two lenses:
//! - `accurate`: read from legible text on the packaging
//! - `guessed`: inferred from visual appearance
//!
//! Results from several images of the same medicine are merged into one
//! [`ConsolidatedResult`] by [`crate::aggregate`].

use serde::{Deserialize, Serialize};

/// Placeholder for a scalar field no image supplied
pub const UNKNOWN: &str = "Unknown";

/// One identification lens as reported for a single image
///
/// Every field is optional. A JSON `null` deserializes the same as an absent
/// key. Unknown keys are rejected so that loosely-shaped model output never
/// reaches the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Lens {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_effects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

/// Structured output of the external identifier for one image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accurate: Option<Lens>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guessed: Option<Lens>,
}

impl ImageResult {
    /// Result carrying only an `accurate` lens
    pub fn accurate(lens: Lens) -> Self {
        Self {
            accurate: Some(lens),
            guessed: None,
        }
    }

    /// Result carrying only a `guessed` lens
    pub fn guessed(lens: Lens) -> Self {
        Self {
            accurate: None,
            guessed: Some(lens),
        }
    }
}

/// A fully populated lens after aggregation
///
/// Field order matches the wire contract:
/// `name, dosage, side_effects, manufacturer, usage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LensSummary {
    pub name: String,
    pub dosage: String,
    pub side_effects: Vec<String>,
    pub manufacturer: String,
    pub usage: String,
}

impl Default for LensSummary {
    fn default() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            dosage: UNKNOWN.to_string(),
            side_effects: Vec::new(),
            manufacturer: UNKNOWN.to_string(),
            usage: UNKNOWN.to_string(),
        }
    }
}

/// Consolidated identification across all usable images
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedResult {
    pub accurate: LensSummary,
    pub guessed: LensSummary,
}
