//! Multi-image result aggregation
//!
//! Merges per-image identifications into one [`ConsolidatedResult`]:
//! - Scalar fields: plurality vote, ties resolved in favour of the value seen first
//! - `side_effects`: union of every reported list, duplicates removed
//!
//! Absent fields cast no vote. A field no image reported becomes [`UNKNOWN`].

use crate::identification::{ConsolidatedResult, ImageResult, Lens, LensSummary, UNKNOWN};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Aggregation was asked to merge zero results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot aggregate an empty set of image results")]
pub struct EmptyInputError;

/// Ordered vote count for one field
///
/// Entries keep first-seen order. The leader only changes on a strictly
/// greater count, so the earliest of several tied values wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally<'a> {
    entries: Vec<(&'a str, usize)>,
}

impl<'a> Tally<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one vote for `value`
    pub fn vote(&mut self, value: &'a str) {
        match self.entries.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((value, 1)),
        }
    }

    /// Value with the highest count, if any vote was cast
    pub fn leader(&self) -> Option<(&'a str, usize)> {
        let mut best: Option<(&'a str, usize)> = None;
        for &(value, count) in &self.entries {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((value, count)),
            }
        }
        best
    }

    /// All `(value, count)` pairs in first-seen order
    pub fn entries(&self) -> &[(&'a str, usize)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merge per-image results into one consolidated identification
///
/// # Errors
/// [`EmptyInputError`] when `results` is empty. Callers are expected to
/// filter out failed images and report "no usable input" themselves.
pub fn aggregate(results: &[ImageResult]) -> Result<ConsolidatedResult, EmptyInputError> {
    if results.is_empty() {
        return Err(EmptyInputError);
    }

    let consolidated = ConsolidatedResult {
        accurate: consolidate_lens(results, |r| r.accurate.as_ref()),
        guessed: consolidate_lens(results, |r| r.guessed.as_ref()),
    };

    debug!(
        "Aggregated {} image results: accurate.name={}, guessed.name={}",
        results.len(),
        consolidated.accurate.name,
        consolidated.guessed.name
    );

    Ok(consolidated)
}

fn consolidate_lens<F>(results: &[ImageResult], lens_accessor: F) -> LensSummary
where
    F: Fn(&ImageResult) -> Option<&Lens>,
{
    let lenses: Vec<&Lens> = results.iter().filter_map(lens_accessor).collect();

    LensSummary {
        name: plurality(&lenses, |l| l.name.as_deref()),
        dosage: plurality(&lenses, |l| l.dosage.as_deref()),
        side_effects: union_side_effects(&lenses),
        manufacturer: plurality(&lenses, |l| l.manufacturer.as_deref()),
        usage: plurality(&lenses, |l| l.usage.as_deref()),
    }
}

fn plurality<'a, F>(lenses: &[&'a Lens], field_accessor: F) -> String
where
    F: Fn(&'a Lens) -> Option<&'a str>,
{
    let mut tally = Tally::new();
    for &lens in lenses {
        if let Some(value) = field_accessor(lens) {
            tally.vote(value);
        }
    }

    tally
        .leader()
        .map(|(value, _)| value.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn union_side_effects(lenses: &[&Lens]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut union = Vec::new();
    for effects in lenses.iter().copied().filter_map(|l| l.side_effects.as_ref()) {
        for effect in effects {
            if seen.insert(effect.as_str()) {
                union.push(effect.clone());
            }
        }
    }
    union
}
