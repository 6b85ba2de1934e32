//! Exercise selection: blockage → technique → exercise template.

use serde::Serialize;

use crate::catalog::Catalog;

/// Served when a technique carries no exercise templates.
pub const FALLBACK_EXERCISE: &str = "Describe tu idea en una frase corta.";

/// Source of uniform indices. Any `rand::Rng` qualifies; tests can script it.
pub trait RandomSource {
    /// Returns an index in `0..len`. Never called with `len == 0`.
    fn pick_index(&mut self, len: usize) -> usize;
}

impl<R: rand::Rng + ?Sized> RandomSource for R {
    fn pick_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("blockageId is required")]
    MissingBlockage,

    #[error("blockage not found")]
    BlockageNotFound(String),

    #[error("technique not found")]
    TechniqueNotFound(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSelection {
    pub blockage_id: String,
    pub blockage_label: String,
    pub technique_id: String,
    pub technique_name: String,
    pub exercise: String,
}

/// Picks a technique recommended for `blockage_id` and one of its exercises.
///
/// `last_technique` is a soft exclusion: it is dropped from the candidates
/// unless that would leave none, so single-technique blockages still repeat.
pub fn select_exercise<R: RandomSource + ?Sized>(
    catalog: &Catalog,
    blockage_id: &str,
    last_technique: Option<&str>,
    rng: &mut R,
) -> Result<ExerciseSelection, SelectError> {
    let blockage_id = blockage_id.trim();
    if blockage_id.is_empty() {
        return Err(SelectError::MissingBlockage);
    }

    let blockage = catalog
        .blockage(blockage_id)
        .ok_or_else(|| SelectError::BlockageNotFound(blockage_id.to_string()))?;

    let mut candidates: Vec<&str> = blockage.techniques.iter().map(String::as_str).collect();
    if let Some(last) = last_technique.map(str::trim).filter(|l| !l.is_empty()) {
        if candidates.len() > 1 {
            let remaining: Vec<&str> = candidates.iter().copied().filter(|id| *id != last).collect();
            if !remaining.is_empty() {
                candidates = remaining;
            }
        }
    }

    let technique_id = pick(&candidates, rng).copied().unwrap_or_default();
    let technique = catalog
        .technique(technique_id)
        .ok_or_else(|| SelectError::TechniqueNotFound(technique_id.to_string()))?;

    let exercise = pick(&technique.exercises, rng)
        .map(String::as_str)
        .unwrap_or(FALLBACK_EXERCISE);

    tracing::debug!(
        blockage = %blockage.id,
        technique = %technique.id,
        candidates = candidates.len(),
        "exercise selected"
    );

    Ok(ExerciseSelection {
        blockage_id: blockage.id.clone(),
        blockage_label: blockage.label.clone(),
        technique_id: technique.id.clone(),
        technique_name: technique.name.clone(),
        exercise: exercise.to_string(),
    })
}

fn pick<'a, T, R: RandomSource + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.pick_index(items.len()))
}
