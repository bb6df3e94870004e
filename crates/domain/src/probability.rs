//! Probability engine.
//!
//! Pure functions over a tally snapshot. Probabilities are percentages in
//! `[0, 100]`; an all-zero tally yields exactly 0 for every face.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{DieKind, FaceCounts};

/// Empirical probability of one face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceProbability {
    pub index: usize,
    pub label: String,
    pub count: u32,
    pub probability_percent: f64,
}

/// Cumulative "pinned face or higher" probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedProbability {
    pub index: usize,
    pub label: String,
    pub cumulative_percent: f64,
}

/// Everything a tracker card shows for one die.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DieStatistics {
    pub kind: DieKind,
    pub total: u64,
    /// In rank order (index order)
    pub faces: Vec<FaceProbability>,
    pub pinned: Option<PinnedProbability>,
}

fn check_counts(kind: DieKind, counts: &[u32]) -> Result<(), DomainError> {
    if counts.is_empty() {
        return Err(DomainError::EmptyFaceCount);
    }
    if counts.len() != kind.face_count() {
        return Err(DomainError::FaceCountMismatch {
            kind,
            expected: kind.face_count(),
            actual: counts.len(),
        });
    }
    Ok(())
}

fn total_of(counts: &[u32]) -> u64 {
    counts.iter().map(|&c| u64::from(c)).sum()
}

fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

/// Per-face probabilities in rank order.
///
/// `probability_percent[i] = 100 * counts[i] / total`, or 0 when the total is 0.
pub fn per_face_probabilities(
    kind: DieKind,
    counts: &[u32],
) -> Result<Vec<FaceProbability>, DomainError> {
    check_counts(kind, counts)?;
    let total = total_of(counts);
    kind.rank_order()
        .into_iter()
        .map(|index| -> Result<FaceProbability, DomainError> {
            let count = counts[index];
            Ok(FaceProbability {
                index,
                label: kind.face_label(index)?,
                count,
                probability_percent: percent(u64::from(count), total),
            })
        })
        .collect()
}

/// Probability of rolling the pinned face or any face ranked above it.
///
/// Computed from the summed tallies rather than by adding rounded
/// percentages, so the lowest face gives exactly 100 for a non-empty tally.
pub fn cumulative_from_face(
    kind: DieKind,
    counts: &[u32],
    pinned_index: usize,
) -> Result<f64, DomainError> {
    check_counts(kind, counts)?;
    kind.validate_index(pinned_index)?;
    let order = kind.rank_order();
    let rank = order
        .iter()
        .position(|&index| index == pinned_index)
        .ok_or_else(|| DomainError::invalid_face_index(kind, pinned_index))?;
    let at_or_above: u64 = order[rank..]
        .iter()
        .map(|&index| u64::from(counts[index]))
        .sum();
    Ok(percent(at_or_above, total_of(counts)))
}

/// Full statistics for one die, recomputing the pinned face if any.
pub fn summarize(faces: &FaceCounts, pinned: Option<usize>) -> Result<DieStatistics, DomainError> {
    let kind = faces.kind();
    let counts = faces.counts();
    let per_face = per_face_probabilities(kind, counts)?;
    let pinned = pinned
        .map(|index| -> Result<PinnedProbability, DomainError> {
            Ok(PinnedProbability {
                index,
                label: kind.face_label(index)?,
                cumulative_percent: cumulative_from_face(kind, counts, index)?,
            })
        })
        .transpose()?;
    Ok(DieStatistics {
        kind,
        total: faces.total(),
        faces: per_face,
        pinned,
    })
}
