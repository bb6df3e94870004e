//! Per-face roll tallies for a single die.

use serde::{Deserialize, Serialize};

use super::DieKind;
use crate::error::DomainError;

/// One `{side, rolled_count}` row as stored by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideTally {
    pub side: u32,
    pub rolled_count: u32,
}

impl SideTally {
    pub fn new(side: u32, rolled_count: u32) -> Self {
        Self { side, rolled_count }
    }
}

/// Ordered tally array for one die. The length always equals
/// `kind.face_count()` and index `i` is the face `kind.face_label(i)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "FaceCountsRaw")]
pub struct FaceCounts {
    kind: DieKind,
    counts: Vec<u32>,
}

/// Unchecked wire shape; only reachable through `from_counts`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FaceCountsRaw {
    kind: DieKind,
    counts: Vec<u32>,
}

impl TryFrom<FaceCountsRaw> for FaceCounts {
    type Error = DomainError;

    fn try_from(raw: FaceCountsRaw) -> Result<Self, Self::Error> {
        Self::from_counts(raw.kind, raw.counts)
    }
}

impl FaceCounts {
    /// All faces at zero.
    pub fn zeroed(kind: DieKind) -> Self {
        Self {
            kind,
            counts: vec![0; kind.face_count()],
        }
    }

    /// Wrap an index-ordered tally array.
    ///
    /// # Errors
    ///
    /// `FaceCountMismatch` if `counts.len() != kind.face_count()`.
    pub fn from_counts(kind: DieKind, counts: Vec<u32>) -> Result<Self, DomainError> {
        if counts.len() != kind.face_count() {
            return Err(DomainError::FaceCountMismatch {
                kind,
                expected: kind.face_count(),
                actual: counts.len(),
            });
        }
        Ok(Self { kind, counts })
    }

    /// Build from stored side rows. Rows may arrive in any order; faces with
    /// no row stay at zero.
    ///
    /// # Errors
    ///
    /// `InvalidPersistedSide` for a side that maps to no face.
    pub fn from_side_tallies<I>(kind: DieKind, rows: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = SideTally>,
    {
        let mut faces = Self::zeroed(kind);
        for row in rows {
            let index = kind.from_persisted_side(row.side)?;
            faces.counts[index] = row.rolled_count;
        }
        Ok(faces)
    }

    /// Parse a raw count typed by a user.
    ///
    /// An empty field means zero. Anything that is not a non-negative
    /// integer (`"-1"`, `"abc"`, `"2.5"`) yields `None` and the edit is
    /// meant to be ignored.
    pub fn parse_input(raw: &str) -> Option<u32> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Some(0);
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        trimmed.parse().ok()
    }

    pub fn kind(&self) -> DieKind {
        self.kind
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn get(&self, index: usize) -> Result<u32, DomainError> {
        self.kind.validate_index(index)?;
        Ok(self.counts[index])
    }

    /// Sum of every face's tally.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Replace one face's tally. Returns `true` when the value changed.
    pub fn set(&mut self, index: usize, count: u32) -> Result<bool, DomainError> {
        self.kind.validate_index(index)?;
        let slot = &mut self.counts[index];
        let changed = *slot != count;
        *slot = count;
        Ok(changed)
    }

    /// Add one roll to a face; returns the new tally.
    pub fn increment(&mut self, index: usize) -> Result<u32, DomainError> {
        let next = self.get(index)?.saturating_add(1);
        self.set(index, next)?;
        Ok(next)
    }

    /// Remove one roll from a face, never going below zero; returns the new
    /// tally.
    pub fn decrement(&mut self, index: usize) -> Result<u32, DomainError> {
        let next = self.get(index)?.saturating_sub(1);
        self.set(index, next)?;
        Ok(next)
    }

    /// Stored rows for every face, ordered by side.
    pub fn to_side_tallies(&self) -> Result<Vec<SideTally>, DomainError> {
        let mut rows = self
            .counts
            .iter()
            .enumerate()
            .map(|(index, &count)| -> Result<SideTally, DomainError> {
                Ok(SideTally::new(self.kind.to_persisted_side(index)?, count))
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.sort_by_key(|row| row.side);
        Ok(rows)
    }
}
