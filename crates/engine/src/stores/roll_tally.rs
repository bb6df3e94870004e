//! Roll tally store.
//!
//! Holds the face tallies of every die in one open dice set. The in-memory
//! tally is the source of truth while the set is open; each change is handed
//! to a [`TallyScheduler`] for eventual persistence.

use std::collections::HashSet;
use std::sync::Arc;

use dicetally_domain::{summarize, Die, DieId, DieKind, DieStatistics, DomainError, FaceCounts};

use super::tally_writer::{TallyScheduler, TallyWrite};

struct TrackedDie {
    id: DieId,
    faces: FaceCounts,
    pinned: Option<usize>,
}

pub struct RollTallyStore {
    /// In set order
    dice: Vec<TrackedDie>,
    scheduler: Arc<dyn TallyScheduler>,
}

impl RollTallyStore {
    /// Load the dice of one set.
    ///
    /// # Errors
    ///
    /// `DuplicateDieKind` if two dice share a kind.
    pub fn initialize(
        dice: Vec<Die>,
        scheduler: Arc<dyn TallyScheduler>,
    ) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for die in &dice {
            if !seen.insert(die.kind()) {
                return Err(DomainError::DuplicateDieKind(die.kind()));
            }
        }
        let dice = dice
            .into_iter()
            .map(|die| TrackedDie {
                id: die.id,
                faces: die.faces,
                pinned: None,
            })
            .collect();
        Ok(Self { dice, scheduler })
    }

    /// Kinds present, in set order.
    pub fn dice(&self) -> Vec<DieKind> {
        self.dice.iter().map(|d| d.faces.kind()).collect()
    }

    pub fn face_counts(&self, kind: DieKind) -> Result<&FaceCounts, DomainError> {
        Ok(&self.tracked(kind)?.faces)
    }

    /// Overwrite one face and schedule its write.
    pub fn set_face_count(
        &mut self,
        kind: DieKind,
        index: usize,
        count: u32,
    ) -> Result<FaceCounts, DomainError> {
        self.edit(kind, index, |faces| faces.set(index, count).map(|_| ()))
    }

    /// Apply a raw value typed into a face's count field.
    ///
    /// `""` sets the face to 0. Negative or non-numeric text is ignored:
    /// nothing changes, nothing is written, and `Ok(None)` comes back.
    pub fn apply_input(
        &mut self,
        kind: DieKind,
        index: usize,
        raw: &str,
    ) -> Result<Option<FaceCounts>, DomainError> {
        self.tracked(kind)?;
        kind.validate_index(index)?;
        match FaceCounts::parse_input(raw) {
            Some(count) => self.set_face_count(kind, index, count).map(Some),
            None => {
                tracing::debug!(%kind, index, raw, "Ignoring invalid face input");
                Ok(None)
            }
        }
    }

    pub fn increment(&mut self, kind: DieKind, index: usize) -> Result<FaceCounts, DomainError> {
        self.edit(kind, index, |faces| faces.increment(index).map(|_| ()))
    }

    /// Remove one roll; a face already at zero stays at zero.
    pub fn decrement(&mut self, kind: DieKind, index: usize) -> Result<FaceCounts, DomainError> {
        self.edit(kind, index, |faces| faces.decrement(index).map(|_| ()))
    }

    /// Choose the face whose "this or higher" probability is shown. Replaces
    /// any earlier pin on the same die.
    pub fn pin_face(&mut self, kind: DieKind, index: usize) -> Result<(), DomainError> {
        kind.validate_index(index)?;
        let slot = self.position(kind)?;
        self.dice[slot].pinned = Some(index);
        Ok(())
    }

    pub fn pinned(&self, kind: DieKind) -> Result<Option<usize>, DomainError> {
        Ok(self.tracked(kind)?.pinned)
    }

    /// Probabilities for one die, including its pinned face.
    pub fn statistics(&self, kind: DieKind) -> Result<DieStatistics, DomainError> {
        let die = self.tracked(kind)?;
        summarize(&die.faces, die.pinned)
    }

    /// Probabilities for every die, in set order.
    pub fn all_statistics(&self) -> Result<Vec<DieStatistics>, DomainError> {
        self.dice
            .iter()
            .map(|die| summarize(&die.faces, die.pinned))
            .collect()
    }

    fn position(&self, kind: DieKind) -> Result<usize, DomainError> {
        self.dice
            .iter()
            .position(|d| d.faces.kind() == kind)
            .ok_or(DomainError::UnknownDieKind(kind))
    }

    fn tracked(&self, kind: DieKind) -> Result<&TrackedDie, DomainError> {
        let slot = self.position(kind)?;
        Ok(&self.dice[slot])
    }

    fn edit<F>(&mut self, kind: DieKind, index: usize, change: F) -> Result<FaceCounts, DomainError>
    where
        F: FnOnce(&mut FaceCounts) -> Result<(), DomainError>,
    {
        let slot = self.position(kind)?;
        let side = kind.to_persisted_side(index)?;
        let die = &mut self.dice[slot];
        let before = die.faces.get(index)?;
        change(&mut die.faces)?;
        let count = die.faces.get(index)?;

        if count != before {
            tracing::debug!(%kind, index, before, count, "Face tally changed");
            self.scheduler.schedule(TallyWrite {
                die_id: die.id,
                kind,
                side,
                count,
            });
        }
        Ok(die.faces.clone())
    }
}
