//! Dice sets and the dice they own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{DiceSetId, DieId, UserId};
use crate::value_objects::{DiceSetName, DieKind, FaceCounts, SideTally};

/// A named collection of dice belonging to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceSet {
    pub id: DiceSetId,
    pub user_id: UserId,
    pub name: DiceSetName,
    pub created_at: DateTime<Utc>,
}

impl DiceSet {
    pub fn new(user_id: UserId, name: DiceSetName, now: DateTime<Utc>) -> Self {
        Self {
            id: DiceSetId::new(),
            user_id,
            name,
            created_at: now,
        }
    }

    pub fn summary(&self) -> DiceSetSummary {
        DiceSetSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// `{id, name}` view used by set listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceSetSummary {
    pub id: DiceSetId,
    pub name: DiceSetName,
}

/// A single die with its tallies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Die {
    pub id: DieId,
    pub faces: FaceCounts,
}

impl Die {
    /// A fresh die with every face at zero.
    pub fn new(kind: DieKind) -> Self {
        Self {
            id: DieId::new(),
            faces: FaceCounts::zeroed(kind),
        }
    }

    pub fn with_id(mut self, id: DieId) -> Self {
        self.id = id;
        self
    }

    pub fn kind(&self) -> DieKind {
        self.faces.kind()
    }
}

/// One die of every kind, all at zero, in creation order.
pub fn standard_dice() -> Vec<Die> {
    DieKind::ALL.iter().map(|&kind| Die::new(kind)).collect()
}

/// A die as the persistence layer returns it: kind plus raw side rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDie {
    pub id: DieId,
    pub kind: DieKind,
    pub sides: Vec<SideTally>,
}

impl StoredDie {
    /// Map stored side rows onto face indices.
    pub fn into_die(self) -> Result<Die, DomainError> {
        Ok(Die {
            id: self.id,
            faces: FaceCounts::from_side_tallies(self.kind, self.sides)?,
        })
    }
}

/// A set with all of its dice, as loaded for the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceSetDetail {
    pub dice_set: DiceSetSummary,
    pub dice: Vec<StoredDie>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_dice_cover_every_kind_once() {
        let dice = standard_dice();
        let kinds: Vec<DieKind> = dice.iter().map(Die::kind).collect();
        assert_eq!(kinds, DieKind::ALL.to_vec());
        assert!(dice.iter().all(|d| d.faces.total() == 0));
    }

    #[test]
    fn stored_die_maps_sides_to_faces() {
        let stored = StoredDie {
            id: DieId::new(),
            kind: DieKind::D4,
            sides: vec![SideTally::new(4, 3), SideTally::new(1, 1)],
        };
        let die = stored.clone().into_die().unwrap();
        assert_eq!(die.id, stored.id);
        assert_eq!(die.faces.counts(), &[1, 0, 0, 3]);
    }

    #[test]
    fn stored_die_with_bad_side_fails() {
        let stored = StoredDie {
            id: DieId::new(),
            kind: DieKind::D4,
            sides: vec![SideTally::new(5, 3)],
        };
        assert!(matches!(
            stored.into_die(),
            Err(DomainError::InvalidPersistedSide { side: 5, .. })
        ));
    }

    #[test]
    fn die_with_short_faces_fails_to_deserialize() {
        let json = serde_json::json!({
            "id": DieId::new(),
            "faces": { "kind": "D6", "counts": [1, 2] },
        });
        assert!(serde_json::from_value::<Die>(json).is_err());

        let die = Die::new(DieKind::D12);
        let back: Die = serde_json::from_value(serde_json::to_value(&die).unwrap()).unwrap();
        assert_eq!(back, die);
    }

    #[test]
    fn summary_copies_id_and_name() {
        let set = DiceSet::new(
            UserId::new(),
            DiceSetName::new("Purple").unwrap(),
            Utc::now(),
        );
        let summary = set.summary();
        assert_eq!(summary.id, set.id);
        assert_eq!(summary.name.as_str(), "Purple");
    }
}
