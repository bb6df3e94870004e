//! Edit face use case.

use std::sync::Arc;

use dicetally_domain::{DiceSetId, DieKind, UserId};

use crate::stores::TrackerRegistry;

use super::{require_open, TrackerError, TrackerSnapshot};

/// A change to one face's tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaceEdit {
    /// Raw text from the count field
    Input(String),
    Increment,
    Decrement,
}

pub struct EditFace {
    registry: Arc<TrackerRegistry>,
}

impl EditFace {
    pub fn new(registry: Arc<TrackerRegistry>) -> Self {
        Self { registry }
    }

    /// Apply `edit` to an open set. Input that is not a count leaves the
    /// tally untouched and still returns the current snapshot.
    pub async fn execute(
        &self,
        user_id: UserId,
        dice_set_id: DiceSetId,
        kind: DieKind,
        index: usize,
        edit: FaceEdit,
    ) -> Result<TrackerSnapshot, TrackerError> {
        let tracker = require_open(&self.registry, user_id, dice_set_id)?;
        let mut store = tracker.store().await;
        match edit {
            FaceEdit::Input(raw) => {
                store.apply_input(kind, index, &raw)?;
            }
            FaceEdit::Increment => {
                store.increment(kind, index)?;
            }
            FaceEdit::Decrement => {
                store.decrement(kind, index)?;
            }
        }
        Ok(TrackerSnapshot::capture(tracker.dice_set(), &store)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::tracker::test_support::opened;
    use dicetally_domain::{DieStatistics, DomainError};

    fn die(snapshot: &TrackerSnapshot, kind: DieKind) -> &DieStatistics {
        snapshot.dice.iter().find(|s| s.kind == kind).unwrap()
    }

    #[tokio::test]
    async fn input_then_increment_then_decrement() {
        let user = UserId::new();
        let (registry, set) = opened(user).await;
        let use_case = EditFace::new(registry);

        let snap = use_case
            .execute(user, set, DieKind::D6, 0, FaceEdit::Input("2".into()))
            .await
            .unwrap();
        assert_eq!(die(&snap, DieKind::D6).faces[0].count, 2);

        use_case
            .execute(user, set, DieKind::D6, 5, FaceEdit::Increment)
            .await
            .unwrap();
        let snap = use_case
            .execute(user, set, DieKind::D6, 5, FaceEdit::Increment)
            .await
            .unwrap();
        let d6 = die(&snap, DieKind::D6);
        assert_eq!(d6.total, 4);
        assert_eq!(d6.faces[0].probability_percent, 50.0);
        assert_eq!(d6.faces[5].probability_percent, 50.0);

        let snap = use_case
            .execute(user, set, DieKind::D6, 5, FaceEdit::Decrement)
            .await
            .unwrap();
        assert_eq!(die(&snap, DieKind::D6).total, 3);
    }

    #[tokio::test]
    async fn invalid_input_is_ignored() {
        let user = UserId::new();
        let (registry, set) = opened(user).await;
        let use_case = EditFace::new(registry);

        use_case
            .execute(user, set, DieKind::D4, 1, FaceEdit::Input("3".into()))
            .await
            .unwrap();
        let snap = use_case
            .execute(user, set, DieKind::D4, 1, FaceEdit::Input("-1".into()))
            .await
            .unwrap();
        assert_eq!(die(&snap, DieKind::D4).faces[1].count, 3);
    }

    #[tokio::test]
    async fn bad_index_is_domain_error() {
        let user = UserId::new();
        let (registry, set) = opened(user).await;

        let result = EditFace::new(registry)
            .execute(user, set, DieKind::D8, 8, FaceEdit::Increment)
            .await;
        assert!(matches!(
            result,
            Err(TrackerError::Domain(DomainError::InvalidFaceIndex { index: 8, .. }))
        ));
    }

    #[tokio::test]
    async fn set_not_open_for_this_user() {
        let owner = UserId::new();
        let (registry, set) = opened(owner).await;

        let result = EditFace::new(registry)
            .execute(UserId::new(), set, DieKind::D6, 0, FaceEdit::Increment)
            .await;
        assert!(matches!(result, Err(TrackerError::TrackerNotOpen(id)) if id == set));
    }
}
