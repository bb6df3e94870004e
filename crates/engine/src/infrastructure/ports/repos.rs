//! Repository port traits.

use async_trait::async_trait;
use dicetally_domain::{DiceSetDetail, DiceSetId, DiceSetName, DiceSetSummary, DieId, UserId};

use super::{RepoError, Session};

/// Dice sets, their dice, and per-side tallies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiceRepo: Send + Sync {
    /// Every set owned by `user_id`, newest first.
    async fn list_dice_sets(&self, user_id: UserId) -> Result<Vec<DiceSetSummary>, RepoError>;

    /// Create a set holding one zeroed die of every kind. Either the whole
    /// set is stored or nothing is.
    async fn create_dice_set_with_standard_dice(
        &self,
        user_id: UserId,
        name: &DiceSetName,
    ) -> Result<DiceSetSummary, RepoError>;

    /// The set with all dice and side rows, or `None` if it does not exist or
    /// belongs to another user.
    async fn get_dice_set_detail(
        &self,
        dice_set_id: DiceSetId,
        user_id: UserId,
    ) -> Result<Option<DiceSetDetail>, RepoError>;

    /// Overwrite one side's tally. `NotFound` when no row matches.
    async fn update_face_tally(
        &self,
        die_id: DieId,
        side: u32,
        rolled_count: u32,
    ) -> Result<(), RepoError>;
}

/// Session lookup for bearer tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepo: Send + Sync {
    /// The live session for `token`. Expired and unknown tokens both give `None`.
    async fn get_session(&self, token: &str) -> Result<Option<Session>, RepoError>;
}
