//! List dice sets use case.

use std::sync::Arc;

use dicetally_domain::{DiceSetSummary, UserId};

use crate::infrastructure::ports::DiceRepo;

use super::DiceSetError;

pub struct ListDiceSets {
    repo: Arc<dyn DiceRepo>,
}

impl ListDiceSets {
    pub fn new(repo: Arc<dyn DiceRepo>) -> Self {
        Self { repo }
    }

    /// The user's sets, newest first.
    pub async fn execute(&self, user_id: UserId) -> Result<Vec<DiceSetSummary>, DiceSetError> {
        Ok(self.repo.list_dice_sets(user_id).await?)
    }
}
