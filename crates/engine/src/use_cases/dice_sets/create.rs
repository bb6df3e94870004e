//! Create dice set use case.
//!
//! A new set always starts with one zeroed die of every kind.

use std::sync::Arc;

use dicetally_domain::{DiceSetName, DiceSetSummary, UserId};

use crate::infrastructure::ports::DiceRepo;

use super::DiceSetError;

pub struct CreateDiceSet {
    repo: Arc<dyn DiceRepo>,
}

impl CreateDiceSet {
    pub fn new(repo: Arc<dyn DiceRepo>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        name: &str,
    ) -> Result<DiceSetSummary, DiceSetError> {
        let name = DiceSetName::new(name)?;
        let created = self
            .repo
            .create_dice_set_with_standard_dice(user_id, &name)
            .await?;
        tracing::info!(dice_set_id = %created.id, %user_id, name = %created.name, "Dice set created");
        Ok(created)
    }
}
