//! Dice set use cases.

mod create;
mod error;
mod list;

use std::sync::Arc;

pub use create::CreateDiceSet;
pub use error::DiceSetError;
pub use list::ListDiceSets;

/// Container for dice set use cases.
pub struct DiceSetUseCases {
    pub list: Arc<ListDiceSets>,
    pub create: Arc<CreateDiceSet>,
}

impl DiceSetUseCases {
    pub fn new(list: Arc<ListDiceSets>, create: Arc<CreateDiceSet>) -> Self {
        Self { list, create }
    }
}
