//! Entities - objects with identity

mod dice_set;

pub use dice_set::{standard_dice, DiceSet, DiceSetDetail, DiceSetSummary, Die, StoredDie};
