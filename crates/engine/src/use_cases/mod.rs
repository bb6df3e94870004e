//! Use cases - User story orchestration.
//!
//! - `dice_sets` - listing and creating dice sets
//! - `tracker` - opening a set and editing its tallies

pub mod dice_sets;
pub mod tracker;

pub use dice_sets::{DiceSetError, DiceSetUseCases};
pub use tracker::{TrackerError, TrackerUseCases};
