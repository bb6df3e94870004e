//! Dice Tally domain.
//!
//! Pure types and rules, no I/O:
//! - `value_objects` - die kinds, face tallies, validated names
//! - `probability` - per-face and cumulative probabilities
//! - `entities` - dice sets and dice

pub mod entities;
pub mod error;
pub mod ids;
pub mod probability;
pub mod value_objects;

pub use entities::{standard_dice, DiceSet, DiceSetDetail, DiceSetSummary, Die, StoredDie};
pub use error::DomainError;
pub use ids::{DiceSetId, DieId, UserId};
pub use probability::{
    cumulative_from_face, per_face_probabilities, summarize, DieStatistics, FaceProbability,
    PinnedProbability,
};
pub use value_objects::{DiceSetName, DieKind, FaceCounts, SideTally};
