//! Value objects - Immutable objects defined by their attributes

mod die;
mod face_counts;
mod names;

pub use die::DieKind;
pub use face_counts::{FaceCounts, SideTally};
pub use names::DiceSetName;
