//! In-memory state storage modules.
//!
//! Stores manage runtime state for open trackers:
//! - `RollTallyStore` - face tallies and pins of one open dice set
//! - `DebouncedTallyWriter` - per-face debounced persistence of tallies
//! - `TrackerRegistry` - open trackers keyed by user and dice set

pub mod roll_tally;
pub mod tally_writer;
pub mod trackers;

pub use roll_tally::RollTallyStore;
pub use tally_writer::{DebouncedTallyWriter, TallyScheduler, TallyWrite};
pub use trackers::{Tracker, TrackerRegistry};
