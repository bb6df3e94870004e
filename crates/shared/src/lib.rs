//! Dice Tally wire types.
//!
//! JSON request and response bodies for the engine's HTTP API.
//!
//! # Design Principles
//!
//! 1. **No business logic** - pure data types and serialization
//! 2. **No domain IDs** - raw `uuid::Uuid` in DTOs
//! 3. Vocabulary types (`DieKind`) are reused from the domain crate

pub mod requests;
pub mod responses;

pub use requests::{CreateDiceSetRequest, FaceInputRequest, PinFaceRequest};
pub use responses::{DiceSetSummaryDto, DieView, FaceView, PinnedView, TrackerView};
