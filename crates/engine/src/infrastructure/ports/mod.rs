//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Database access (dice sets, tallies, sessions)
//! - Clock (for testing)

mod error;
mod repos;
mod testing;
mod types;

pub use error::RepoError;
pub use repos::{DiceRepo, SessionRepo};
pub use testing::ClockPort;
pub use types::Session;

#[cfg(test)]
pub use repos::{MockDiceRepo, MockSessionRepo};
