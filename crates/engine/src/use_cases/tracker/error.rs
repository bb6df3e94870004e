//! Tracker error types.

use dicetally_domain::{DiceSetId, DomainError};

use crate::infrastructure::ports::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Dice set not found: {0}")]
    DiceSetNotFound(DiceSetId),
    #[error("Dice set is not open: {0}")]
    TrackerNotOpen(DiceSetId),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
