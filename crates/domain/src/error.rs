//! Unified error types for the domain layer
//!
//! Die model and probability errors are contract violations (a bad index or
//! side coming from a caller); validation errors come from user-supplied
//! values such as dice set names.

use thiserror::Error;

use crate::value_objects::DieKind;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Face index outside `[0, face_count)` for the die kind
    #[error("Invalid face index {index} for {kind} ({face_count} faces)")]
    InvalidFaceIndex {
        kind: DieKind,
        index: usize,
        face_count: usize,
    },

    /// Persisted side value with no corresponding face
    #[error("Invalid persisted side {side} for {kind}")]
    InvalidPersistedSide { kind: DieKind, side: u32 },

    /// Two dice in one set share a kind
    #[error("Duplicate die kind in dice set: {0}")]
    DuplicateDieKind(DieKind),

    /// The set has no die of the requested kind
    #[error("Dice set has no {0} die")]
    UnknownDieKind(DieKind),

    /// A face count sequence with no entries
    #[error("Face count sequence is empty")]
    EmptyFaceCount,

    /// A face count sequence whose length disagrees with the die kind
    #[error("{kind} expects {expected} faces, got {actual}")]
    FaceCountMismatch {
        kind: DieKind,
        expected: usize,
        actual: usize,
    },

    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// # Example
    /// ```ignore
    /// if name.is_empty() {
    ///     return Err(DomainError::validation("Dice set name cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an invalid face index error
    pub fn invalid_face_index(kind: DieKind, index: usize) -> Self {
        Self::InvalidFaceIndex {
            kind,
            index,
            face_count: kind.face_count(),
        }
    }

    /// Create an invalid persisted side error
    pub fn invalid_persisted_side(kind: DieKind, side: u32) -> Self {
        Self::InvalidPersistedSide { kind, side }
    }

    /// True for errors caused by a caller passing a bad index, side, or kind.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidFaceIndex { .. }
                | Self::InvalidPersistedSide { .. }
                | Self::UnknownDieKind(_)
                | Self::EmptyFaceCount
                | Self::FaceCountMismatch { .. }
        )
    }
}
