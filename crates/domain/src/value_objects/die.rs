//! Die model: supported die kinds and the face index / label / side mapping.
//!
//! Every conversion between a 0-based face index, the label shown to a user,
//! and the side value written to storage goes through [`DieKind`]. Nothing
//! else in the workspace does `i + 1` or `* 10` arithmetic on faces.
//!
//! Canonical persisted sides:
//! - ordinary dice: `index + 1` (D10's "0" face is side 10)
//! - percentile: the tens digit, so "00" is side 0 and "30" is side 3
//!
//! Older rows used `100` for "00" and `tens * 10` for the other percentile
//! faces. Those are only accepted by [`DieKind::normalize_legacy_side`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Shape category of a die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DieKind {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    /// Ten faces read as the tens digit of a 0-99 roll (00, 10, ... 90)
    #[serde(alias = "10-decimal")]
    Percentile,
}

impl DieKind {
    /// Every kind, in the order a standard set is created and displayed.
    pub const ALL: [DieKind; 7] = [
        DieKind::D4,
        DieKind::D6,
        DieKind::D8,
        DieKind::D10,
        DieKind::D12,
        DieKind::D20,
        DieKind::Percentile,
    ];

    pub fn face_count(self) -> usize {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::Percentile => 10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::D4 => "D4",
            Self::D6 => "D6",
            Self::D8 => "D8",
            Self::D10 => "D10",
            Self::D12 => "D12",
            Self::D20 => "D20",
            Self::Percentile => "PERCENTILE",
        }
    }

    /// Card heading for the die.
    pub fn title(self) -> &'static str {
        match self {
            Self::Percentile => "D10 (Percentile)",
            other => other.as_str(),
        }
    }

    pub fn is_percentile(self) -> bool {
        matches!(self, Self::Percentile)
    }

    /// Fails with `InvalidFaceIndex` unless `index < face_count()`.
    pub fn validate_index(self, index: usize) -> Result<(), DomainError> {
        if index < self.face_count() {
            Ok(())
        } else {
            Err(DomainError::invalid_face_index(self, index))
        }
    }

    /// Human-readable label for a face.
    ///
    /// D6 index 0 is "1", D10 index 9 is "0", percentile index 0 is "00"
    /// and index 3 is "30".
    pub fn face_label(self, index: usize) -> Result<String, DomainError> {
        self.validate_index(index)?;
        let label = match self {
            Self::Percentile if index == 0 => "00".to_string(),
            Self::Percentile => format!("{}0", index),
            Self::D10 if index == 9 => "0".to_string(),
            _ => (index + 1).to_string(),
        };
        Ok(label)
    }

    /// Canonical side value stored for a face.
    pub fn to_persisted_side(self, index: usize) -> Result<u32, DomainError> {
        self.validate_index(index)?;
        let side = match self {
            Self::Percentile => index,
            _ => index + 1,
        };
        u32::try_from(side).map_err(|_| DomainError::invalid_face_index(self, index))
    }

    /// Face index for a canonical side value.
    pub fn from_persisted_side(self, side: u32) -> Result<usize, DomainError> {
        let index = match self {
            Self::Percentile => Some(side as usize),
            _ => (side as usize).checked_sub(1),
        };
        match index {
            Some(index) if index < self.face_count() => Ok(index),
            _ => Err(DomainError::invalid_persisted_side(self, side)),
        }
    }

    /// Rewrite a side value that may use the legacy percentile encoding
    /// (`100` for "00", `tens * 10` otherwise) into the canonical one.
    ///
    /// Canonical values pass through unchanged, so this is idempotent.
    /// Ordinary dice never had a second encoding.
    pub fn normalize_legacy_side(self, side: u32) -> Result<u32, DomainError> {
        if !self.is_percentile() {
            self.from_persisted_side(side)?;
            return Ok(side);
        }
        match side {
            0..=9 => Ok(side),
            100 => Ok(0),
            10..=90 if side % 10 == 0 => Ok(side / 10),
            _ => Err(DomainError::invalid_persisted_side(self, side)),
        }
    }

    /// Face indices from the lowest to the highest rank, for "this value or
    /// higher" sums. Index order already ranks D10's "0" (ten) highest and
    /// percentile "00" lowest.
    pub fn rank_order(self) -> Vec<usize> {
        (0..self.face_count()).collect()
    }

    /// Face indices in the order a tracker card lists them. The percentile
    /// card reads 10, 20, ... 90 and puts 00 last.
    pub fn display_order(self) -> Vec<usize> {
        let count = self.face_count();
        match self {
            Self::Percentile => (1..count).chain(std::iter::once(0)).collect(),
            _ => (0..count).collect(),
        }
    }
}

impl fmt::Display for DieKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DieKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D4" => Ok(Self::D4),
            "D6" => Ok(Self::D6),
            "D8" => Ok(Self::D8),
            "D10" => Ok(Self::D10),
            "D12" => Ok(Self::D12),
            "D20" => Ok(Self::D20),
            "PERCENTILE" | "10-DECIMAL" => Ok(Self::Percentile),
            _ => Err(DomainError::parse(format!("Unknown die kind: {}", s))),
        }
    }
}
