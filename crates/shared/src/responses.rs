//! Response bodies.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use dicetally_domain::DieKind;

/// A dice set in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceSetSummaryDto {
    pub id: Uuid,
    pub name: String,
}

/// One face row on a tracker card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceView {
    /// Face index used in edit/pin paths
    pub index: usize,
    pub label: String,
    pub count: u32,
    pub probability_percent: f64,
}

/// The "rolling X or higher" figure for a pinned face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedView {
    pub index: usize,
    pub label: String,
    pub cumulative_percent: f64,
}

/// One die card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DieView {
    pub kind: DieKind,
    pub title: String,
    pub total: u64,
    /// Faces in display order
    pub faces: Vec<FaceView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<PinnedView>,
}

/// Everything the tracker page renders for an open dice set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerView {
    pub dice_set: DiceSetSummaryDto,
    pub dice: Vec<DieView>,
}

impl TrackerView {
    pub fn die(&self, kind: DieKind) -> Option<&DieView> {
        self.dice.iter().find(|d| d.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpinned_die_omits_pinned_field() {
        let view = DieView {
            kind: DieKind::D4,
            title: "D4".to_string(),
            total: 0,
            faces: vec![],
            pinned: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("pinned").is_none());
        assert_eq!(json["kind"], "D4");
    }
}
