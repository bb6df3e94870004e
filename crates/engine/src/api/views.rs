//! Conversions from use case results to response bodies.

use dicetally_domain::{DiceSetSummary, DieStatistics};
use dicetally_shared::{DiceSetSummaryDto, DieView, FaceView, PinnedView, TrackerView};

use crate::use_cases::tracker::TrackerSnapshot;

pub(super) fn dice_set_dto(summary: &DiceSetSummary) -> DiceSetSummaryDto {
    DiceSetSummaryDto {
        id: summary.id.to_uuid(),
        name: summary.name.to_string(),
    }
}

/// Lay out a die card, listing faces in display order.
pub(super) fn die_view(stats: &DieStatistics) -> DieView {
    let faces = stats
        .kind
        .display_order()
        .into_iter()
        .filter_map(|index| stats.faces.iter().find(|f| f.index == index))
        .map(|face| FaceView {
            index: face.index,
            label: face.label.clone(),
            count: face.count,
            probability_percent: face.probability_percent,
        })
        .collect();

    DieView {
        kind: stats.kind,
        title: stats.kind.title().to_string(),
        total: stats.total,
        faces,
        pinned: stats.pinned.as_ref().map(|p| PinnedView {
            index: p.index,
            label: p.label.clone(),
            cumulative_percent: p.cumulative_percent,
        }),
    }
}

pub(super) fn tracker_view(snapshot: &TrackerSnapshot) -> TrackerView {
    TrackerView {
        dice_set: dice_set_dto(&snapshot.dice_set),
        dice: snapshot.dice.iter().map(die_view).collect(),
    }
}
