//! Application state and composition.

use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::ports::{DiceRepo, SessionRepo};
use crate::stores::TrackerRegistry;
use crate::use_cases::dice_sets::{CreateDiceSet, DiceSetUseCases, ListDiceSets};
use crate::use_cases::tracker::{CloseTracker, EditFace, OpenTracker, PinFace, TrackerUseCases};

/// Main application state.
///
/// Holds the repositories, the open trackers, and the use cases built on
/// them. Passed to HTTP handlers via Axum state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
    pub trackers: Arc<TrackerRegistry>,
}

/// Container for repository ports.
pub struct Repositories {
    pub dice: Arc<dyn DiceRepo>,
    pub sessions: Arc<dyn SessionRepo>,
}

/// Container for all use cases.
pub struct UseCases {
    pub dice_sets: DiceSetUseCases,
    pub tracker: TrackerUseCases,
}

impl App {
    /// Wire use cases to repositories. `tally_debounce` is the quiet period
    /// each face waits before its tally is stored.
    pub fn new(
        dice: Arc<dyn DiceRepo>,
        sessions: Arc<dyn SessionRepo>,
        tally_debounce: Duration,
    ) -> Self {
        let trackers = Arc::new(TrackerRegistry::new());

        let dice_sets = DiceSetUseCases::new(
            Arc::new(ListDiceSets::new(dice.clone())),
            Arc::new(CreateDiceSet::new(dice.clone())),
        );
        let tracker = TrackerUseCases::new(
            Arc::new(OpenTracker::new(
                dice.clone(),
                trackers.clone(),
                tally_debounce,
            )),
            Arc::new(EditFace::new(trackers.clone())),
            Arc::new(PinFace::new(trackers.clone())),
            Arc::new(CloseTracker::new(trackers.clone())),
        );

        Self {
            repositories: Repositories { dice, sessions },
            use_cases: UseCases { dice_sets, tracker },
            trackers,
        }
    }

    /// Store every tally still waiting out its debounce window.
    pub async fn shutdown(&self) {
        self.trackers.flush_all().await;
    }
}
