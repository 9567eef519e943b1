use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Days of a scenario's schedule the user has marked as done.
///
/// Purely a progress tracker: markers never feed back into the projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionMarkers(BTreeSet<u32>);

impl CompletionMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the marker for `day` and returns the new state.
    pub fn toggle(&mut self, day: u32) -> bool {
        if self.0.remove(&day) {
            false
        } else {
            self.0.insert(day);
            true
        }
    }

    pub fn mark(&mut self, day: u32) -> bool {
        self.0.insert(day)
    }

    pub fn unmark(&mut self, day: u32) -> bool {
        self.0.remove(&day)
    }

    pub fn is_done(&self, day: u32) -> bool {
        self.0.contains(&day)
    }

    pub fn count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn days(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Fraction of days `1..=horizon` marked done. Markers past the horizon are
    /// retained (the horizon may grow again) but not counted.
    pub fn progress(&self, horizon: u32) -> f64 {
        if horizon == 0 {
            return 0.0;
        }
        let done = self.0.range(1..=horizon).count();
        done as f64 / horizon as f64
    }
}
