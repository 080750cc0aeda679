//! Client-side navigation detection.
//!
//! The judges are single-page apps: moving to another problem changes
//! the location without a reload. On every mutation batch the tracker
//! compares the location to the last one it saw and, on change, starts
//! a new epoch (which reopens the extraction gate).

use std::sync::{Arc, Mutex};
use tracing::info;

use super::gate::{EpochId, EpochState};

/// Owns the epoch state and the last known location.
#[derive(Debug)]
pub struct NavigationEpochTracker {
    state: Arc<EpochState>,
    last_url: Mutex<String>,
}

impl NavigationEpochTracker {
    /// Start tracking from `initial_url` in epoch 0.
    pub fn new(initial_url: impl Into<String>) -> Self {
        Self {
            state: Arc::new(EpochState::new()),
            last_url: Mutex::new(initial_url.into()),
        }
    }

    /// Shared epoch state for collaborators.
    pub fn state(&self) -> &Arc<EpochState> {
        &self.state
    }

    pub fn last_url(&self) -> String {
        self.last_url
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Compare `current_url` with the last recorded location.
    ///
    /// Returns the new epoch if the location changed.
    pub fn observe_location(&self, current_url: &str) -> Option<EpochId> {
        let mut last = self
            .last_url
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *last == current_url {
            return None;
        }

        *last = current_url.to_string();
        let epoch = self.state.begin_next();
        info!(url = %current_url, epoch = %epoch, "client-side navigation; new epoch");
        Some(epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_url_keeps_epoch() {
        let tracker = NavigationEpochTracker::new("https://leetcode.com/problems/a/");
        assert_eq!(tracker.observe_location("https://leetcode.com/problems/a/"), None);
        assert_eq!(tracker.state().current(), EpochId(0));
    }

    #[test]
    fn test_url_change_starts_epoch_and_reopens_gate() {
        let tracker = NavigationEpochTracker::new("https://leetcode.com/problems/a/");
        let state = tracker.state().clone();

        assert!(state.try_enter(EpochId(0)));
        assert!(!state.gate_open());

        let next = tracker.observe_location("https://leetcode.com/problems/b/");
        assert_eq!(next, Some(EpochId(1)));
        assert!(state.gate_open());
        assert!(state.try_enter(EpochId(1)));
        assert_eq!(tracker.last_url(), "https://leetcode.com/problems/b/");

        // Navigating back is a change too.
        assert_eq!(
            tracker.observe_location("https://leetcode.com/problems/a/"),
            Some(EpochId(2))
        );
    }
}
