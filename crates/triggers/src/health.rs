//! Contains the backend availability state machine.
//!
//! The adapter probes the backend's health endpoint lazily. A failure
//! marks the backend unhealthy, and the state re-probes after
//! [REPROBE_INTERVAL] so a transient blip does not disable the tier until
//! process restart.

use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

/// How long an unhealthy backend stays benched before the next probe.
pub const REPROBE_INTERVAL: Duration = Duration::from_secs(60);

/// The known availability of the backend tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    /// Never probed.
    Unknown,
    /// Last probe or fetch succeeded.
    Healthy,
    /// Last probe or fetch failed at the given instant.
    Unhealthy {
        /// When the failure was observed.
        since: Instant,
    },
}

/// Tracks [BackendState] across concurrent trigger evaluations.
#[derive(Debug)]
pub struct BackendHealth {
    state: Mutex<BackendState>,
}

impl Default for BackendHealth {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendHealth {
    /// Creates a tracker in the [BackendState::Unknown] state.
    pub const fn new() -> Self {
        Self { state: Mutex::new(BackendState::Unknown) }
    }

    /// Returns the current state.
    pub fn state(&self) -> BackendState {
        *self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Returns true if the backend should be (re-)probed now: it has never
    /// been probed, or it has been benched for at least [REPROBE_INTERVAL].
    pub fn needs_probe(&self) -> bool {
        match self.state() {
            BackendState::Unknown => true,
            BackendState::Healthy => false,
            BackendState::Unhealthy { since } => since.elapsed() >= REPROBE_INTERVAL,
        }
    }

    /// Records a successful probe or fetch.
    pub fn mark_healthy(&self) {
        *self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = BackendState::Healthy;
    }

    /// Records a failed probe or fetch.
    pub fn mark_unhealthy(&self) {
        *self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner) =
            BackendState::Unhealthy { since: Instant::now() };
    }

    #[cfg(test)]
    pub(crate) fn set_state(&self, state: BackendState) {
        *self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_state_probes() {
        let health = BackendHealth::new();
        assert_eq!(health.state(), BackendState::Unknown);
        assert!(health.needs_probe());
    }

    #[test]
    fn test_healthy_state_skips_probe() {
        let health = BackendHealth::new();
        health.mark_healthy();
        assert!(!health.needs_probe());
    }

    #[test]
    fn test_unhealthy_state_reprobes_after_interval() {
        let health = BackendHealth::new();
        health.mark_unhealthy();
        assert!(!health.needs_probe());

        let benched_long_ago = Instant::now() - (REPROBE_INTERVAL + Duration::from_secs(1));
        health.set_state(BackendState::Unhealthy { since: benched_long_ago });
        assert!(health.needs_probe());
    }
}
