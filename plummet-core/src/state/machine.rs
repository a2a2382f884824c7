//! Run state definition
//!
//! Display rendering and sensor rearm behavior are a function of the
//! current run state and an event.

use super::events::Event;

/// Run lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    /// Waiting for the start beam to break
    Idle,
    /// Run origin captured, splits being recorded and rendered live
    Running,
    /// Last split recorded; values held frozen until reset
    Finished,
}

impl RunState {
    /// Check if split rows should render live elapsed placeholders
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }

    /// Check if a start request may be honored
    ///
    /// A start mid-run must never re-capture the origin, even if the
    /// start channel was somehow left enabled.
    pub fn accepts_start(&self) -> bool {
        matches!(self, RunState::Idle)
    }

    /// Process an event and return the next state
    ///
    /// This is the core transition logic. A finish with no preceding
    /// start is meaningless, so `FinishRequested` in `Idle` falls
    /// through to the identity arm, as does `StartRequested` while
    /// `Running`.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use RunState::*;

        match (self, event) {
            (Idle, StartRequested) => Running,
            (Running, FinishRequested) => Finished,

            // Reset is honored unconditionally, from any state
            (_, ResetRequested) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
