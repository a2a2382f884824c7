//! Events that trigger run state transitions

/// Events that can trigger run state transitions
///
/// Start and finish requests originate from sensor edges via the
/// capture layer's level flags; reset comes from the manual reset
/// input. The coordinator consumes the flags and feeds these events
/// through [`RunState::transition`](super::RunState::transition).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Start beam broken since the last reset
    StartRequested,
    /// Last split beam broken while a run was active
    FinishRequested,
    /// Operator pressed the reset input
    ResetRequested,
}

impl Event {
    /// Check if this event is an explicit operator action
    ///
    /// Reset discards in-progress state unconditionally; the other
    /// events are produced by the falling ball itself.
    pub fn is_operator_event(&self) -> bool {
        matches!(self, Event::ResetRequested)
    }
}
