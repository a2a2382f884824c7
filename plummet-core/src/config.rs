//! Timer configuration types
//!
//! Display layout and cadence knobs for the coordinator. Pin
//! assignments stay in the firmware crate; these are the
//! board-independent values.

use crate::capture::MAX_SPLITS;

/// Timer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    /// Number of split sensors in use (1..=MAX_SPLITS)
    pub split_count: u8,
    /// Minimum interval between display refreshes, milliseconds
    pub refresh_interval_ms: u32,
    /// Display row of the first split time
    pub first_time_row: u8,
    /// Display column where split times start
    pub time_col: u8,
}

impl TimerConfig {
    /// Display row for split slot `index`
    pub fn row_for(&self, index: u8) -> u8 {
        self.first_time_row + index
    }
}

impl Default for TimerConfig {
    /// Five-sensor drop column: 200 ms refresh, times on rows 3..8
    /// at column 1, leaving rows 0-1 for the banner.
    fn default() -> Self {
        Self {
            split_count: MAX_SPLITS as u8,
            refresh_interval_ms: 200,
            first_time_row: 3,
            time_col: 1,
        }
    }
}
