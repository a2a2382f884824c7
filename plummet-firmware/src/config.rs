//! Board configuration
//!
//! Reference build: a Pico with six beam-break sensors down the drop
//! column (start + five splits) and a momentary reset button. Pin
//! assignments live in `main.rs` next to the peripheral singletons
//! they consume.

use plummet_core::config::TimerConfig;

/// Number of split sensors wired on this board
pub const SPLIT_COUNT: u8 = 5;

/// Timer configuration for this board
pub fn timer_config() -> TimerConfig {
    TimerConfig {
        split_count: SPLIT_COUNT,
        ..TimerConfig::default()
    }
}
