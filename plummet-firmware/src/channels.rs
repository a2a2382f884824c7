//! Shared state between tasks
//!
//! The capture layer's shared timing state plus the rearm signals the
//! reset path uses to wake parked sensor tasks. Cross-context traffic
//! is word-width atomics inside `TimingState`; the signals only ever
//! fire from the coordinator.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use plummet_core::capture::{TimingState, MAX_SPLITS};

use crate::config::SPLIT_COUNT;

/// Shared timing state: written by sensor tasks, read by the coordinator
pub static TIMING: TimingState = TimingState::new(SPLIT_COUNT);

/// Rearm signal for the start sensor task
pub static START_REARM: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Rearm signals for the split sensor tasks, one per channel
pub static SPLIT_REARM: [Signal<CriticalSectionRawMutex, ()>; MAX_SPLITS] = [
    Signal::new(),
    Signal::new(),
    Signal::new(),
    Signal::new(),
    Signal::new(),
];
