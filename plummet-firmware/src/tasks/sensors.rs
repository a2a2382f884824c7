//! Sensor edge capture tasks
//!
//! One task per triggering channel. Each waits for a falling edge,
//! stamps it into the shared timing state, then parks until the reset
//! path rearms it - the task-shaped version of detaching an interrupt
//! after its first edge. A ball breaking a beam can bounce into
//! dozens of spurious edges, so the channel goes quiet at the first
//! one and only reset brings it back.
//!
//! The `TimingState` handlers are the hot path here and stay
//! interrupt-safe: no blocking, no formatting, single-width atomic
//! stores only. Everything display-shaped happens in the coordinator.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Instant;

use crate::channels::{SPLIT_REARM, START_REARM, TIMING};

/// Monotonic millisecond clock shared by all capture tasks
fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

/// Start sensor task
#[embassy_executor::task]
pub async fn start_sensor_task(mut pin: Input<'static>) {
    info!("Start sensor armed");

    loop {
        pin.wait_for_falling_edge().await;
        if TIMING.on_start() {
            debug!("Start edge captured");
        }

        // Channel disabled until reset rearms it
        START_REARM.wait().await;
        trace!("Start sensor rearmed");
    }
}

/// Split sensor task, one instance per channel
///
/// Pool size matches `MAX_SPLITS`.
#[embassy_executor::task(pool_size = 5)]
pub async fn split_sensor_task(mut pin: Input<'static>, index: u8) {
    info!("Split sensor {} armed", index);

    loop {
        pin.wait_for_falling_edge().await;
        if TIMING.on_split(index, now_ms()) {
            debug!("Split {} edge captured", index);
        }

        SPLIT_REARM[index as usize].wait().await;
        trace!("Split sensor {} rearmed", index);
    }
}

/// Reset sensor task
///
/// Stays armed across the whole run. Bounce on the reset line only
/// re-sets the level flag, which the coordinator consumes once.
#[embassy_executor::task]
pub async fn reset_sensor_task(mut pin: Input<'static>) {
    info!("Reset input armed");

    loop {
        pin.wait_for_falling_edge().await;
        TIMING.on_reset();
        debug!("Reset requested");
    }
}
