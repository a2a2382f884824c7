//! Timing coordinator task
//!
//! Drives the core coordinator's cooperative polling loop off a 10 ms
//! ticker. Owns the OLED and the sensor gate; the capture tasks never
//! touch either.

use defmt::*;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Duration, Instant, Ticker};

use plummet_core::capture::SensorChannel;
use plummet_core::config::TimerConfig;
use plummet_core::coordinator::Coordinator;
use plummet_core::traits::SensorBank;

use crate::channels::{SPLIT_REARM, START_REARM, TIMING};
use crate::display::Ssd1306;

/// Poll interval for the coordinator loop
const POLL_INTERVAL_MS: u64 = 10;

/// Sensor bank backed by the parked capture tasks
///
/// Enabling a channel wakes its task out of the post-edge park;
/// disabling is structural (an accepted edge parks the task), so
/// there is nothing to tear down here.
struct SensorGate;

impl SensorBank for SensorGate {
    fn enable(&mut self, channel: SensorChannel) {
        match channel {
            SensorChannel::Start => START_REARM.signal(()),
            SensorChannel::Split(index) => {
                if let Some(signal) = SPLIT_REARM.get(index as usize) {
                    signal.signal(());
                }
            }
            SensorChannel::Reset => {}
        }
    }

    fn disable(&mut self, _channel: SensorChannel) {}
}

/// Coordinator task - the cooperative main loop
#[embassy_executor::task]
pub async fn coordinator_task(i2c: I2c<'static, I2C0, Blocking>, config: TimerConfig) {
    info!("Coordinator task started");

    let mut oled = Ssd1306::new(i2c);
    oled.init();

    let mut coordinator = Coordinator::new(config);
    let mut gate = SensorGate;
    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));

    loop {
        ticker.next().await;

        let now_ms = Instant::now().as_millis() as u32;
        if let Some(event) = coordinator.poll(now_ms, &TIMING, &mut oled, &mut gate) {
            info!("Lifecycle event: {:?}", event);
        }
    }
}
