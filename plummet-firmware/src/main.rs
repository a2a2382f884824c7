//! Plummet - ball-drop split timer firmware
//!
//! Main firmware binary for RP2040-based boards. A ball dropped past
//! a column of beam-break sensors is timed on the way down; split
//! times appear live on an SSD1306 OLED.
//!
//! Edge capture runs per-sensor in interrupt-woken tasks that park
//! themselves after the first edge (debounce-by-disable); a
//! cooperative polling loop owns the run lifecycle and the display.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use {defmt_rtt as _, panic_probe as _};

mod channels;
mod config;
mod display;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Plummet firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // OLED on I2C0 in blocking mode. The driver flushes one page per
    // draw call, well inside the 200 ms refresh budget.
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default());

    // Beam-break sensors idle high through the pull-up; a passing
    // ball pulls the line low, so every channel triggers on the
    // falling edge.
    let start = Input::new(p.PIN_2, Pull::Up);
    let reset = Input::new(p.PIN_3, Pull::Up);
    let splits = [
        Input::new(p.PIN_6, Pull::Up),
        Input::new(p.PIN_7, Pull::Up),
        Input::new(p.PIN_8, Pull::Up),
        Input::new(p.PIN_9, Pull::Up),
        Input::new(p.PIN_10, Pull::Up),
    ];

    spawner.spawn(tasks::start_sensor_task(start)).unwrap();
    spawner.spawn(tasks::reset_sensor_task(reset)).unwrap();
    for (index, pin) in splits.into_iter().enumerate() {
        spawner
            .spawn(tasks::split_sensor_task(pin, index as u8))
            .unwrap();
    }

    spawner
        .spawn(tasks::coordinator_task(i2c, config::timer_config()))
        .unwrap();

    info!("All tasks spawned, timer armed");

    // All work happens in the spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
